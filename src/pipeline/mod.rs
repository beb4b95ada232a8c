//! Extraction pipeline
//!
//! Drives one extract run end to end.
//!
//! # Overview
//!
//! 1. Rotate the previous results into today's archive
//! 2. Authenticate against Salesforce
//! 3. For each query file line: fetch, normalize, write, forward
//!
//! Per-query failures are escalated and the line is skipped. Anything else is
//! escalated and ends the run.

mod types;

pub use types::{RunReport, SkippedQuery};

use crate::archive::ArchiveManager;
use crate::auth::{Authenticator, Credentials, Session};
use crate::config::{AppSettings, Environment};
use crate::error::{Error, Result};
use crate::escalate::Escalator;
use crate::http::{HttpClient, HttpClientConfig};
use crate::normalize::ResultNormalizer;
use crate::query::{QueryDefinition, QueryDispatcher, QueryFileReader};
use crate::sink::{build_procedure_sink, OutputArtifact, OutputWriter, Sink};
use std::path::PathBuf;
use tracing::{debug, info};

/// Pipeline components, assembled once per run
pub struct Pipeline {
    archive: ArchiveManager,
    authenticator: Authenticator,
    dispatcher: QueryDispatcher,
    normalizer: ResultNormalizer,
    sink: Sink,
    escalator: Escalator,
    query_file: PathBuf,
}

impl Pipeline {
    /// Assemble a pipeline from its parts
    pub fn new(
        archive: ArchiveManager,
        authenticator: Authenticator,
        dispatcher: QueryDispatcher,
        sink: Sink,
        escalator: Escalator,
        query_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            archive,
            authenticator,
            dispatcher,
            normalizer: ResultNormalizer::new(),
            sink,
            escalator,
            query_file: query_file.into(),
        }
    }

    /// Build the pipeline described by `settings`.
    ///
    /// A password that cannot be decrypted is escalated before returning.
    pub async fn from_settings(settings: &AppSettings, environment: Environment) -> Result<Self> {
        let procedures = build_procedure_sink(settings, environment);
        let procs = &settings.stored_procedures;
        let files = &settings.file_locations;

        let escalator = Escalator::new(
            procedures.clone(),
            &procs.sql_email,
            &settings.email_settings.to_address,
        );

        let credentials = match Credentials::from_settings(&settings.salesforce) {
            Ok(credentials) => credentials,
            Err(e) => return Err(escalate_fatal(&escalator, "Loading Salesforce credentials", e).await),
        };

        let http_config = HttpClientConfig::builder()
            .timeout(settings.salesforce.request_timeout())
            .build();
        let client = HttpClient::with_config(http_config)
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::new(
            ArchiveManager::new(&files.output_directory, files.archive_exclusions.clone()),
            Authenticator::with_client(credentials, client.clone()),
            QueryDispatcher::new(client, &settings.salesforce.query_endpoint),
            Sink::new(
                OutputWriter::new(&files.output_directory),
                procedures,
                &procs.xml_parse,
            ),
            escalator,
            &files.query_file,
        ))
    }

    /// Connect to Salesforce without running any query
    pub async fn check(&self) -> Result<Session> {
        self.fatal("Connecting to Salesforce", self.authenticator.authenticate().await)
            .await
    }

    /// Archive previous results only
    pub async fn rotate(&self) -> Result<()> {
        self.fatal("Archiving previous results", self.archive.rotate())
            .await
            .map(|_| ())
    }

    /// Run a full extract.
    ///
    /// Returns the first fatal error after it has been escalated.
    pub async fn run(&self) -> Result<RunReport> {
        info!("Data Extract Started");

        self.rotate().await?;
        let session = self.check().await?;
        let reader = self
            .fatal("Opening query file", QueryFileReader::open(&self.query_file))
            .await?;

        let mut report = RunReport::default();
        for entry in reader {
            let (label, outcome) = match entry {
                Ok(query) => (
                    query.name.clone(),
                    self.run_query(&session, &query).await,
                ),
                Err(e) => ("query file".to_string(), Err(e)),
            };

            match outcome {
                Ok(artifact) => report.record(artifact),
                Err(e) if !e.is_fatal() => {
                    let context = format!("Skipping {label}");
                    notify(&self.escalator, &context, &e).await;
                    report.skip(label, &e);
                }
                Err(e) => {
                    let context = format!("Extract stopped at {label}");
                    return Err(escalate_fatal(&self.escalator, &context, e).await);
                }
            }
        }

        info!(
            "Data Extract Completed: {} query(ies) saved, {} skipped",
            report.executed,
            report.skipped.len()
        );
        Ok(report)
    }

    async fn run_query(&self, session: &Session, query: &QueryDefinition) -> Result<OutputArtifact> {
        debug!("Processing {} (line {})", query.name, query.line_number);

        let object = self.dispatcher.fetch(session, query).await?;
        let document = self.normalizer.normalize(&query.name, &object)?;
        let artifact = self.sink.write(&query.name, &document)?;
        self.sink.forward(&query.name, &document).await?;
        Ok(artifact)
    }

    async fn fatal<T>(&self, context: &str, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => Err(escalate_fatal(&self.escalator, context, e).await),
        }
    }
}

async fn notify(escalator: &Escalator, context: &str, err: &Error) {
    if let Err(notify_err) = escalator.escalate(context, err).await {
        debug!("Notification for '{}' not delivered: {}", context, notify_err);
    }
}

async fn escalate_fatal(escalator: &Escalator, context: &str, err: Error) -> Error {
    notify(escalator, context, &err).await;
    err
}
