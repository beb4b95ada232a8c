//! Sink module
//!
//! Persists each normalized document and hands it to the relational side.
//!
//! # Overview
//!
//! - `OutputWriter` - timestamped `{name}-{yyyy-MM-dd_HH-mm-ss-fff}.xml` files
//! - `ProcedureSink` - named stored procedure calls with named parameters
//! - `SqlServerSink` - SQL Server backend (`tiberius`)
//! - `DuckDbSink` - local journal backend (`duckdb`)

mod journal;
mod procedure;
mod sqlserver;
mod writer;

pub use journal::{DuckDbSink, RecordedCall};
pub use procedure::{ProcedureParam, ProcedureSink};
pub use sqlserver::{exec_statement, SqlServerSink};
pub use writer::{artifact_file_name, OutputArtifact, OutputWriter, TIMESTAMP_FORMAT};

use crate::config::{AppSettings, Environment, SinkBackend};
use crate::error::Result;
use crate::normalize::NormalizedDocument;
use std::sync::Arc;
use tracing::{debug, info};

/// Build the procedure backend selected by the settings
pub fn build_procedure_sink(
    settings: &AppSettings,
    environment: Environment,
) -> Arc<dyn ProcedureSink> {
    let connection = settings.connection_strings.for_environment(environment);
    let procs = &settings.stored_procedures;

    let sink: Arc<dyn ProcedureSink> = match procs.backend {
        SinkBackend::SqlServer => Arc::new(SqlServerSink::new(connection, procs.command_timeout())),
        SinkBackend::DuckDb => Arc::new(DuckDbSink::new(connection)),
    };
    debug!(
        "Using {} procedure sink ({:?} environment)",
        sink.backend_name(),
        environment
    );
    sink
}

/// Writes results files and forwards them to the `xmlParse` procedure
#[derive(Clone)]
pub struct Sink {
    writer: OutputWriter,
    procedures: Arc<dyn ProcedureSink>,
    xml_parse: String,
}

impl Sink {
    /// Create a sink
    pub fn new(
        writer: OutputWriter,
        procedures: Arc<dyn ProcedureSink>,
        xml_parse: impl Into<String>,
    ) -> Self {
        Self {
            writer,
            procedures,
            xml_parse: xml_parse.into(),
        }
    }

    /// Write `document` to a new results file
    pub fn write(&self, name: &str, document: &NormalizedDocument) -> Result<OutputArtifact> {
        let artifact = self.writer.write(name, document)?;
        info!("Saved {} results to {}", name, artifact.path.display());
        Ok(artifact)
    }

    /// Pass `document` to the `xmlParse` procedure as `@Type`, `@xml_text`
    pub async fn forward(&self, name: &str, document: &NormalizedDocument) -> Result<()> {
        let params = [
            ProcedureParam::new("Type", name),
            ProcedureParam::new("xml_text", document.inner_xml()),
        ];
        self.procedures.call(&self.xml_parse, &params).await?;
        debug!("Forwarded {} to {}", name, self.xml_parse);
        Ok(())
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("writer", &self.writer)
            .field("backend", &self.procedures.backend_name())
            .field("xml_parse", &self.xml_parse)
            .finish()
    }
}

#[cfg(test)]
mod tests;
