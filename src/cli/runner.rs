//! CLI runner - executes commands

use crate::archive::ArchiveManager;
use crate::cipher;
use crate::cli::commands::{Cli, Commands};
use crate::config::AppSettings;
use crate::error::{Error, Result};
use crate::logging::init_logging;
use crate::pipeline::Pipeline;
use std::io::{self, BufRead, Write};
use tracing::{error, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command and return the process exit code.
    ///
    /// Logging is installed here, once the log directory is known.
    pub async fn run(&self) -> Result<i32> {
        let command = self.cli.command.clone().unwrap_or(Commands::Run);

        if let Commands::EncryptPassword { password, token } = command {
            let _guard = init_logging(self.cli.verbose, None);
            return self.encrypt_password(password, token);
        }

        let settings = AppSettings::load(&self.cli.config);
        let log_directory = settings
            .as_ref()
            .ok()
            .and_then(|s| s.file_locations.log_directory.clone());
        let _guard = init_logging(self.cli.verbose, log_directory.as_deref());

        let settings = settings.inspect_err(|e| error!("{}", e))?;
        info!(
            "Loaded settings from {} ({})",
            self.cli.config.display(),
            settings.title.as_deref().unwrap_or("untitled")
        );

        match command {
            Commands::Run => self.extract(&settings).await,
            Commands::Check => self.check(&settings).await,
            Commands::Rotate => self.rotate(&settings),
            Commands::EncryptPassword { .. } => Ok(0),
        }
    }

    async fn extract(&self, settings: &AppSettings) -> Result<i32> {
        let pipeline = Pipeline::from_settings(settings, self.cli.environment()).await?;
        let report = pipeline.run().await?;
        for skipped in &report.skipped {
            info!("Skipped {}: {}", skipped.name, skipped.reason);
        }
        Ok(report.exit_code())
    }

    async fn check(&self, settings: &AppSettings) -> Result<i32> {
        let pipeline = Pipeline::from_settings(settings, self.cli.environment()).await?;
        let session = pipeline.check().await?;
        println!("Connection OK: {}", session.service_base_url);
        Ok(0)
    }

    fn rotate(&self, settings: &AppSettings) -> Result<i32> {
        let files = &settings.file_locations;
        let report = ArchiveManager::new(&files.output_directory, files.archive_exclusions.clone())
            .rotate()?;

        match &report.archive {
            Some(archive) => println!(
                "Archived {} file(s) into {}",
                report.added.len(),
                archive.display()
            ),
            None => println!("Nothing to archive"),
        }
        Ok(0)
    }

    fn encrypt_password(&self, password: Option<String>, token: Option<String>) -> Result<i32> {
        let password = match password {
            Some(p) => p,
            None => prompt("Salesforce password: ")?,
        };
        let token = match token {
            Some(t) => t,
            None => prompt("Salesforce security token: ")?,
        };
        if password.is_empty() || token.is_empty() {
            return Err(Error::cipher("password and security token are required"));
        }

        println!("{}", cipher::encrypt(&password, &token)?);
        Ok(0)
    }
}

fn prompt(label: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{label}")?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
