//! CLI commands and argument parsing

use crate::config::{Environment, DEFAULT_SETTINGS_FILE};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Salesforce REST extract
#[derive(Parser, Debug)]
#[command(name = "salesforce-extract")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (JSON, or YAML with a .yaml/.yml extension)
    #[arg(short = 'C', long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    pub config: PathBuf,

    /// Connection string to use (default: test in debug builds, production otherwise)
    #[arg(short, long, global = true, value_enum)]
    pub environment: Option<Environment>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Selected environment
    pub fn environment(&self) -> Environment {
        self.environment.unwrap_or_default()
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Archive previous results, then run every query (default)
    Run,

    /// Validate settings and test the Salesforce login
    Check,

    /// Archive previous results only
    Rotate,

    /// Encrypt a Salesforce password for the UserPassword setting
    EncryptPassword {
        /// Plain password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Salesforce security token used as the key (prompted when omitted)
        #[arg(long)]
        token: Option<String>,
    },
}
