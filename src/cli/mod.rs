//! CLI module
//!
//! Command-line interface for the extract job.
//!
//! # Commands
//!
//! - `run` - Archive previous output and run every query (default)
//! - `check` - Validate settings and test the Salesforce login
//! - `rotate` - Archive previous output only
//! - `encrypt-password` - Produce the encrypted `UserPassword` value

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
