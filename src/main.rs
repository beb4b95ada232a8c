//! Salesforce Extract CLI
//!
//! Runs one extract and exits with a code describing the outcome

use clap::Parser;
use salesforce_extract::cli::{Cli, Runner};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let runner = Runner::new(cli);

    let code = match runner.run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}
