//! clinic-cli - console for the clinic employee roster
//!
//! Imports HR roster spreadsheets into the employee directory, lists the
//! directory and manages the local directory cache.

use clap::Parser;
use clinic_cli::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = clinic_cli::logging::init_logging(&cli.log_filter, cli.log_json) {
        e.print();
        std::process::exit(e.exit_code());
    }

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}
