//! clinic-cli library
//!
//! The argument model and command implementations live here so integration
//! tests can drive them without spawning the binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;
pub mod context;
pub mod error;
pub mod logging;
pub mod paths;

use context::AppContext;
use error::CliResult;

/// Clinic roster console
#[derive(Parser, Debug)]
#[command(name = "clinic-cli")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the local directory store and cache
    #[arg(long, global = true, env = "CLINIC_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, env = "CLINIC_LOG", default_value = "warn")]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a roster spreadsheet and reconcile the directory against it
    Import(commands::import::ImportArgs),

    /// List the employee directory
    List(commands::list::ListArgs),

    /// Create the administrative entry if it is missing
    SeedAdmin,

    /// Manage the local directory cache
    Cache(commands::cache::CacheArgs),
}

/// Execute a parsed command line.
pub async fn run(cli: Cli) -> CliResult<()> {
    let ctx = AppContext::from_env(cli.data_dir)?;
    match cli.command {
        Commands::Import(args) => commands::import::execute(&ctx, args).await,
        Commands::List(args) => commands::list::execute(&ctx, args).await,
        Commands::SeedAdmin => commands::seed_admin::execute(&ctx).await,
        Commands::Cache(args) => commands::cache::execute(&ctx, args),
    }
}
