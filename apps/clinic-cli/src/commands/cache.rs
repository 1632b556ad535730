//! Cache management CLI commands

use clap::{Args, Subcommand};

use crate::context::AppContext;
use crate::error::CliResult;

/// Cache management commands
#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show what the directory cache holds
    Status(CacheStatusArgs),
    /// Remove the cached directory snapshot
    Clear,
}

/// Arguments for the cache status command
#[derive(Args, Debug)]
pub struct CacheStatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute cache commands
pub fn execute(ctx: &AppContext, args: CacheArgs) -> CliResult<()> {
    match args.command {
        CacheCommands::Status(status_args) => execute_cache_status(ctx, status_args),
        CacheCommands::Clear => execute_cache_clear(ctx),
    }
}

fn execute_cache_status(ctx: &AppContext, args: CacheStatusArgs) -> CliResult<()> {
    let status = ctx.cache().status();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Cache Status:");
    println!("  Location: {}", ctx.paths.cache_dir.display());
    println!(
        "  TTL: {} seconds ({} hours)",
        ctx.config.cache_ttl_secs,
        ctx.config.cache_ttl_secs / 3600
    );
    match status {
        None => println!("  No cached directory."),
        Some(status) => {
            println!("  Entries: {}", status.entries);
            println!(
                "  Cached At: {}",
                status.cached_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!(
                "  Expires At: {}",
                status.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("  Status: {}", if status.expired { "expired" } else { "fresh" });
        }
    }
    Ok(())
}

fn execute_cache_clear(ctx: &AppContext) -> CliResult<()> {
    ctx.cache().clear();
    println!("✓ Directory cache cleared");
    Ok(())
}
