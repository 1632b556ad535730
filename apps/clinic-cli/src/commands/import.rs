//! Roster import command

use std::path::{Path, PathBuf};

use clap::Args;
use clinic_roster_import::{ImportSummary, NoticeLevel};

use crate::context::AppContext;
use crate::error::{CliError, CliResult};

/// Shown whenever a directory snapshot could not be written to the local cache.
pub(crate) const CACHE_UNAVAILABLE: &str =
    "The local directory cache is unavailable; listings will read the store directly.";

/// Spreadsheet formats accepted by the importer.
const ALLOWED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Roster spreadsheet to import
    pub file: PathBuf,

    /// Output the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the import command
pub async fn execute(ctx: &AppContext, args: ImportArgs) -> CliResult<()> {
    let summary = run_import(ctx, &args.file).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Import `file` and return the summary without printing it.
pub async fn run_import(ctx: &AppContext, file: &Path) -> CliResult<ImportSummary> {
    check_extension(file)?;
    let data = tokio::fs::read(file)
        .await
        .map_err(|e| CliError::Io(format!("Failed to read {}: {e}", file.display())))?;

    Ok(ctx.service().import_workbook(&data).await?)
}

fn check_extension(file: &Path) -> CliResult<()> {
    let extension = file
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(CliError::Validation(format!(
            "{} is not a spreadsheet (expected one of: {})",
            file.display(),
            ALLOWED_EXTENSIONS.join(", ")
        )))
    }
}

fn print_summary(summary: &ImportSummary) {
    let notice = summary.to_notification();
    let marker = match notice.level {
        NoticeLevel::Success => "✓",
        NoticeLevel::Warning => "!",
        NoticeLevel::Error => "✗",
    };

    println!("{marker} {}", notice.title);
    println!("  Rows read:    {}", summary.rows_read);
    println!("  Rows skipped: {}", summary.rows_skipped);
    println!("  Added:        {}", summary.added);
    println!("  Updated:      {}", summary.updated);
    println!("  Removed:      {}", summary.removed);
    println!("  Errors:       {}", summary.errors);
    println!("  File SHA-256: {}", summary.file_hash);

    if !summary.snapshot_refreshed {
        println!();
        println!(
            "The directory could not be re-read after the import; the local cache was cleared."
        );
    } else if summary.cache_degraded {
        println!();
        println!("{CACHE_UNAVAILABLE}");
    }
}
