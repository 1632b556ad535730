//! Directory listing command

use clap::Args;
use clinic_roster_import::models::{DirectorySnapshot, EmployeeRecord, Gender};
use clinic_roster_import::DirectoryRead;

use crate::commands::import::CACHE_UNAVAILABLE;
use crate::context::AppContext;
use crate::error::CliResult;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Ignore the local cache and read the store
    #[arg(long)]
    pub refresh: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the list command
pub async fn execute(ctx: &AppContext, args: ListArgs) -> CliResult<()> {
    let service = ctx.service();
    if args.refresh {
        service.cache().clear();
    }
    let read = service.load_directory().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&read.snapshot)?);
        if let Some(notice) = cache_notice(&read) {
            eprintln!("{notice}");
        }
    } else {
        print_table(&read.snapshot);
        if let Some(notice) = cache_notice(&read) {
            println!();
            println!("{notice}");
        }
    }
    Ok(())
}

fn cache_notice(read: &DirectoryRead) -> Option<&'static str> {
    read.cache_degraded.then_some(CACHE_UNAVAILABLE)
}

fn print_table(directory: &DirectorySnapshot) {
    if directory.is_empty() {
        println!("The directory is empty. Import a roster to populate it.");
        return;
    }

    println!(
        "{:<12} {:<32} {:<10} {:<20} {:<24} {:<8}",
        "ID", "NAME", "GENDER", "DESIGNATION", "DEPARTMENT", "ROLE"
    );
    for entry in &directory.entries {
        let record = &entry.record;
        println!(
            "{:<12} {:<32} {:<10} {:<20} {:<24} {:<8}",
            entry.id,
            truncate(&record.display_name(), 32),
            gender_label(record),
            truncate(&record.designation, 20),
            truncate(&record.department, 24),
            format!("{:?}", record.role),
        );
    }
    println!();
    println!("{} entries", directory.len());
}

fn gender_label(record: &EmployeeRecord) -> &str {
    match record.gender {
        Gender::Unspecified => "-",
        ref gender => gender.as_str(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
