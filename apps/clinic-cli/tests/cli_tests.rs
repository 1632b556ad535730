//! Command-level tests against a temporary data directory.

use clap::Parser;
use clinic_cli::commands::cache::{CacheArgs, CacheCommands};
use clinic_cli::commands::{cache, import, seed_admin};
use clinic_cli::context::AppContext;
use clinic_cli::error::CliError;
use clinic_cli::paths::DataPaths;
use clinic_cli::{run, Cli};
use clinic_roster_import::ImportConfig;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

fn roster(ids: &[&str]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 1, "Employee No.").unwrap();
    for (i, id) in ids.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 1, *id).unwrap();
        sheet.write_string(row, 2, "Bautista, Rosa L.").unwrap();
        sheet.write_number(row, 3, 32874).unwrap();
        sheet.write_string(row, 4, "female").unwrap();
        sheet.write_string(row, 12, "medical technologist").unwrap();
        sheet.write_string(row, 13, "LABORATORY").unwrap();
    }
    workbook.save_to_buffer().unwrap()
}

fn context(dir: &TempDir) -> AppContext {
    AppContext::new(DataPaths::under(dir.path()), ImportConfig::default())
}

#[tokio::test]
async fn test_seed_import_and_cache_lifecycle() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let file = dir.path().join("roster.xlsx");
    std::fs::write(&file, roster(&["LAB-1", "LAB-2"])).unwrap();

    seed_admin::execute(&ctx).await.unwrap();
    let summary = import::run_import(&ctx, &file).await.unwrap();
    assert_eq!(summary.added, 2);
    assert_eq!(summary.removed, 0);
    assert!(dir.path().join("directory/users.json").exists());

    let status = ctx.cache().status().unwrap();
    assert_eq!(status.entries, 3);
    assert!(!status.expired);

    cache::execute(
        &ctx,
        CacheArgs {
            command: CacheCommands::Clear,
        },
    )
    .unwrap();
    assert!(ctx.cache().status().is_none());

    // Re-import with one employee gone.
    std::fs::write(&file, roster(&["LAB-2"])).unwrap();
    let summary = import::run_import(&ctx, &file).await.unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.removed, 1);
    let read = ctx.service().load_directory().await.unwrap();
    assert_eq!(read.snapshot.len(), 2);
    assert!(!read.cache_degraded);
}

#[tokio::test]
async fn test_rejects_non_spreadsheet_extension() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let file = dir.path().join("roster.csv");
    std::fs::write(&file, "id,name\n1,x\n").unwrap();

    let err = import::run_import(&ctx, &file).await.unwrap_err();
    assert!(matches!(err, CliError::Validation(_)));
    assert_eq!(err.exit_code(), 4);
}

#[tokio::test]
async fn test_corrupt_workbook_exit_code() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let file = dir.path().join("roster.xlsx");
    std::fs::write(&file, b"not really a workbook").unwrap();

    let err = import::run_import(&ctx, &file).await.unwrap_err();
    assert_eq!(err.exit_code(), 4);
    assert_eq!(err.notification().unwrap().kind, "invalid-spreadsheet");
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let err = import::run_import(&ctx, &dir.path().join("absent.xlsx"))
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Io(_)));
}

#[tokio::test]
async fn test_run_dispatches_seed_admin() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().to_str().unwrap();
    let cli = Cli::try_parse_from(["clinic-cli", "--data-dir", data_dir, "seed-admin"]).unwrap();
    run(cli).await.unwrap();
    assert!(dir.path().join("directory").exists());
}
