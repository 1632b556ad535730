//! CLI error types and exit codes

use clinic_roster_import::{ConfigError, ImportError, Notification};
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 3: Directory store unavailable
/// - 4: Invalid input
/// - 5: Another import is running
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Import(#[from] ImportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Import(ImportError::Parse(_) | ImportError::EmptyWorkbook) => 4,
            CliError::Import(ImportError::Store(_)) => 3,
            CliError::Import(ImportError::ConcurrentImport) => 5,
            CliError::Validation(_) => 4,
            CliError::Config(_) | CliError::Io(_) => 1,
        }
    }

    /// Notification shown for import failures.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            CliError::Import(e) => Some(e.to_notification()),
            _ => None,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();
        let (label, message) = match self.notification() {
            Some(notice) => (
                notice.title.clone(),
                notice.detail.unwrap_or_else(|| self.to_string()),
            ),
            None => ("Error".to_string(), self.to_string()),
        };

        if use_color {
            eprintln!("\x1b[31m{label}:\x1b[0m {message}");
        } else {
            eprintln!("{label}: {message}");
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(format!("JSON error: {e}"))
    }
}
