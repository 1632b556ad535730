//! Import configuration.

use std::env::VarError;
use std::str::FromStr;

use crate::cache::DEFAULT_TTL_SECONDS;
use crate::services::sheet_parser::{SheetParseConfig, DEFAULT_HEADER_ROWS, DEFAULT_MAX_ROWS};
use crate::store::MAX_BATCH_OPERATIONS;

/// Default directory collection name.
pub const DEFAULT_COLLECTION: &str = "users";

/// Default id of the administrative entry that imports never delete.
pub const DEFAULT_PROTECTED_ID: &str = "admin";

/// Configuration for the roster import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Directory collection holding employee records.
    pub collection: String,

    /// Remote id of the administrative entry. Compared case-insensitively.
    pub protected_id: String,

    /// Maximum data rows read per import.
    pub max_rows: usize,

    /// Heading rows skipped before the first data row.
    pub header_rows: usize,

    /// Upserts per batch commit (1..=400).
    pub batch_size: usize,

    /// Directory cache lifetime.
    pub cache_ttl_secs: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            protected_id: DEFAULT_PROTECTED_ID.to_string(),
            max_rows: DEFAULT_MAX_ROWS,
            header_rows: DEFAULT_HEADER_ROWS,
            batch_size: MAX_BATCH_OPERATIONS,
            cache_ttl_secs: DEFAULT_TTL_SECONDS,
        }
    }
}

impl ImportConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// Unset variables take their defaults; set but unparseable ones are
    /// rejected.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let defaults = Self::default();

        let collection = non_empty(&reader, "ROSTER_COLLECTION", defaults.collection)?;
        let protected_id = non_empty(&reader, "ROSTER_PROTECTED_ID", defaults.protected_id)?;
        let max_rows = parsed(&reader, "ROSTER_MAX_ROWS", defaults.max_rows)?;
        let header_rows = parsed(&reader, "ROSTER_HEADER_ROWS", defaults.header_rows)?;
        let batch_size = parsed(&reader, "ROSTER_BATCH_SIZE", defaults.batch_size)?;
        let cache_ttl_secs = parsed(&reader, "ROSTER_CACHE_TTL_SECS", defaults.cache_ttl_secs)?;

        let config = Self {
            collection,
            protected_id,
            max_rows,
            header_rows,
            batch_size,
            cache_ttl_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_BATCH_OPERATIONS).contains(&self.batch_size) {
            return Err(ConfigError::InvalidValue(
                "ROSTER_BATCH_SIZE".into(),
                format!("must be between 1 and {MAX_BATCH_OPERATIONS}"),
            ));
        }
        if self.max_rows == 0 {
            return Err(ConfigError::InvalidValue(
                "ROSTER_MAX_ROWS".into(),
                "must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Sheet parser settings derived from this configuration.
    #[must_use]
    pub fn sheet_config(&self) -> SheetParseConfig {
        SheetParseConfig::new()
            .with_max_rows(self.max_rows)
            .with_header_rows(self.header_rows)
    }
}

fn non_empty<F>(reader: &F, key: &str, default: String) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    match reader(key) {
        Ok(value) if value.trim().is_empty() => {
            Err(ConfigError::InvalidValue(key.into(), "must not be empty".into()))
        }
        Ok(value) => Ok(value.trim().to_string()),
        Err(_) => Ok(default),
    }
}

fn parsed<F, T>(reader: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match reader(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.into(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
