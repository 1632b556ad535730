//! Wiring of configuration, store, cache and service for one invocation.

use std::path::PathBuf;
use std::sync::Arc;

use clinic_roster_import::store::JsonFileDirectoryStore;
use clinic_roster_import::{DirectoryCache, FileSlot, ImportConfig, ImportService};

use crate::error::CliResult;
use crate::paths::DataPaths;

/// Everything a command needs.
pub struct AppContext {
    pub paths: DataPaths,
    pub config: ImportConfig,
}

impl AppContext {
    /// Resolve paths and read `ROSTER_*` configuration from the environment.
    pub fn from_env(data_dir: Option<PathBuf>) -> CliResult<Self> {
        Ok(Self::new(DataPaths::resolve(data_dir)?, ImportConfig::from_env()?))
    }

    pub fn new(paths: DataPaths, config: ImportConfig) -> Self {
        Self { paths, config }
    }

    pub fn cache(&self) -> DirectoryCache {
        DirectoryCache::with_ttl(
            Arc::new(FileSlot::new(&self.paths.cache_dir)),
            self.config.cache_ttl_secs,
        )
    }

    pub fn service(&self) -> ImportService {
        let store = Arc::new(JsonFileDirectoryStore::new(&self.paths.directory_dir));
        ImportService::new(store, self.cache(), self.config.clone())
    }
}
