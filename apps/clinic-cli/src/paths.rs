//! Platform-specific data paths

use std::path::{Path, PathBuf};

use crate::error::{CliError, CliResult};

/// On-disk layout of the console's local data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    /// Base data directory
    pub data_dir: PathBuf,
    /// JSON files of the directory store, one per collection
    pub directory_dir: PathBuf,
    /// Key-value slot files of the directory cache
    pub cache_dir: PathBuf,
}

impl DataPaths {
    /// Resolve paths, preferring `override_dir` (`--data-dir` / `CLINIC_DATA_DIR`).
    ///
    /// Default base directory:
    /// - Linux: ~/.local/share/clinic/
    /// - macOS: ~/Library/Application Support/clinic/
    /// - Windows: %APPDATA%\clinic\
    pub fn resolve(override_dir: Option<PathBuf>) -> CliResult<Self> {
        let data_dir = match override_dir {
            Some(dir) => dir,
            None => dirs::data_dir()
                .ok_or_else(|| CliError::Config("Could not determine data directory".to_string()))?
                .join("clinic"),
        };
        Ok(Self::under(&data_dir))
    }

    /// Layout rooted at `data_dir`.
    pub fn under(data_dir: &Path) -> Self {
        Self {
            directory_dir: data_dir.join("directory"),
            cache_dir: data_dir.join("cache"),
            data_dir: data_dir.to_path_buf(),
        }
    }
}
