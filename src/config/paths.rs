//! Path management for Billbook
//!
//! Every on-disk location hangs off a single base directory:
//!
//! ```text
//! <base>/settings.json
//! <base>/data/inventory.<ext>
//! <base>/data/invoices.<ext>
//! <base>/backups/<table>_<YYYYMMDD_HHMMSS>.<ext>
//! ```
//!
//! ## Path Resolution Order
//!
//! 1. `BILLBOOK_DATA_DIR` environment variable (if set)
//! 2. The platform data directory from `directories` (e.g. `~/.local/share/billbook`)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::BillbookError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "BILLBOOK_DATA_DIR";

/// Manages all paths used by Billbook
#[derive(Debug, Clone)]
pub struct BillbookPaths {
    base_dir: PathBuf,
}

impl BillbookPaths {
    /// Resolve the base directory from the environment or the platform default
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, BillbookError> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) => PathBuf::from(custom),
            None => ProjectDirs::from("", "", "billbook")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or_else(|| {
                    BillbookError::Config("Could not determine a home directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Create BillbookPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory holding the canonical table files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Directory receiving a copy of every table file before it is overwritten
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }

    /// Path of a table file, e.g. `data/inventory.parquet`
    pub fn table_file(&self, table: &str, extension: &str) -> PathBuf {
        self.data_dir().join(format!("{}.{}", table, extension))
    }

    /// Ensure the base, data and backup directories exist
    pub fn ensure_directories(&self) -> Result<(), BillbookError> {
        for dir in [self.base_dir.clone(), self.data_dir(), self.backup_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                BillbookError::Io(format!(
                    "Failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Check if Billbook has been initialized (settings file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}
