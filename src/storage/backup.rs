//! Backup-before-overwrite for table files
//!
//! Before a canonical table file is replaced, its current bytes are copied
//! unmodified into the backup directory as
//! `<table>_<YYYYMMDD_HHMMSS>.<ext>`. A second backup of the same table within
//! the same second gets a counter suffix (`<table>_<YYYYMMDD_HHMMSS>-1.<ext>`)
//! instead of replacing the first.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::info;

use crate::config::StorageMode;
use crate::error::{BillbookError, BillbookResult};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Metadata about a backup file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupInfo {
    /// Backup filename
    pub filename: String,
    /// Full path to backup
    pub path: PathBuf,
    /// Table the backup was taken from
    pub table: String,
    /// Layout of the backed-up file, from its extension
    pub mode: StorageMode,
    /// Local time the backup was taken, to the second
    pub created_at: NaiveDateTime,
    /// Position among backups taken within the same second
    pub sequence: u32,
    /// Size in bytes
    pub size_bytes: u64,
}

/// Copies table files into the backup directory and lists them back
#[derive(Debug, Clone)]
pub struct BackupManager {
    backup_dir: PathBuf,
}

impl BackupManager {
    pub fn new(backup_dir: PathBuf) -> Self {
        Self { backup_dir }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Copy `source` into the backup directory if it exists
    ///
    /// Returns the backup path, or `None` when there was nothing to back up.
    pub fn backup_file(&self, table: &str, source: &Path) -> BillbookResult<Option<PathBuf>> {
        self.backup_file_at(table, source, Local::now().naive_local())
    }

    fn backup_file_at(
        &self,
        table: &str,
        source: &Path,
        now: NaiveDateTime,
    ) -> BillbookResult<Option<PathBuf>> {
        if !source.exists() {
            return Ok(None);
        }

        fs::create_dir_all(&self.backup_dir)
            .map_err(|e| BillbookError::Io(format!("Failed to create backup directory: {}", e)))?;

        let extension = source
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_default();
        let stamp = now.format(TIMESTAMP_FORMAT).to_string();

        let mut sequence = 0u32;
        let backup_path = loop {
            let filename = backup_filename(table, &stamp, sequence, &extension);
            let candidate = self.backup_dir.join(filename);
            if !candidate.exists() {
                break candidate;
            }
            sequence += 1;
        };

        fs::copy(source, &backup_path).map_err(|e| {
            BillbookError::Io(format!(
                "Failed to back up {} to {}: {}",
                source.display(),
                backup_path.display(),
                e
            ))
        })?;

        info!(table, backup = %backup_path.display(), "Backup taken");
        Ok(Some(backup_path))
    }

    /// List backups of one table, newest first
    pub fn list_backups(&self, table: &str) -> BillbookResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backup_dir)
            .map_err(|e| BillbookError::Io(format!("Failed to read backup directory: {}", e)))?
        {
            let entry = entry
                .map_err(|e| BillbookError::Io(format!("Failed to read directory entry: {}", e)))?;

            if let Some(info) = parse_backup_info(table, &entry.path()) {
                backups.push(info);
            }
        }

        backups.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.sequence.cmp(&a.sequence))
        });

        Ok(backups)
    }

    /// Look up one backup of a table by filename
    ///
    /// The filename must be a bare name inside the backup directory.
    pub fn get_backup(&self, table: &str, filename: &str) -> BillbookResult<BackupInfo> {
        if Path::new(filename).file_name() != Some(OsStr::new(filename)) {
            return Err(BillbookError::Validation(format!(
                "Invalid backup filename: {}",
                filename
            )));
        }
        let path = self.backup_dir.join(filename);
        if !path.exists() {
            return Err(BillbookError::backup_not_found(filename));
        }
        parse_backup_info(table, &path).ok_or_else(|| {
            BillbookError::Validation(format!(
                "{} is not a backup of the {} table",
                filename, table
            ))
        })
    }
}

fn backup_filename(table: &str, stamp: &str, sequence: u32, extension: &str) -> String {
    if sequence == 0 {
        format!("{}_{}.{}", table, stamp, extension)
    } else {
        format!("{}_{}-{}.{}", table, stamp, sequence, extension)
    }
}

/// Parse `<table>_<YYYYMMDD_HHMMSS>[-N].<ext>`
fn parse_backup_info(table: &str, path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_string_lossy().to_string();
    let extension = path.extension()?.to_string_lossy().to_string();
    let mode = StorageMode::parse(&extension)?;

    let stem = filename
        .strip_suffix(&format!(".{}", extension))?
        .strip_prefix(table)?
        .strip_prefix('_')?;

    let (stamp, sequence) = match stem.split_once('-') {
        Some((stamp, sequence)) => (stamp, sequence.parse().ok()?),
        None => (stem, 0),
    };
    let created_at = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;

    let size_bytes = fs::metadata(path).ok()?.len();

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        table: table.to_string(),
        mode,
        created_at,
        sequence,
        size_bytes,
    })
}
