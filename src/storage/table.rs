//! Generic record store
//!
//! A `RecordStore<T>` owns the on-disk representation of one table. It loads
//! and saves the whole table at once in the configured layout, recomputes
//! derived fields on the way in and out, and backs up the canonical file
//! before every overwrite.

use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use super::backup::{BackupInfo, BackupManager};
use super::file_io::{read_bytes, write_bytes_atomic};
use super::format::{decode_columnar, decode_json_lines, encode_columnar, encode_json_lines};
use crate::config::{BillbookPaths, StorageMode};
use crate::error::{BillbookError, BillbookResult};

/// A fixed-shape record type that can be stored as a table
pub trait Table: Serialize + DeserializeOwned + Clone {
    /// Table name, used for the file name and backup names
    const NAME: &'static str;

    /// Column names of the canonical schema, in storage order
    const COLUMNS: &'static [&'static str];

    /// One vector per column, the columnar layout's payload
    type Columns: Serialize + DeserializeOwned;

    fn to_columns(rows: &[Self]) -> BillbookResult<Self::Columns>;

    /// Rebuild rows from columns, failing if any column length disagrees
    fn from_columns(columns: Self::Columns, row_count: usize) -> Result<Vec<Self>, String>;

    /// Recompute derived fields from source fields
    fn refresh(&mut self) {}

    /// Check the row before it is written
    fn validate_row(&self) -> BillbookResult<()>;
}

/// What a save did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub path: PathBuf,
    pub rows: usize,
    /// Where the previous file was copied, if there was one
    pub backup: Option<PathBuf>,
}

/// Load/save access to one table in one layout
#[derive(Debug, Clone)]
pub struct RecordStore<T: Table> {
    paths: BillbookPaths,
    mode: StorageMode,
    backups: BackupManager,
    _table: std::marker::PhantomData<T>,
}

impl<T: Table> RecordStore<T> {
    pub fn new(paths: BillbookPaths, mode: StorageMode) -> Self {
        let backups = BackupManager::new(paths.backup_dir());
        Self {
            paths,
            mode,
            backups,
            _table: std::marker::PhantomData,
        }
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    /// Canonical file for this table in the configured layout
    pub fn path(&self) -> PathBuf {
        self.path_for(self.mode)
    }

    pub fn path_for(&self, mode: StorageMode) -> PathBuf {
        self.paths.table_file(T::NAME, mode.extension())
    }

    /// Load the table
    ///
    /// A missing file is an empty table. A present file that cannot be parsed
    /// is a `Parse` error; nothing is discarded.
    pub fn load(&self) -> BillbookResult<Vec<T>> {
        self.load_from(self.mode)
    }

    /// Load the table as stored in a specific layout
    pub fn load_from(&self, mode: StorageMode) -> BillbookResult<Vec<T>> {
        let path = self.path_for(mode);

        let bytes = match read_bytes(&path)? {
            Some(bytes) => bytes,
            None => {
                debug!(table = T::NAME, path = %path.display(), "No table file, starting empty");
                return Ok(Vec::new());
            }
        };

        let mut rows = decode_rows::<T>(mode, &bytes).map_err(|reason| BillbookError::Parse {
            path: path.clone(),
            reason,
        })?;

        for row in &mut rows {
            row.refresh();
        }

        debug!(table = T::NAME, rows = rows.len(), path = %path.display(), "Table loaded");
        Ok(rows)
    }

    /// Replace the table on disk with `rows`
    ///
    /// Derived fields are recomputed on the caller's rows first. Every row is
    /// validated before anything touches the disk. The current file, if any,
    /// is backed up before the new contents are written.
    pub fn save(&self, rows: &mut [T]) -> BillbookResult<SaveReport> {
        for row in rows.iter_mut() {
            row.refresh();
        }
        for row in rows.iter() {
            row.validate_row()?;
        }

        let bytes = encode_rows(self.mode, rows)?;
        let path = self.path();

        let backup = self.backups.backup_file(T::NAME, &path)?;
        write_bytes_atomic(&path, &bytes)?;

        debug!(table = T::NAME, rows = rows.len(), path = %path.display(), "Table saved");
        Ok(SaveReport {
            path,
            rows: rows.len(),
            backup,
        })
    }

    /// Copy the table stored in `source` layout into the configured layout
    ///
    /// Goes through `save`, so the current canonical file is backed up first.
    pub fn import_from(&self, source: StorageMode) -> BillbookResult<SaveReport> {
        if source == self.mode {
            return Err(BillbookError::Validation(format!(
                "{} is already stored as {}",
                T::NAME,
                source
            )));
        }

        let source_path = self.path_for(source);
        if !source_path.exists() {
            return Err(BillbookError::Storage(format!(
                "No {} data to import at {}",
                T::NAME,
                source_path.display()
            )));
        }

        let mut rows = self.load_from(source)?;
        let report = self.save(&mut rows)?;
        info!(table = T::NAME, rows = report.rows, from = %source, to = %self.mode, "Imported table from other layout");
        Ok(report)
    }

    /// Backups of this table, newest first
    pub fn list_backups(&self) -> BillbookResult<Vec<BackupInfo>> {
        self.backups.list_backups(T::NAME)
    }

    /// Put a backup back in place of the canonical file
    ///
    /// The backup must be in the configured layout and must parse. The file
    /// it replaces is backed up first.
    pub fn restore_backup(&self, filename: &str) -> BillbookResult<SaveReport> {
        let info = self.backups.get_backup(T::NAME, filename)?;
        if info.mode != self.mode {
            return Err(BillbookError::Validation(format!(
                "Backup {} is stored as {}, but the current storage mode is {}",
                filename, info.mode, self.mode
            )));
        }

        let bytes = read_bytes(&info.path)?.ok_or_else(|| BillbookError::backup_not_found(filename))?;
        let rows = decode_rows::<T>(self.mode, &bytes).map_err(|reason| BillbookError::Parse {
            path: info.path.clone(),
            reason,
        })?;

        let path = self.path();
        let backup = self.backups.backup_file(T::NAME, &path)?;
        write_bytes_atomic(&path, &bytes)?;

        info!(table = T::NAME, backup = %filename, rows = rows.len(), "Backup restored");
        Ok(SaveReport {
            path,
            rows: rows.len(),
            backup,
        })
    }
}

fn encode_rows<T: Table>(mode: StorageMode, rows: &[T]) -> BillbookResult<Vec<u8>> {
    match mode {
        StorageMode::Json => encode_json_lines(rows),
        StorageMode::Parquet => encode_columnar(T::NAME, rows.len(), T::to_columns(rows)?),
    }
}

fn decode_rows<T: Table>(mode: StorageMode, bytes: &[u8]) -> Result<Vec<T>, String> {
    match mode {
        StorageMode::Json => decode_json_lines(bytes),
        StorageMode::Parquet => {
            let (row_count, columns) = decode_columnar::<T::Columns>(T::NAME, bytes)?;
            T::from_columns(columns, row_count)
        }
    }
}
