//! Storage layer for Billbook
//!
//! Whole-table load/save in a columnar binary or JSON Lines layout, with
//! atomic writes and a backup of the previous file before every overwrite.

pub mod backup;
pub mod file_io;
pub mod format;
pub mod inventory;
pub mod invoices;
pub mod table;

pub use backup::{BackupInfo, BackupManager};
pub use file_io::{read_json_required, write_json_atomic};
pub use inventory::InventoryStore;
pub use invoices::InvoiceStore;
pub use table::{RecordStore, SaveReport, Table};

use tracing::debug;

use crate::config::{BillbookPaths, Settings, StorageMode};
use crate::error::BillbookResult;
use crate::models::{InventoryItem, Invoice};

/// Main storage coordinator that provides access to every table
pub struct Storage {
    paths: BillbookPaths,
    mode: StorageMode,
    pub inventory: InventoryStore,
    pub invoices: InvoiceStore,
}

/// Summary of one table for status output
#[derive(Debug, Clone)]
pub struct TableStatus {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub path: std::path::PathBuf,
    pub exists: bool,
    pub other_exists: bool,
    pub backups: usize,
}

impl Storage {
    /// Create a new Storage instance in the configured layout
    pub fn new(paths: BillbookPaths, settings: &Settings) -> BillbookResult<Self> {
        paths.ensure_directories()?;
        let mode = settings.storage_mode;
        debug!(base = %paths.base_dir().display(), mode = %mode, "Opening storage");

        Ok(Self {
            inventory: InventoryStore::new(paths.clone(), mode),
            invoices: InvoiceStore::new(paths.clone(), mode),
            paths,
            mode,
        })
    }

    pub fn paths(&self) -> &BillbookPaths {
        &self.paths
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    /// Copy every table present in the other layout into the configured one
    ///
    /// Tables with no file in the other layout are skipped.
    pub fn import_other_format(&self) -> BillbookResult<Vec<(&'static str, SaveReport)>> {
        let source = self.mode.other();
        let mut reports = Vec::new();

        if self.inventory.path_for(source).exists() {
            reports.push((InventoryItem::NAME, self.inventory.import_from(source)?));
        }
        if self.invoices.path_for(source).exists() {
            reports.push((Invoice::NAME, self.invoices.import_from(source)?));
        }

        Ok(reports)
    }

    /// Status of every table
    pub fn status(&self) -> BillbookResult<Vec<TableStatus>> {
        Ok(vec![
            table_status(&self.inventory)?,
            table_status(&self.invoices)?,
        ])
    }
}

fn table_status<T: Table>(store: &RecordStore<T>) -> BillbookResult<TableStatus> {
    let path = store.path();
    Ok(TableStatus {
        name: T::NAME,
        columns: T::COLUMNS,
        exists: path.exists(),
        other_exists: store.path_for(store.mode().other()).exists(),
        backups: store.list_backups()?.len(),
        path,
    })
}
