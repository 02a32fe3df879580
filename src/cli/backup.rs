//! Backup CLI commands
//!
//! Lists and restores the per-table backups taken before every overwrite.

use clap::{Subcommand, ValueEnum};

use crate::display::{format_backup_list, format_size};
use crate::error::{BillbookError, BillbookResult};
use crate::storage::{BackupInfo, SaveReport, Storage};

/// A stored table
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableName {
    Inventory,
    Invoices,
}

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// List available backups, newest first
    List {
        /// Only this table
        #[arg(short, long, value_enum)]
        table: Option<TableName>,
    },

    /// Restore a table from a backup
    Restore {
        /// Table to restore
        #[arg(value_enum)]
        table: TableName,

        /// Backup filename (use 'latest' for the most recent)
        backup: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

fn list_for(storage: &Storage, table: TableName) -> BillbookResult<Vec<BackupInfo>> {
    match table {
        TableName::Inventory => storage.inventory.list_backups(),
        TableName::Invoices => storage.invoices.list_backups(),
    }
}

fn table_label(table: TableName) -> &'static str {
    match table {
        TableName::Inventory => "inventory",
        TableName::Invoices => "invoices",
    }
}

/// Resolve 'latest' to the newest backup in the configured layout
fn resolve_backup(storage: &Storage, table: TableName, backup: &str) -> BillbookResult<String> {
    if backup != "latest" {
        return Ok(backup.to_string());
    }

    list_for(storage, table)?
        .into_iter()
        .find(|info| info.mode == storage.mode())
        .map(|info| info.filename)
        .ok_or_else(|| BillbookError::backup_not_found(format!("latest {}", table_label(table))))
}

/// Handle a backup command
pub fn handle_backup_command(storage: &Storage, cmd: BackupCommands) -> BillbookResult<()> {
    match cmd {
        BackupCommands::List { table } => {
            let tables = match table {
                Some(table) => vec![table],
                None => vec![TableName::Inventory, TableName::Invoices],
            };

            for table in tables {
                let backups = list_for(storage, table)?;
                println!("{}", table_label(table));
                print!("{}", format_backup_list(table_label(table), &backups));
                println!();
            }
        }

        BackupCommands::Restore {
            table,
            backup,
            force,
        } => {
            let filename = resolve_backup(storage, table, &backup)?;

            if !force {
                println!("WARNING: This will replace the current {} table!", table_label(table));
                println!("The current file is backed up first.");
                println!("To proceed, run again with --force flag:");
                println!("  billbook backup restore {} {} --force", table_label(table), filename);
                return Ok(());
            }

            let report: SaveReport = match table {
                TableName::Inventory => storage.inventory.restore_backup(&filename)?,
                TableName::Invoices => storage.invoices.restore_backup(&filename)?,
            };

            println!("Restored {} from {}", table_label(table), filename);
            println!("  Rows: {}", report.rows);
            if let Some(previous) = &report.backup {
                let size = std::fs::metadata(previous).map(|m| m.len()).unwrap_or(0);
                println!(
                    "  Previous file saved as {} ({})",
                    previous.display(),
                    format_size(size)
                );
            }
        }
    }

    Ok(())
}
