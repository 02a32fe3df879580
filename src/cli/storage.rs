//! Storage CLI commands

use clap::Subcommand;

use crate::display::format_table_status;
use crate::error::BillbookResult;
use crate::storage::Storage;

/// Storage subcommands
#[derive(Subcommand)]
pub enum StorageCommands {
    /// Show table files, layouts and backup counts
    Status,

    /// Copy tables stored in the other layout into the configured one
    #[command(name = "import-other")]
    ImportOther,
}

/// Handle a storage command
pub fn handle_storage_command(storage: &Storage, cmd: StorageCommands) -> BillbookResult<()> {
    match cmd {
        StorageCommands::Status => {
            println!("Storage mode: {}", storage.mode());
            print!("{}", format_table_status(&storage.status()?));
        }

        StorageCommands::ImportOther => {
            let reports = storage.import_other_format()?;
            if reports.is_empty() {
                println!(
                    "No {} tables found to import.",
                    storage.mode().other()
                );
                return Ok(());
            }

            for (table, report) in reports {
                println!(
                    "Imported {} ({} rows) into {}",
                    table,
                    report.rows,
                    report.path.display()
                );
                if let Some(backup) = report.backup {
                    println!("  Previous file saved as {}", backup.display());
                }
            }
        }
    }

    Ok(())
}
