use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use billbook_cli::cli::{
    handle_backup_command, handle_config_command, handle_invoice_command, handle_item_command,
    handle_storage_command, BackupCommands, ConfigCommands, InvoiceCommands, ItemCommands,
    StorageCommands,
};
use billbook_cli::config::{BillbookPaths, Settings};
use billbook_cli::storage::Storage;
use billbook_cli::{BillbookResult, Outcome};

/// Environment variable holding the log filter, e.g. `BILLBOOK_LOG=debug`
const LOG_ENV: &str = "BILLBOOK_LOG";

#[derive(Parser)]
#[command(
    name = "billbook",
    version,
    about = "Product catalog and invoicing from the command line",
    long_about = "Billbook keeps a product catalog, finds items with fuzzy search and \
                  turns priced carts into numbered invoices. Every table file is backed \
                  up before it is overwritten."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directories and settings file
    Init,

    /// Show or change settings
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Catalog management commands
    #[command(subcommand)]
    Item(ItemCommands),

    /// Invoice commands
    #[command(subcommand)]
    Invoice(InvoiceCommands),

    /// Backup commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Storage layout commands
    #[command(subcommand)]
    Storage(StorageCommands),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(
    command: Option<Commands>,
    paths: &BillbookPaths,
    settings: &mut Settings,
    storage: &Storage,
) -> BillbookResult<()> {
    match command {
        Some(Commands::Init) => {
            println!("Initialized Billbook at: {}", paths.base_dir().display());
            println!("  Settings: {}", paths.settings_file().display());
            println!("  Data:     {}", paths.data_dir().display());
            println!("  Backups:  {}", paths.backup_dir().display());
            println!("  Storage:  {}", settings.storage_mode);
            println!();
            println!("Run 'billbook item add <sku> <name> --price <amount>' to add your first item.");
        }
        Some(Commands::Config(cmd)) => handle_config_command(paths, settings, cmd)?,
        Some(Commands::Item(cmd)) => handle_item_command(storage, settings, cmd)?,
        Some(Commands::Invoice(cmd)) => handle_invoice_command(storage, settings, cmd)?,
        Some(Commands::Backup(cmd)) => handle_backup_command(storage, cmd)?,
        Some(Commands::Storage(cmd)) => handle_storage_command(storage, cmd)?,
        None => {
            println!("Billbook - catalog and invoicing");
            println!();
            println!("Run 'billbook --help' for usage information.");
        }
    }
    Ok(())
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = BillbookPaths::new()?;
    let mut settings = Settings::load(&paths)?;

    // Initialize storage
    let storage = Storage::new(paths.clone(), &settings)?;

    let result = run(cli.command, &paths, &mut settings, &storage);
    let outcome = Outcome::from_result(&result, |_| String::new());
    if !outcome.success {
        debug!(message = %outcome.message, "command failed");
        eprintln!("Error: {}", outcome.message);
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
