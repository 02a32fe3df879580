//! Config CLI commands
//!
//! Shows and edits the settings file.

use clap::Subcommand;

use crate::config::{BillbookPaths, Settings};
use crate::error::BillbookResult;

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current settings and paths
    Show,

    /// Set one setting (e.g. default_tax_rate 18, business_info.name "Acme")
    Set {
        /// Setting key
        key: String,
        /// New value
        value: String,
    },
}

/// Handle a config command
pub fn handle_config_command(
    paths: &BillbookPaths,
    settings: &mut Settings,
    cmd: ConfigCommands,
) -> BillbookResult<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("Billbook Configuration");
            println!("======================");
            println!();
            println!("Paths:");
            println!("  Base directory: {}", paths.base_dir().display());
            println!("  Settings file:  {}", paths.settings_file().display());
            println!("  Data directory: {}", paths.data_dir().display());
            println!("  Backups:        {}", paths.backup_dir().display());
            println!();
            println!("Settings:");
            println!("{}", serde_json::to_string_pretty(settings)?);
        }

        ConfigCommands::Set { key, value } => {
            settings.set_value(&key, &value)?;
            settings.save(paths)?;
            println!("Set {} = {}", key, value);
        }
    }

    Ok(())
}
