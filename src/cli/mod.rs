//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod backup;
pub mod config;
pub mod invoice;
pub mod item;
pub mod storage;

pub use backup::{handle_backup_command, BackupCommands, TableName};
pub use config::{handle_config_command, ConfigCommands};
pub use invoice::{handle_invoice_command, InvoiceCommands};
pub use item::{handle_item_command, ItemCommands};
pub use storage::{handle_storage_command, StorageCommands};
