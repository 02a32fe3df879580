//! Billbook - product catalog and invoicing core
//!
//! This library provides the core functionality for the `billbook` command:
//! a versioned record store for the catalog and invoices, a fuzzy search
//! engine over the catalog, and an exact decimal pricing engine.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and settings (load-merge-save)
//! - `error`: Custom error types
//! - `models`: Fixed-shape records (items, cart lines, invoices) and money
//! - `storage`: Columnar or JSON Lines tables with backup-before-overwrite
//! - `services`: Inventory, search, pricing, invoicing and CSV import
//! - `cli`: clap command definitions and handlers
//! - `display`: Text table rendering
//!
//! # Example
//!
//! ```rust,ignore
//! use billbook_cli::config::{BillbookPaths, Settings};
//! use billbook_cli::services::{InventoryService, SearchEngine};
//! use billbook_cli::storage::Storage;
//!
//! let paths = BillbookPaths::new()?;
//! let settings = Settings::load(&paths)?;
//! let storage = Storage::new(paths, &settings)?;
//! let hits = InventoryService::new(&storage).search(&SearchEngine::default(), "widget")?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{BillbookError, BillbookResult, Outcome};
