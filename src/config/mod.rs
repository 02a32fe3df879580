//! Configuration module for Billbook
//!
//! This module provides configuration management including:
//! - Base directory and table path resolution
//! - Settings persistence with load-merge-save semantics

pub mod paths;
pub mod settings;

pub use paths::BillbookPaths;
pub use settings::{BusinessInfo, RoundingMode, Settings, StorageMode};
