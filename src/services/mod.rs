//! Service layer for Billbook
//!
//! The service layer provides business logic on top of the storage layer:
//! catalog maintenance, search, pricing, invoicing and CSV import.

pub mod fuzzy;
pub mod import;
pub mod inventory;
pub mod invoice;
pub mod pricing;
pub mod search;

pub use import::{ImportMode, ImportReport, ImportService, RowOutcome};
pub use inventory::InventoryService;
pub use invoice::{InvoiceDraft, InvoiceService, LineRequest};
pub use pricing::PricingEngine;
pub use search::{SearchEngine, SearchHit};
