//! Display formatting for terminal output
//!
//! Renders items, search results, invoices and storage state as text tables.
//! Money is always shown with the configured currency symbol.

pub mod invoice;
pub mod item;
pub mod storage;

pub use invoice::{format_cart, format_invoice, format_invoice_list};
pub use item::{format_item_details, format_item_list, format_search_results};
pub use storage::{format_backup_list, format_size, format_table_status};
