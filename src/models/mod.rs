//! Core data models for Billbook
//!
//! Fixed-shape record types for the catalog (`InventoryItem`), the cart
//! (`CartLine`, `Cart`) and saved invoices (`Invoice`), plus the decimal
//! `Money` and `Rate` types they are priced in.

pub mod cart;
pub mod ids;
pub mod invoice;
pub mod item;
pub mod money;

pub use cart::{Cart, CartLine};
pub use ids::{InvoiceId, ItemId};
pub use invoice::{Customer, Invoice, InvoiceTotals, InvoiceValidationError};
pub use item::{InventoryItem, ItemDraft, ItemValidationError};
pub use money::{number_text, round_half_up, Money, MoneyParseError, Rate, RateError};
