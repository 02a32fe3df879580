//! Invoice model
//!
//! Invoices are append-only history. Their lines are serialized snapshots,
//! not references into the inventory, and their totals are fixed when the
//! invoice is saved.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::cart::CartLine;
use super::ids::InvoiceId;
use super::money::{Money, Rate};

/// Aggregate figures of an invoice, each rounded to cents independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub total_discount: Money,
    pub total_tax: Money,
    pub grand_total: Money,
}

/// Who the invoice is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Customer {
    pub name: String,
    pub address: String,
    pub email: String,
}

impl Customer {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A saved invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_id: InvoiceId,
    pub invoice_number: String,
    pub date: NaiveDate,
    pub customer_name: String,
    #[serde(default)]
    pub customer_address: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub notes: String,
    pub global_discount_rate: Rate,
    pub global_tax_rate: Rate,
    pub line_items: Vec<CartLine>,
    pub subtotal: Money,
    pub total_discount: Money,
    pub total_tax: Money,
    pub grand_total: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals {
            subtotal: self.subtotal,
            total_discount: self.total_discount,
            total_tax: self.total_tax,
            grand_total: self.grand_total,
        }
    }

    pub fn customer(&self) -> Customer {
        Customer {
            name: self.customer_name.clone(),
            address: self.customer_address.clone(),
            email: self.customer_email.clone(),
        }
    }

    /// Validate the invoice
    pub fn validate(&self) -> Result<(), InvoiceValidationError> {
        if self.invoice_number.trim().is_empty() {
            return Err(InvoiceValidationError::MissingNumber);
        }
        if self.customer_name.trim().is_empty() {
            return Err(InvoiceValidationError::MissingCustomer);
        }
        if self.line_items.is_empty() {
            return Err(InvoiceValidationError::NoLines);
        }
        Ok(())
    }
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.invoice_number, self.date, self.customer_name, self.grand_total
        )
    }
}

/// Validation errors for invoices
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceValidationError {
    MissingNumber,
    MissingCustomer,
    NoLines,
}

impl fmt::Display for InvoiceValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingNumber => write!(f, "Invoice number is required"),
            Self::MissingCustomer => write!(f, "Customer name is required"),
            Self::NoLines => write!(f, "An invoice needs at least one line"),
        }
    }
}

impl std::error::Error for InvoiceValidationError {}
