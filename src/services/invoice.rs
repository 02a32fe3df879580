//! Invoice service
//!
//! Turns a cart into a saved invoice. The invoice number comes from the
//! settings counter, which is advanced and persisted before the invoice table
//! is written, so a number is never handed out twice even if the save fails.

use std::str::FromStr;

use chrono::{Local, NaiveDate, Utc};
use tracing::info;

use super::inventory::InventoryService;
use super::pricing::PricingEngine;
use crate::config::Settings;
use crate::error::{BillbookError, BillbookResult};
use crate::models::{Cart, Customer, Invoice, InvoiceId, Rate};
use crate::storage::Storage;

/// One requested line: an item reference, a quantity and an optional discount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRequest {
    pub identifier: String,
    pub quantity: u32,
    pub discount: Option<Rate>,
}

impl FromStr for LineRequest {
    type Err = BillbookError;

    /// Parse `<sku-or-id>:<qty>[:<discount%>]`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| {
            BillbookError::Validation(format!(
                "Invalid line '{}': {} (expected <sku-or-id>:<qty>[:<discount%>])",
                s, reason
            ))
        };

        let mut parts = s.split(':');
        let identifier = parts
            .next()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| invalid("missing item"))?;
        let quantity: u32 = parts
            .next()
            .ok_or_else(|| invalid("missing quantity"))?
            .trim()
            .parse()
            .map_err(|_| invalid("quantity must be a positive whole number"))?;
        if quantity == 0 {
            return Err(invalid("quantity must be at least 1"));
        }
        let discount = parts
            .next()
            .map(|d| Rate::parse(d).map_err(|e| invalid(&e.to_string())))
            .transpose()?;
        if parts.next().is_some() {
            return Err(invalid("too many fields"));
        }

        Ok(Self {
            identifier: identifier.to_string(),
            quantity,
            discount,
        })
    }
}

/// Everything needed to save an invoice except its number
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub customer: Customer,
    /// Defaults to today
    pub date: Option<NaiveDate>,
    pub notes: String,
    pub global_discount: Rate,
    /// Defaults to the configured default tax rate
    pub global_tax: Option<Rate>,
    pub cart: Cart,
}

/// Service for invoice management
pub struct InvoiceService<'a> {
    storage: &'a Storage,
}

impl<'a> InvoiceService<'a> {
    /// Create a new invoice service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Resolve and price requested lines into a cart
    pub fn price_cart(&self, pricing: &PricingEngine, requests: &[LineRequest]) -> BillbookResult<Cart> {
        let inventory = InventoryService::new(self.storage);
        let mut cart = Cart::new();
        for request in requests {
            let item = inventory.require(&request.identifier)?;
            cart.add(pricing.price_line(&item, request.quantity, request.discount)?);
        }
        Ok(cart)
    }

    /// Number, total and save an invoice
    ///
    /// The settings counter is advanced and written before the invoice table.
    pub fn create(&self, settings: &mut Settings, draft: InvoiceDraft) -> BillbookResult<Invoice> {
        let customer_name = draft.customer.name.trim().to_string();
        if customer_name.is_empty() {
            return Err(BillbookError::Validation("Customer name is required".into()));
        }
        if draft.cart.is_empty() {
            return Err(BillbookError::Validation(
                "Cannot create an invoice from an empty cart".into(),
            ));
        }

        let mut invoices = self.storage.invoices.load()?;

        // Skip numbers already on file, e.g. after the counter was set back by hand
        let mut invoice_number = settings.next_invoice_number();
        while invoices
            .iter()
            .any(|inv| inv.invoice_number == invoice_number)
        {
            settings.advance_invoice_counter()?;
            invoice_number = settings.next_invoice_number();
        }

        let pricing = PricingEngine::new(settings);
        let totals = pricing.totals(&draft.cart, draft.global_discount, draft.global_tax)?;
        let global_tax = draft.global_tax.unwrap_or(pricing.default_global_tax());

        settings.advance_invoice_counter()?;
        settings.save(self.storage.paths())?;

        let now = Utc::now();
        let invoice = Invoice {
            invoice_id: InvoiceId::new(),
            invoice_number,
            date: draft.date.unwrap_or_else(|| Local::now().date_naive()),
            customer_name,
            customer_address: draft.customer.address.trim().to_string(),
            customer_email: draft.customer.email.trim().to_string(),
            notes: draft.notes,
            global_discount_rate: draft.global_discount,
            global_tax_rate: global_tax,
            line_items: draft.cart.into_lines(),
            subtotal: totals.subtotal,
            total_discount: totals.total_discount,
            total_tax: totals.total_tax,
            grand_total: totals.grand_total,
            created_at: now,
            updated_at: now,
        };

        invoices.push(invoice.clone());
        self.storage.invoices.save(&mut invoices)?;

        info!(
            number = %invoice.invoice_number,
            lines = invoice.line_items.len(),
            grand_total = %invoice.grand_total,
            "Invoice saved"
        );
        Ok(invoice)
    }

    /// All invoices in the order they were saved
    pub fn list(&self) -> BillbookResult<Vec<Invoice>> {
        self.storage.invoices.load()
    }

    /// Find an invoice by number (case-insensitive) or id prefix
    pub fn find(&self, identifier: &str) -> BillbookResult<Option<Invoice>> {
        let invoices = self.storage.invoices.load()?;
        let wanted = identifier.trim();

        if let Some(invoice) = invoices
            .iter()
            .find(|inv| inv.invoice_number.eq_ignore_ascii_case(wanted))
        {
            return Ok(Some(invoice.clone()));
        }

        let mut matches = invoices
            .into_iter()
            .filter(|inv| inv.invoice_id.matches(wanted));
        match (matches.next(), matches.next()) {
            (None, _) => Ok(None),
            (Some(invoice), None) => Ok(Some(invoice)),
            (Some(_), Some(_)) => Err(BillbookError::Validation(format!(
                "'{}' matches more than one invoice; use more of the id",
                identifier
            ))),
        }
    }

    /// Like `find`, but a missing invoice is an error
    pub fn require(&self, identifier: &str) -> BillbookResult<Invoice> {
        self.find(identifier)?
            .ok_or_else(|| BillbookError::invoice_not_found(identifier))
    }
}
