//! Invoice table binding
//!
//! Stores `Invoice` rows as `data/invoices.<ext>`. In the columnar layout the
//! line snapshots of each invoice are kept as one JSON document per row.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::format::{ensure_len, parse_decimal};
use super::table::{RecordStore, Table};
use crate::error::{BillbookError, BillbookResult};
use crate::models::{CartLine, Invoice, InvoiceId, Money, Rate};

/// Store for the invoice table
pub type InvoiceStore = RecordStore<Invoice>;

/// Columnar layout of the invoice table
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InvoiceColumns {
    invoice_id: Vec<InvoiceId>,
    invoice_number: Vec<String>,
    date: Vec<NaiveDate>,
    customer_name: Vec<String>,
    customer_address: Vec<String>,
    customer_email: Vec<String>,
    notes: Vec<String>,
    global_discount_rate: Vec<String>,
    global_tax_rate: Vec<String>,
    line_items: Vec<String>,
    subtotal: Vec<String>,
    total_discount: Vec<String>,
    total_tax: Vec<String>,
    grand_total: Vec<String>,
    created_at: Vec<DateTime<Utc>>,
    updated_at: Vec<DateTime<Utc>>,
}

impl Table for Invoice {
    const NAME: &'static str = "invoices";

    const COLUMNS: &'static [&'static str] = &[
        "invoice_id",
        "invoice_number",
        "date",
        "customer_name",
        "customer_address",
        "customer_email",
        "notes",
        "global_discount_rate",
        "global_tax_rate",
        "line_items",
        "subtotal",
        "total_discount",
        "total_tax",
        "grand_total",
        "created_at",
        "updated_at",
    ];

    type Columns = InvoiceColumns;

    fn to_columns(rows: &[Self]) -> BillbookResult<InvoiceColumns> {
        let mut columns = InvoiceColumns::default();
        for invoice in rows {
            columns.invoice_id.push(invoice.invoice_id);
            columns.invoice_number.push(invoice.invoice_number.clone());
            columns.date.push(invoice.date);
            columns.customer_name.push(invoice.customer_name.clone());
            columns.customer_address.push(invoice.customer_address.clone());
            columns.customer_email.push(invoice.customer_email.clone());
            columns.notes.push(invoice.notes.clone());
            columns
                .global_discount_rate
                .push(invoice.global_discount_rate.percent().to_string());
            columns
                .global_tax_rate
                .push(invoice.global_tax_rate.percent().to_string());
            columns
                .line_items
                .push(serde_json::to_string(&invoice.line_items)?);
            columns.subtotal.push(invoice.subtotal.raw_text());
            columns.total_discount.push(invoice.total_discount.raw_text());
            columns.total_tax.push(invoice.total_tax.raw_text());
            columns.grand_total.push(invoice.grand_total.raw_text());
            columns.created_at.push(invoice.created_at);
            columns.updated_at.push(invoice.updated_at);
        }
        Ok(columns)
    }

    fn from_columns(columns: InvoiceColumns, row_count: usize) -> Result<Vec<Self>, String> {
        ensure_len("invoice_id", &columns.invoice_id, row_count)?;
        ensure_len("invoice_number", &columns.invoice_number, row_count)?;
        ensure_len("date", &columns.date, row_count)?;
        ensure_len("customer_name", &columns.customer_name, row_count)?;
        ensure_len("customer_address", &columns.customer_address, row_count)?;
        ensure_len("customer_email", &columns.customer_email, row_count)?;
        ensure_len("notes", &columns.notes, row_count)?;
        ensure_len("global_discount_rate", &columns.global_discount_rate, row_count)?;
        ensure_len("global_tax_rate", &columns.global_tax_rate, row_count)?;
        ensure_len("line_items", &columns.line_items, row_count)?;
        ensure_len("subtotal", &columns.subtotal, row_count)?;
        ensure_len("total_discount", &columns.total_discount, row_count)?;
        ensure_len("total_tax", &columns.total_tax, row_count)?;
        ensure_len("grand_total", &columns.grand_total, row_count)?;
        ensure_len("created_at", &columns.created_at, row_count)?;
        ensure_len("updated_at", &columns.updated_at, row_count)?;

        let rate = |column: &str, row: usize, text: &str| {
            Rate::new(parse_decimal(column, row, text)?)
                .map_err(|e| format!("column '{}' row {}: {}", column, row, e))
        };
        let money = |column: &str, row: usize, text: &str| {
            parse_decimal(column, row, text).map(Money::new)
        };

        let mut invoices = Vec::with_capacity(row_count);
        for row in 0..row_count {
            let line_items: Vec<CartLine> = serde_json::from_str(&columns.line_items[row])
                .map_err(|e| format!("column 'line_items' row {}: {}", row, e))?;

            invoices.push(Invoice {
                invoice_id: columns.invoice_id[row],
                invoice_number: columns.invoice_number[row].clone(),
                date: columns.date[row],
                customer_name: columns.customer_name[row].clone(),
                customer_address: columns.customer_address[row].clone(),
                customer_email: columns.customer_email[row].clone(),
                notes: columns.notes[row].clone(),
                global_discount_rate: rate(
                    "global_discount_rate",
                    row,
                    &columns.global_discount_rate[row],
                )?,
                global_tax_rate: rate("global_tax_rate", row, &columns.global_tax_rate[row])?,
                line_items,
                subtotal: money("subtotal", row, &columns.subtotal[row])?,
                total_discount: money("total_discount", row, &columns.total_discount[row])?,
                total_tax: money("total_tax", row, &columns.total_tax[row])?,
                grand_total: money("grand_total", row, &columns.grand_total[row])?,
                created_at: columns.created_at[row],
                updated_at: columns.updated_at[row],
            });
        }
        Ok(invoices)
    }

    fn validate_row(&self) -> BillbookResult<()> {
        self.validate().map_err(|e| {
            BillbookError::Validation(format!("Invoice {}: {}", self.invoice_number, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BillbookPaths, StorageMode};
    use crate::models::cart::LineSnapshot;
    use crate::models::ItemId;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn sample_invoice(number: &str) -> Invoice {
        let line = CartLine::priced(
            LineSnapshot {
                item_id: ItemId::new(),
                sku: "A100".into(),
                name: "Red Widget".into(),
                company: Some("Acme".into()),
                quantity: 3,
                unit_price: Money::new(dec!(100.00)),
                discount_rate: Rate::new(dec!(10)).unwrap(),
                tax_rate: Rate::new(dec!(18)).unwrap(),
            },
            Money::new(dec!(270.00)),
        );
        let now = Utc::now();
        Invoice {
            invoice_id: InvoiceId::new(),
            invoice_number: number.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            customer_name: "Jane Doe".into(),
            customer_address: "1 Main St".into(),
            customer_email: String::new(),
            notes: "Net 30".into(),
            global_discount_rate: Rate::zero(),
            global_tax_rate: Rate::new(dec!(18)).unwrap(),
            line_items: vec![line],
            subtotal: Money::new(dec!(270.00)),
            total_discount: Money::new(dec!(0.00)),
            total_tax: Money::new(dec!(48.60)),
            grand_total: Money::new(dec!(318.60)),
            created_at: now,
            updated_at: now,
        }
    }

    fn assert_round_trip(mode: StorageMode) {
        let temp_dir = TempDir::new().unwrap();
        let paths = BillbookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = InvoiceStore::new(paths, mode);

        let mut invoices = vec![sample_invoice("INV-0001"), sample_invoice("INV-0002")];
        store.save(&mut invoices).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, invoices);
        assert_eq!(loaded[0].line_items[0].line_total(), Money::new(dec!(270.00)));
        assert_eq!(loaded[1].grand_total.to_string(), "318.60");
    }

    #[test]
    fn test_round_trip_json() {
        assert_round_trip(StorageMode::Json);
    }

    #[test]
    fn test_round_trip_columnar() {
        assert_round_trip(StorageMode::Parquet);
    }

    #[test]
    fn test_invoice_without_customer_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BillbookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = InvoiceStore::new(paths, StorageMode::Json);

        let mut invoice = sample_invoice("INV-0001");
        invoice.customer_name = String::new();
        let err = store.save(&mut [invoice]).unwrap_err();
        assert!(err.is_validation());
        assert!(!store.path().exists());
    }
}
