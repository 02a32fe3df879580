//! Inventory table binding
//!
//! Stores `InventoryItem` rows as `data/inventory.<ext>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::{ensure_len, parse_decimal, parse_optional_decimal};
use super::table::{RecordStore, Table};
use crate::error::{BillbookError, BillbookResult};
use crate::models::{InventoryItem, ItemDraft, ItemId, Money, Rate};

/// Store for the inventory table
pub type InventoryStore = RecordStore<InventoryItem>;

/// Columnar layout of the inventory table
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InventoryColumns {
    item_id: Vec<ItemId>,
    sku: Vec<String>,
    name: Vec<String>,
    company: Vec<Option<String>>,
    size_mm: Vec<Option<String>>,
    size_inch: Vec<Option<String>>,
    base_price: Vec<String>,
    tax_rate: Vec<String>,
    discount_rate: Vec<String>,
    search_blob: Vec<String>,
    display_text: Vec<String>,
    created_at: Vec<DateTime<Utc>>,
    updated_at: Vec<DateTime<Utc>>,
}

impl Table for InventoryItem {
    const NAME: &'static str = "inventory";

    const COLUMNS: &'static [&'static str] = &[
        "item_id",
        "sku",
        "name",
        "company",
        "size_mm",
        "size_inch",
        "base_price",
        "tax_rate",
        "discount_rate",
        "search_blob",
        "display_text",
        "created_at",
        "updated_at",
    ];

    type Columns = InventoryColumns;

    fn to_columns(rows: &[Self]) -> BillbookResult<InventoryColumns> {
        let mut columns = InventoryColumns::default();
        for item in rows {
            columns.item_id.push(item.item_id);
            columns.sku.push(item.sku.clone());
            columns.name.push(item.name.clone());
            columns.company.push(item.company.clone());
            columns.size_mm.push(item.size_mm.map(|s| s.to_string()));
            columns.size_inch.push(item.size_inch.map(|s| s.to_string()));
            columns.base_price.push(item.base_price.raw_text());
            columns.tax_rate.push(item.tax_rate.percent().to_string());
            columns
                .discount_rate
                .push(item.discount_rate.percent().to_string());
            columns.search_blob.push(item.search_blob().to_string());
            columns.display_text.push(item.display_text().to_string());
            columns.created_at.push(item.created_at);
            columns.updated_at.push(item.updated_at);
        }
        Ok(columns)
    }

    fn from_columns(columns: InventoryColumns, row_count: usize) -> Result<Vec<Self>, String> {
        ensure_len("item_id", &columns.item_id, row_count)?;
        ensure_len("sku", &columns.sku, row_count)?;
        ensure_len("name", &columns.name, row_count)?;
        ensure_len("company", &columns.company, row_count)?;
        ensure_len("size_mm", &columns.size_mm, row_count)?;
        ensure_len("size_inch", &columns.size_inch, row_count)?;
        ensure_len("base_price", &columns.base_price, row_count)?;
        ensure_len("tax_rate", &columns.tax_rate, row_count)?;
        ensure_len("discount_rate", &columns.discount_rate, row_count)?;
        ensure_len("search_blob", &columns.search_blob, row_count)?;
        ensure_len("display_text", &columns.display_text, row_count)?;
        ensure_len("created_at", &columns.created_at, row_count)?;
        ensure_len("updated_at", &columns.updated_at, row_count)?;

        let rate = |column: &str, row: usize, text: &str| {
            Rate::new(parse_decimal(column, row, text)?)
                .map_err(|e| format!("column '{}' row {}: {}", column, row, e))
        };

        let mut items = Vec::with_capacity(row_count);
        for row in 0..row_count {
            let draft = ItemDraft {
                sku: columns.sku[row].clone(),
                name: columns.name[row].clone(),
                company: columns.company[row].clone(),
                size_mm: parse_optional_decimal("size_mm", row, columns.size_mm[row].as_deref())?,
                size_inch: parse_optional_decimal(
                    "size_inch",
                    row,
                    columns.size_inch[row].as_deref(),
                )?,
                base_price: Money::new(parse_decimal("base_price", row, &columns.base_price[row])?),
                tax_rate: rate("tax_rate", row, &columns.tax_rate[row])?,
                discount_rate: rate("discount_rate", row, &columns.discount_rate[row])?,
            };
            items.push(InventoryItem::from_parts(
                columns.item_id[row],
                draft,
                columns.created_at[row],
                columns.updated_at[row],
            ));
        }
        Ok(items)
    }

    fn refresh(&mut self) {
        self.refresh_derived();
    }

    fn validate_row(&self) -> BillbookResult<()> {
        self.validate().map_err(|e| {
            BillbookError::Validation(format!("Item {}: {}", self.sku, e))
        })
    }
}
