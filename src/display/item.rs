//! Inventory display formatting
//!
//! Formats items and search results for terminal output in table and detail
//! views.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::InventoryItem;
use crate::services::SearchHit;

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Size (mm)")]
    size_mm: String,
    #[tabled(rename = "Size (in)")]
    size_inch: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Tax %")]
    tax: String,
    #[tabled(rename = "Disc %")]
    discount: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl ItemRow {
    fn new(item: &InventoryItem, symbol: &str) -> Self {
        Self {
            sku: item.sku.clone(),
            name: item.name.clone(),
            company: item.company_text().to_string(),
            size_mm: optional(item.size_mm),
            size_inch: optional(item.size_inch),
            price: item.base_price.format_with_symbol(symbol),
            tax: item.tax_rate.to_string(),
            discount: item.discount_rate.to_string(),
            id: item.item_id.short(),
        }
    }
}

#[derive(Tabled)]
struct HitRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "Item")]
    display: String,
    #[tabled(rename = "Price")]
    price: String,
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Format a list of items as a table
pub fn format_item_list(items: &[InventoryItem], symbol: &str) -> String {
    if items.is_empty() {
        return "No items found.\n".to_string();
    }

    let rows: Vec<ItemRow> = items.iter().map(|item| ItemRow::new(item, symbol)).collect();
    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .modify(Columns::new(3..8), Alignment::right());

    format!("{}\n{} item(s)\n", table, items.len())
}

/// Format search results, best first
///
/// Store-order fill results (nothing scored above the threshold) show no
/// score.
pub fn format_search_results(query: &str, hits: &[SearchHit], symbol: &str) -> String {
    if hits.is_empty() {
        return "No items found.\n".to_string();
    }

    let rows: Vec<HitRow> = hits
        .iter()
        .enumerate()
        .map(|(index, hit)| HitRow {
            rank: index + 1,
            score: hit
                .score
                .map(|s| format!("{:.1}", s.total()))
                .unwrap_or_else(|| "-".to_string()),
            sku: hit.item.sku.clone(),
            display: hit.item.display_text().to_string(),
            price: hit.item.base_price.format_with_symbol(symbol),
        })
        .collect();

    let mut output = String::new();
    if !hits.iter().any(SearchHit::is_ranked) && !query.trim().is_empty() {
        output.push_str(&format!("No close matches for '{}'; showing first items.\n", query.trim()));
    }

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .modify(Columns::new(1..2), Alignment::right())
        .modify(Columns::new(4..5), Alignment::right());
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

/// Format a single item's details
pub fn format_item_details(item: &InventoryItem, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Item: {}\n", item.display_text()));
    output.push_str(&format!("  ID:            {}\n", item.item_id));
    output.push_str(&format!("  SKU:           {}\n", item.sku));
    output.push_str(&format!("  Name:          {}\n", item.name));
    if let Some(company) = &item.company {
        output.push_str(&format!("  Company:       {}\n", company));
    }
    if let Some(size) = item.size_mm {
        output.push_str(&format!("  Size (mm):     {}\n", size));
    }
    if let Some(size) = item.size_inch {
        output.push_str(&format!("  Size (in):     {}\n", size));
    }
    output.push_str(&format!(
        "  Base price:    {}\n",
        item.base_price.format_with_symbol(symbol)
    ));
    output.push_str(&format!("  Tax rate:      {}%\n", item.tax_rate));
    output.push_str(&format!("  Discount rate: {}%\n", item.discount_rate));
    output.push_str(&format!(
        "  Created:       {}\n",
        item.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!(
        "  Updated:       {}\n",
        item.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}
