//! Item CLI commands
//!
//! Implements CLI commands for catalog management, search and CSV import.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Subcommand;
use rust_decimal::Decimal;

use crate::config::Settings;
use crate::display::{format_item_details, format_item_list, format_search_results};
use crate::error::{BillbookError, BillbookResult};
use crate::models::{ItemDraft, Money, Rate};
use crate::services::import::RowOutcome;
use crate::services::search::DEFAULT_LIMIT;
use crate::services::{ImportMode, ImportService, InventoryService, SearchEngine};
use crate::storage::Storage;

/// Item subcommands
#[derive(Subcommand)]
pub enum ItemCommands {
    /// Add a new item
    Add {
        /// Stock-keeping unit, unique in the catalog
        sku: String,
        /// Item name
        name: String,
        /// Manufacturer or supplier
        #[arg(short, long)]
        company: Option<String>,
        /// Size in millimetres
        #[arg(long)]
        size_mm: Option<String>,
        /// Size in inches
        #[arg(long)]
        size_inch: Option<String>,
        /// Base price (e.g., "12.50")
        #[arg(short, long, default_value = "0")]
        price: String,
        /// Tax rate in percent (defaults to the configured default)
        #[arg(long)]
        tax: Option<String>,
        /// Discount rate in percent (defaults to the configured default)
        #[arg(long)]
        discount: Option<String>,
    },

    /// Edit an item
    Edit {
        /// SKU or ID
        item: String,
        /// New SKU
        #[arg(long)]
        sku: Option<String>,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New company
        #[arg(short, long)]
        company: Option<String>,
        /// Clear the company
        #[arg(long, conflicts_with = "company")]
        clear_company: bool,
        /// New size in millimetres
        #[arg(long)]
        size_mm: Option<String>,
        /// New size in inches
        #[arg(long)]
        size_inch: Option<String>,
        /// New base price
        #[arg(short, long)]
        price: Option<String>,
        /// New tax rate in percent
        #[arg(long)]
        tax: Option<String>,
        /// New discount rate in percent
        #[arg(long)]
        discount: Option<String>,
    },

    /// Delete an item
    Delete {
        /// SKU or ID
        item: String,
    },

    /// List all items
    List,

    /// Show item details
    Show {
        /// SKU or ID
        item: String,
    },

    /// Search items by free text
    Search {
        /// Query (SKU, name, company, price or size)
        query: String,
        /// Maximum number of results
        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },

    /// Import items from a CSV file
    Import {
        /// Path to CSV file
        file: PathBuf,
        /// append (skip existing SKUs) or replace (discard existing items)
        #[arg(short, long, default_value = "append")]
        mode: String,
        /// Parse and report without saving
        #[arg(long)]
        dry_run: bool,
    },
}

fn parse_price(text: &str) -> BillbookResult<Money> {
    Money::parse(text).map_err(|e| BillbookError::Validation(format!("Invalid price: {}", e)))
}

fn parse_rate(field: &str, text: &str) -> BillbookResult<Rate> {
    Rate::parse(text).map_err(|e| BillbookError::Validation(format!("Invalid {}: {}", field, e)))
}

fn parse_size(field: &str, text: &str) -> BillbookResult<Decimal> {
    Decimal::from_str(text.trim())
        .map_err(|_| BillbookError::Validation(format!("Invalid {}: '{}'", field, text)))
}

/// Handle an item command
pub fn handle_item_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ItemCommands,
) -> BillbookResult<()> {
    let service = InventoryService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        ItemCommands::Add {
            sku,
            name,
            company,
            size_mm,
            size_inch,
            price,
            tax,
            discount,
        } => {
            let tax = match tax {
                Some(text) => parse_rate("tax rate", &text)?,
                None => settings.default_tax_rate,
            };
            let discount = match discount {
                Some(text) => parse_rate("discount rate", &text)?,
                None => settings.default_discount_rate,
            };

            let mut draft = ItemDraft::new(sku, name, parse_price(&price)?)
                .with_sizes(
                    size_mm.map(|s| parse_size("size_mm", &s)).transpose()?,
                    size_inch.map(|s| parse_size("size_inch", &s)).transpose()?,
                )
                .with_rates(tax, discount);
            draft.company = company;

            let item = service.add(draft)?;
            println!("Added item: {}", item.display_text());
            println!("  ID: {}", item.item_id.short());
        }

        ItemCommands::Edit {
            item,
            sku,
            name,
            company,
            clear_company,
            size_mm,
            size_inch,
            price,
            tax,
            discount,
        } => {
            let existing = service.require(&item)?;
            let mut draft = existing.draft();

            if let Some(sku) = sku {
                draft.sku = sku;
            }
            if let Some(name) = name {
                draft.name = name;
            }
            if clear_company {
                draft.company = None;
            } else if company.is_some() {
                draft.company = company;
            }
            if let Some(size) = size_mm {
                draft.size_mm = Some(parse_size("size_mm", &size)?);
            }
            if let Some(size) = size_inch {
                draft.size_inch = Some(parse_size("size_inch", &size)?);
            }
            if let Some(price) = price {
                draft.base_price = parse_price(&price)?;
            }
            if let Some(tax) = tax {
                draft.tax_rate = parse_rate("tax rate", &tax)?;
            }
            if let Some(discount) = discount {
                draft.discount_rate = parse_rate("discount rate", &discount)?;
            }

            let updated = service.update(&existing.item_id.to_string(), draft)?;
            println!("Updated item: {}", updated.display_text());
        }

        ItemCommands::Delete { item } => {
            let removed = service.delete(&item)?;
            println!("Deleted item: {}", removed.display_text());
        }

        ItemCommands::List => {
            let items = service.list()?;
            print!("{}", format_item_list(&items, symbol));
        }

        ItemCommands::Show { item } => {
            let item = service.require(&item)?;
            print!("{}", format_item_details(&item, symbol));
        }

        ItemCommands::Search { query, limit } => {
            if limit == 0 {
                return Err(BillbookError::Validation(
                    "Limit must be at least 1".into(),
                ));
            }
            let hits = service.search(&SearchEngine::new(limit), &query)?;
            print!("{}", format_search_results(&query, &hits, symbol));
        }

        ItemCommands::Import {
            file,
            mode,
            dry_run,
        } => {
            let mode = ImportMode::from_str(&mode)?;
            let importer = ImportService::new(storage, settings);

            if dry_run {
                let input = std::fs::File::open(&file).map_err(|e| {
                    BillbookError::Import(format!("Failed to open {}: {}", file.display(), e))
                })?;
                let rows = importer.parse(input)?;
                let valid = rows.iter().filter(|(_, r)| r.is_ok()).count();
                for (line, result) in &rows {
                    if let Err(reason) = result {
                        println!("  line {}: {}", line, reason);
                    }
                }
                println!(
                    "Dry run: {} row(s) parsed, {} would be rejected. Nothing was saved.",
                    valid,
                    rows.len() - valid
                );
                return Ok(());
            }

            let report = importer.import_file(&file, mode)?;
            for row in &report.rows {
                match &row.outcome {
                    RowOutcome::Imported { .. } => {}
                    RowOutcome::Skipped { sku, reason } => {
                        println!("  line {}: skipped {} ({})", row.line, sku, reason);
                    }
                    RowOutcome::Rejected { reason } => {
                        println!("  line {}: rejected ({})", row.line, reason);
                    }
                }
            }
            println!(
                "Import ({}): {} imported, {} skipped, {} rejected",
                report.mode,
                report.imported(),
                report.skipped(),
                report.rejected()
            );
        }
    }

    Ok(())
}
