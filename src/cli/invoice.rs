//! Invoice CLI commands
//!
//! Implements CLI commands for creating and reviewing invoices.

use chrono::NaiveDate;
use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_cart, format_invoice, format_invoice_list};
use crate::error::{BillbookError, BillbookResult};
use crate::models::{Customer, Rate};
use crate::services::{InvoiceDraft, InvoiceService, LineRequest, PricingEngine};
use crate::storage::Storage;

/// Invoice subcommands
#[derive(Subcommand)]
pub enum InvoiceCommands {
    /// Price a cart and save it as a new invoice
    Create {
        /// Customer name
        #[arg(short, long)]
        customer: String,
        /// Customer address
        #[arg(long, default_value = "")]
        address: String,
        /// Customer email
        #[arg(long, default_value = "")]
        email: String,
        /// Line as <sku-or-id>:<qty>[:<discount%>] (repeatable)
        #[arg(short, long = "line", required = true)]
        lines: Vec<LineRequest>,
        /// Global discount in percent
        #[arg(short, long, default_value = "0")]
        discount: String,
        /// Global tax in percent (defaults to the configured default)
        #[arg(short, long)]
        tax: Option<String>,
        /// Invoice date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Free-form notes
        #[arg(short, long, default_value = "")]
        notes: String,
        /// Show the priced cart without saving or using an invoice number
        #[arg(long)]
        dry_run: bool,
    },

    /// List saved invoices
    List,

    /// Show a saved invoice
    Show {
        /// Invoice number or ID
        invoice: String,
    },
}

fn parse_rate(field: &str, text: &str) -> BillbookResult<Rate> {
    Rate::parse(text).map_err(|e| BillbookError::Validation(format!("Invalid {}: {}", field, e)))
}

/// Handle an invoice command
pub fn handle_invoice_command(
    storage: &Storage,
    settings: &mut Settings,
    cmd: InvoiceCommands,
) -> BillbookResult<()> {
    let service = InvoiceService::new(storage);

    match cmd {
        InvoiceCommands::Create {
            customer,
            address,
            email,
            lines,
            discount,
            tax,
            date,
            notes,
            dry_run,
        } => {
            let global_discount = parse_rate("discount", &discount)?;
            let global_tax = tax.map(|t| parse_rate("tax", &t)).transpose()?;
            let date = date
                .map(|d| {
                    NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").map_err(|_| {
                        BillbookError::Validation(format!(
                            "Invalid date '{}' (expected YYYY-MM-DD)",
                            d
                        ))
                    })
                })
                .transpose()?;

            let pricing = PricingEngine::new(settings);
            let cart = service.price_cart(&pricing, &lines)?;

            if dry_run {
                let totals = pricing.totals(&cart, global_discount, global_tax)?;
                let tax_shown = global_tax.unwrap_or(pricing.default_global_tax());
                print!(
                    "{}",
                    format_cart(
                        &cart,
                        &totals,
                        &global_discount.to_string(),
                        &tax_shown.to_string(),
                        &settings.currency_symbol,
                    )
                );
                println!("\nDry run: nothing was saved.");
                return Ok(());
            }

            let draft = InvoiceDraft {
                customer: Customer {
                    name: customer,
                    address,
                    email,
                },
                date,
                notes,
                global_discount,
                global_tax,
                cart,
            };
            let invoice = service.create(settings, draft)?;

            println!("Saved invoice {}", invoice.invoice_number);
            println!("  Customer:    {}", invoice.customer_name);
            println!(
                "  Grand total: {}",
                invoice.grand_total.format_with_symbol(&settings.currency_symbol)
            );
        }

        InvoiceCommands::List => {
            let invoices = service.list()?;
            print!(
                "{}",
                format_invoice_list(&invoices, &settings.currency_symbol)
            );
        }

        InvoiceCommands::Show { invoice } => {
            let invoice = service.require(&invoice)?;
            print!("{}", format_invoice(&invoice, settings));
        }
    }

    Ok(())
}
