//! Invoice display formatting

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::config::Settings;
use crate::models::{Cart, CartLine, Invoice, InvoiceTotals};

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Lines")]
    lines: usize,
    #[tabled(rename = "Total")]
    total: String,
}

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "Description")]
    name: String,
    #[tabled(rename = "Qty")]
    quantity: u32,
    #[tabled(rename = "Unit")]
    unit_price: String,
    #[tabled(rename = "Disc %")]
    discount: String,
    #[tabled(rename = "Amount")]
    line_total: String,
}

/// Format saved invoices as a table, in the order they were saved
pub fn format_invoice_list(invoices: &[Invoice], symbol: &str) -> String {
    if invoices.is_empty() {
        return "No invoices found.\n".to_string();
    }

    let rows: Vec<InvoiceRow> = invoices
        .iter()
        .map(|invoice| InvoiceRow {
            number: invoice.invoice_number.clone(),
            date: invoice.date.format("%Y-%m-%d").to_string(),
            customer: invoice.customer_name.clone(),
            lines: invoice.line_items.len(),
            total: invoice.grand_total.format_with_symbol(symbol),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .modify(Columns::new(3..), Alignment::right());
    format!("{}\n", table)
}

/// Format cart lines with their totals
pub fn format_lines(lines: &[CartLine], symbol: &str) -> String {
    let rows: Vec<LineRow> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| LineRow {
            position: index + 1,
            sku: line.sku().to_string(),
            name: line.name().to_string(),
            quantity: line.quantity(),
            unit_price: line.unit_price().format_with_symbol(symbol),
            discount: line.discount_rate().to_string(),
            line_total: line.line_total().format_with_symbol(symbol),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .modify(Columns::new(3..), Alignment::right());
    format!("{}\n", table)
}

fn format_totals(totals: &InvoiceTotals, discount: &str, tax: &str, symbol: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:>24}  {:>14}\n",
        "Subtotal:",
        totals.subtotal.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "{:>24}  {:>14}\n",
        format!("Discount ({}%):", discount),
        totals.total_discount.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "{:>24}  {:>14}\n",
        format!("Tax ({}%):", tax),
        totals.total_tax.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "{:>24}  {:>14}\n",
        "Grand total:",
        totals.grand_total.format_with_symbol(symbol)
    ));
    output
}

/// Preview of an unsaved cart
pub fn format_cart(cart: &Cart, totals: &InvoiceTotals, discount: &str, tax: &str, symbol: &str) -> String {
    let mut output = format_lines(cart.lines(), symbol);
    output.push('\n');
    output.push_str(&format_totals(totals, discount, tax, symbol));
    output
}

/// Full invoice view, headed with the business details
pub fn format_invoice(invoice: &Invoice, settings: &Settings) -> String {
    let symbol = settings.currency_symbol.as_str();
    let business = &settings.business_info;

    let mut output = String::new();
    output.push_str(&format!("{}\n", business.name));
    for line in business.address.lines() {
        output.push_str(&format!("{}\n", line));
    }
    output.push_str(&format!("{}  {}\n", business.phone, business.email));
    output.push('\n');

    output.push_str(&format!("Invoice {}\n", invoice.invoice_number));
    output.push_str(&format!("  Date:     {}\n", invoice.date.format("%Y-%m-%d")));
    output.push_str(&format!("  Bill to:  {}\n", invoice.customer_name));
    for line in invoice.customer_address.lines() {
        output.push_str(&format!("            {}\n", line));
    }
    if !invoice.customer_email.is_empty() {
        output.push_str(&format!("            {}\n", invoice.customer_email));
    }
    output.push('\n');

    output.push_str(&format_lines(&invoice.line_items, symbol));
    output.push('\n');
    output.push_str(&format_totals(
        &invoice.totals(),
        &invoice.global_discount_rate.to_string(),
        &invoice.global_tax_rate.to_string(),
        symbol,
    ));

    if !invoice.notes.is_empty() {
        output.push_str(&format!("\nNotes: {}\n", invoice.notes));
    }

    output
}
