//! Pricing engine
//!
//! All arithmetic is exact decimal. Figures are rounded to cents, half up,
//! only where they are fixed: a line total when the line is priced, and each
//! invoice total once, from unrounded intermediates.

use rust_decimal::Decimal;

use crate::config::{RoundingMode, Settings};
use crate::error::{BillbookError, BillbookResult};
use crate::models::cart::LineSnapshot;
use crate::models::{Cart, CartLine, InventoryItem, InvoiceTotals, Money, Rate};

/// `unit_price * quantity`, less `line_discount` percent, rounded to cents
///
/// # Examples
/// ```
/// use billbook_cli::models::{Money, Rate};
/// use billbook_cli::services::pricing::line_total;
/// use rust_decimal::Decimal;
///
/// let total = line_total(Money::from_cents(10000), 3, Rate::new(Decimal::TEN).unwrap()).unwrap();
/// assert_eq!(total.to_string(), "270.00");
/// ```
pub fn line_total(unit_price: Money, quantity: u32, line_discount: Rate) -> BillbookResult<Money> {
    if quantity == 0 {
        return Err(BillbookError::Validation(
            "Quantity must be at least 1".into(),
        ));
    }
    if unit_price.is_negative() {
        return Err(BillbookError::Validation(
            "Unit price cannot be negative".into(),
        ));
    }

    let subtotal = unit_price
        .amount()
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| overflow("line subtotal"))?;
    let discount = subtotal
        .checked_mul(line_discount.fraction())
        .ok_or_else(|| overflow("line discount"))?;
    let total = subtotal
        .checked_sub(discount)
        .ok_or_else(|| overflow("line total"))?;
    Ok(Money::round_from(total))
}

fn overflow(figure: &str) -> BillbookError {
    BillbookError::Validation(format!("Amount too large: {} overflows", figure))
}

/// Aggregate already priced lines into invoice totals
///
/// The global discount applies to the subtotal and the global tax to what
/// remains. Each of the four figures is rounded once, at the end.
pub fn invoice_totals(
    lines: &[CartLine],
    global_discount: Rate,
    global_tax: Rate,
) -> BillbookResult<InvoiceTotals> {
    let subtotal = lines
        .iter()
        .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.line_total().amount()))
        .ok_or_else(|| overflow("subtotal"))?;
    let discount = subtotal
        .checked_mul(global_discount.fraction())
        .ok_or_else(|| overflow("discount"))?;
    let after_discount = subtotal
        .checked_sub(discount)
        .ok_or_else(|| overflow("discounted subtotal"))?;
    let tax = after_discount
        .checked_mul(global_tax.fraction())
        .ok_or_else(|| overflow("tax"))?;
    let grand_total = after_discount
        .checked_add(tax)
        .ok_or_else(|| overflow("grand total"))?;

    Ok(InvoiceTotals {
        subtotal: Money::round_from(subtotal),
        total_discount: Money::round_from(discount),
        total_tax: Money::round_from(tax),
        grand_total: Money::round_from(grand_total),
    })
}

/// Prices items into cart lines with the configured defaults
#[derive(Debug, Clone)]
pub struct PricingEngine {
    rounding: RoundingMode,
    default_tax: Rate,
}

impl PricingEngine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            rounding: settings.rounding_mode,
            default_tax: settings.default_tax_rate,
        }
    }

    pub fn rounding(&self) -> RoundingMode {
        self.rounding
    }

    /// Global tax rate used when an invoice doesn't name one
    pub fn default_global_tax(&self) -> Rate {
        self.default_tax
    }

    /// Snapshot an item into a priced line
    ///
    /// The line discount defaults to the item's own discount rate.
    pub fn price_line(
        &self,
        item: &InventoryItem,
        quantity: u32,
        discount_override: Option<Rate>,
    ) -> BillbookResult<CartLine> {
        self.price_snapshot(LineSnapshot {
            item_id: item.item_id,
            sku: item.sku.clone(),
            name: item.name.clone(),
            company: item.company.clone(),
            quantity,
            unit_price: item.base_price,
            discount_rate: discount_override.unwrap_or(item.discount_rate),
            tax_rate: item.tax_rate,
        })
    }

    /// Price a replacement for `line` with a new quantity and/or discount
    pub fn reprice(
        &self,
        line: &CartLine,
        quantity: Option<u32>,
        discount: Option<Rate>,
    ) -> BillbookResult<CartLine> {
        let mut snapshot = line.snapshot();
        if let Some(quantity) = quantity {
            snapshot.quantity = quantity;
        }
        if let Some(discount) = discount {
            snapshot.discount_rate = discount;
        }
        self.price_snapshot(snapshot)
    }

    fn price_snapshot(&self, snapshot: LineSnapshot) -> BillbookResult<CartLine> {
        let total = match self.rounding {
            RoundingMode::HalfUp => {
                line_total(snapshot.unit_price, snapshot.quantity, snapshot.discount_rate)?
            }
        };
        Ok(CartLine::priced(snapshot, total))
    }

    /// Totals for a cart; `global_tax` falls back to the default rate
    pub fn totals(
        &self,
        cart: &Cart,
        global_discount: Rate,
        global_tax: Option<Rate>,
    ) -> BillbookResult<InvoiceTotals> {
        invoice_totals(
            cart.lines(),
            global_discount,
            global_tax.unwrap_or(self.default_tax),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemDraft;
    use rust_decimal_macros::dec;

    fn rate(percent: Decimal) -> Rate {
        Rate::new(percent).unwrap()
    }

    fn engine() -> PricingEngine {
        PricingEngine::new(&Settings::default())
    }

    fn priced(unit: Decimal, quantity: u32, discount: Decimal) -> CartLine {
        let item = InventoryItem::new(
            ItemDraft::new("T1", "Thing", Money::new(unit)).with_rates(rate(dec!(18)), rate(discount)),
        );
        engine().price_line(&item, quantity, None).unwrap()
    }

    #[test]
    fn test_line_total() {
        let total = line_total(Money::new(dec!(100.00)), 3, rate(dec!(10))).unwrap();
        assert_eq!(total, Money::new(dec!(270.00)));
        assert_eq!(total.amount().to_string(), "270.00");
    }

    #[test]
    fn test_line_total_rounds_half_up() {
        // 4.115 * 3 = 12.345
        let total = line_total(Money::new(dec!(4.115)), 3, Rate::zero()).unwrap();
        assert_eq!(total.amount(), dec!(12.35));
    }

    #[test]
    fn test_line_total_rejects_zero_quantity() {
        let err = line_total(Money::new(dec!(1)), 0, Rate::zero()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_invoice_totals() {
        let lines = vec![
            priced(dec!(100.00), 3, dec!(10)),
            priced(dec!(50.00), 1, dec!(0)),
        ];
        let totals = invoice_totals(&lines, Rate::zero(), rate(dec!(18))).unwrap();

        assert_eq!(totals.subtotal.amount(), dec!(320.00));
        assert_eq!(totals.total_discount.amount(), dec!(0.00));
        assert_eq!(totals.total_tax.amount(), dec!(57.60));
        assert_eq!(totals.grand_total.amount(), dec!(377.60));
        assert_eq!(totals.grand_total.amount().to_string(), "377.60");
    }

    #[test]
    fn test_grand_total_rounded_once_from_unrounded_parts() {
        // discount 0.5025, after discount 9.5475, tax 0.95475, grand 10.50225
        let lines = vec![priced(dec!(10.05), 1, dec!(0))];
        let totals = invoice_totals(&lines, rate(dec!(5)), rate(dec!(10))).unwrap();
        assert_eq!(totals.total_discount.amount(), dec!(0.50));
        assert_eq!(totals.total_tax.amount(), dec!(0.95));
        assert_eq!(totals.grand_total.amount(), dec!(10.50));
    }

    #[test]
    fn test_totals_independent_of_line_order() {
        let mut lines = vec![
            priced(dec!(0.10), 7, dec!(3)),
            priced(dec!(19.99), 2, dec!(12.5)),
            priced(dec!(3.33), 3, dec!(0)),
        ];
        let forward = invoice_totals(&lines, rate(dec!(7.5)), rate(dec!(18))).unwrap();
        lines.reverse();
        let backward = invoice_totals(&lines, rate(dec!(7.5)), rate(dec!(18))).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_price_line_snapshots_item() {
        let line = priced(dec!(100.00), 3, dec!(10));
        assert_eq!(line.sku(), "T1");
        assert_eq!(line.quantity(), 3);
        assert_eq!(line.discount_rate(), rate(dec!(10)));
        assert_eq!(line.tax_rate(), rate(dec!(18)));
        assert_eq!(line.line_total(), Money::new(dec!(270.00)));
    }

    #[test]
    fn test_reprice_replaces_not_mutates() {
        let line = priced(dec!(100.00), 3, dec!(10));
        let changed = engine().reprice(&line, Some(1), Some(Rate::zero())).unwrap();

        assert_eq!(line.line_total(), Money::new(dec!(270.00)));
        assert_eq!(changed.line_total(), Money::new(dec!(100.00)));
        assert_eq!(changed.item_id(), line.item_id());

        assert!(engine().reprice(&line, Some(0), None).is_err());
    }

    #[test]
    fn test_totals_default_tax() {
        let settings = Settings {
            default_tax_rate: rate(dec!(18)),
            ..Settings::default()
        };
        let engine = PricingEngine::new(&settings);
        let mut cart = Cart::new();
        cart.add(priced(dec!(270.00), 1, dec!(0)));
        cart.add(priced(dec!(50.00), 1, dec!(0)));

        let totals = engine.totals(&cart, Rate::zero(), None).unwrap();
        assert_eq!(totals.grand_total.amount(), dec!(377.60));

        let untaxed = engine.totals(&cart, Rate::zero(), Some(Rate::zero())).unwrap();
        assert_eq!(untaxed.grand_total.amount(), dec!(320.00));
    }

    #[test]
    fn test_line_total_overflow_is_an_error() {
        let err = line_total(Money::new(Decimal::MAX), 2, Rate::zero()).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn test_invoice_totals_overflow_is_an_error() {
        let huge = dec!(50000000000000000000000000000);
        let lines = vec![priced(huge, 1, dec!(0)), priced(huge, 1, dec!(0))];
        let err = invoice_totals(&lines, Rate::zero(), Rate::zero()).unwrap_err();
        assert!(err.is_validation());

        let mut cart = Cart::new();
        for line in lines {
            cart.add(line);
        }
        assert!(engine().totals(&cart, Rate::zero(), None).is_err());
    }
}
