//! Cart line and cart models
//!
//! A `CartLine` snapshots an item's identity and pricing at the moment it was
//! added. Its `line_total` is computed once, by the pricing engine, and the
//! line is never mutated afterwards: changing a quantity or discount means
//! pricing a new line and replacing the old one.

use serde::{Deserialize, Serialize};

use super::ids::ItemId;
use super::money::{Money, Rate};

/// A priced line on a cart or invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    item_id: ItemId,
    sku: String,
    name: String,
    #[serde(default)]
    company: Option<String>,
    quantity: u32,
    unit_price: Money,
    discount_rate: Rate,
    tax_rate: Rate,
    line_total: Money,
}

/// Source values for a line before pricing
#[derive(Debug, Clone)]
pub(crate) struct LineSnapshot {
    pub item_id: ItemId,
    pub sku: String,
    pub name: String,
    pub company: Option<String>,
    pub quantity: u32,
    pub unit_price: Money,
    pub discount_rate: Rate,
    pub tax_rate: Rate,
}

impl CartLine {
    /// Assemble a line from its snapshot and an already rounded total
    pub(crate) fn priced(snapshot: LineSnapshot, line_total: Money) -> Self {
        Self {
            item_id: snapshot.item_id,
            sku: snapshot.sku,
            name: snapshot.name,
            company: snapshot.company,
            quantity: snapshot.quantity,
            unit_price: snapshot.unit_price,
            discount_rate: snapshot.discount_rate,
            tax_rate: snapshot.tax_rate,
            line_total,
        }
    }

    /// The snapshot this line was priced from, for re-pricing with changes
    pub(crate) fn snapshot(&self) -> LineSnapshot {
        LineSnapshot {
            item_id: self.item_id,
            sku: self.sku.clone(),
            name: self.name.clone(),
            company: self.company.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount_rate: self.discount_rate,
            tax_rate: self.tax_rate,
        }
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price per unit at the time the line was added
    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn discount_rate(&self) -> Rate {
        self.discount_rate
    }

    pub fn tax_rate(&self) -> Rate {
        self.tax_rate
    }

    /// Quantity times unit price less the line discount, rounded to cents
    pub fn line_total(&self) -> Money {
        self.line_total
    }
}

/// An ordered collection of priced lines being assembled into an invoice
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, line: CartLine) {
        self.lines.push(line);
    }

    /// Replace the line at `index`, returning the old one
    pub fn replace(&mut self, index: usize, line: CartLine) -> Option<CartLine> {
        let slot = self.lines.get_mut(index)?;
        Some(std::mem::replace(slot, line))
    }

    pub fn remove(&mut self, index: usize) -> Option<CartLine> {
        if index < self.lines.len() {
            Some(self.lines.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&CartLine> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(sku: &str, cents: i64) -> CartLine {
        CartLine::priced(
            LineSnapshot {
                item_id: ItemId::new(),
                sku: sku.to_string(),
                name: format!("Item {}", sku),
                company: None,
                quantity: 1,
                unit_price: Money::from_cents(cents),
                discount_rate: Rate::zero(),
                tax_rate: Rate::zero(),
            },
            Money::from_cents(cents),
        )
    }

    #[test]
    fn test_cart_add_replace_remove() {
        let mut cart = Cart::new();
        assert!(cart.is_empty());

        cart.add(line("A", 100));
        cart.add(line("B", 200));
        assert_eq!(cart.len(), 2);

        let old = cart.replace(1, line("C", 300)).unwrap();
        assert_eq!(old.sku(), "B");
        assert_eq!(cart.get(1).unwrap().sku(), "C");
        assert!(cart.replace(5, line("D", 1)).is_none());

        let removed = cart.remove(0).unwrap();
        assert_eq!(removed.sku(), "A");
        assert!(cart.remove(3).is_none());
        assert_eq!(cart.len(), 1);

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_line_serialization_keeps_snapshot() {
        let original = line("A100", 27000);
        let json = serde_json::to_string(&original).unwrap();
        let restored: CartLine = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
        assert_eq!(restored.line_total(), Money::from_cents(27000));
    }
}
