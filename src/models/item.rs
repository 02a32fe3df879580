//! Inventory item model
//!
//! An item's `search_blob` and `display_text` are caches derived from its
//! other fields. They are private, rebuilt by the store on every read and
//! write, and cannot be set from outside the crate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ItemId;
use super::money::{number_text, Money, Rate};

/// Editable fields of an inventory item
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemDraft {
    pub sku: String,
    pub name: String,
    pub company: Option<String>,
    pub size_mm: Option<Decimal>,
    pub size_inch: Option<Decimal>,
    pub base_price: Money,
    pub tax_rate: Rate,
    pub discount_rate: Rate,
}

impl ItemDraft {
    pub fn new(sku: impl Into<String>, name: impl Into<String>, base_price: Money) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            base_price,
            ..Self::default()
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_sizes(mut self, size_mm: Option<Decimal>, size_inch: Option<Decimal>) -> Self {
        self.size_mm = size_mm;
        self.size_inch = size_inch;
        self
    }

    pub fn with_rates(mut self, tax_rate: Rate, discount_rate: Rate) -> Self {
        self.tax_rate = tax_rate;
        self.discount_rate = discount_rate;
        self
    }

    /// Trim text fields and drop empty optional ones
    fn normalized(mut self) -> Self {
        self.sku = self.sku.trim().to_string();
        self.name = self.name.trim().to_string();
        self.company = self
            .company
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self
    }
}

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_id: ItemId,
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub size_mm: Option<Decimal>,
    #[serde(default)]
    pub size_inch: Option<Decimal>,
    pub base_price: Money,
    #[serde(default)]
    pub tax_rate: Rate,
    #[serde(default)]
    pub discount_rate: Rate,
    #[serde(default)]
    search_blob: String,
    #[serde(default)]
    display_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Create a new item from a draft, assigning a fresh id
    pub fn new(draft: ItemDraft) -> Self {
        let now = Utc::now();
        Self::from_parts(ItemId::new(), draft.normalized(), now, now)
    }

    /// Rebuild an item read back from storage, as stored
    pub(crate) fn from_parts(
        item_id: ItemId,
        draft: ItemDraft,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let mut item = Self {
            item_id,
            sku: draft.sku,
            name: draft.name,
            company: draft.company,
            size_mm: draft.size_mm,
            size_inch: draft.size_inch,
            base_price: draft.base_price,
            tax_rate: draft.tax_rate,
            discount_rate: draft.discount_rate,
            search_blob: String::new(),
            display_text: String::new(),
            created_at,
            updated_at,
        };
        item.refresh_derived();
        item
    }

    /// Replace the editable fields, keeping id and creation time
    pub fn apply(&mut self, draft: ItemDraft) {
        let draft = draft.normalized();
        self.sku = draft.sku;
        self.name = draft.name;
        self.company = draft.company;
        self.size_mm = draft.size_mm;
        self.size_inch = draft.size_inch;
        self.base_price = draft.base_price;
        self.tax_rate = draft.tax_rate;
        self.discount_rate = draft.discount_rate;
        self.updated_at = Utc::now();
        self.refresh_derived();
    }

    /// The editable fields of this item
    pub fn draft(&self) -> ItemDraft {
        ItemDraft {
            sku: self.sku.clone(),
            name: self.name.clone(),
            company: self.company.clone(),
            size_mm: self.size_mm,
            size_inch: self.size_inch,
            base_price: self.base_price,
            tax_rate: self.tax_rate,
            discount_rate: self.discount_rate,
        }
    }

    /// Lower-cased text the search engine matches against
    pub fn search_blob(&self) -> &str {
        &self.search_blob
    }

    /// One-line summary for selection lists
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    /// Rebuild the cached derived fields from the source fields
    pub(crate) fn refresh_derived(&mut self) {
        self.search_blob = build_search_blob(self);
        self.display_text = build_display_text(self);
    }

    /// Company name, empty when unset
    pub fn company_text(&self) -> &str {
        self.company.as_deref().unwrap_or("")
    }

    /// Validate the item
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.sku.trim().is_empty() {
            return Err(ItemValidationError::MissingSku);
        }
        if self.name.trim().is_empty() {
            return Err(ItemValidationError::MissingName);
        }
        if self.base_price.is_negative() {
            return Err(ItemValidationError::NegativePrice);
        }
        for (field, size) in [("size_mm", self.size_mm), ("size_inch", self.size_inch)] {
            if size.is_some_and(|s| s.is_sign_negative() && !s.is_zero()) {
                return Err(ItemValidationError::NegativeSize(field));
            }
        }
        Ok(())
    }
}

impl fmt::Display for InventoryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text)
    }
}

fn optional_number(value: &Option<Decimal>) -> String {
    value.map(number_text).unwrap_or_default()
}

fn build_search_blob(item: &InventoryItem) -> String {
    let fields = [
        item.sku.clone(),
        item.name.clone(),
        item.company.clone().unwrap_or_default(),
        optional_number(&item.size_mm),
        optional_number(&item.size_inch),
        number_text(item.base_price.amount()),
        number_text(item.tax_rate.percent()),
        number_text(item.discount_rate.percent()),
    ];
    fields.join(" ").to_lowercase()
}

fn build_display_text(item: &InventoryItem) -> String {
    match &item.company {
        Some(company) => format!("{} - {} ({})", item.sku, item.name, company),
        None => format!("{} - {}", item.sku, item.name),
    }
}

/// Validation errors for inventory items
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    MissingSku,
    MissingName,
    NegativePrice,
    NegativeSize(&'static str),
}

impl fmt::Display for ItemValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSku => write!(f, "SKU is required"),
            Self::MissingName => write!(f, "Name is required"),
            Self::NegativePrice => write!(f, "Base price cannot be negative"),
            Self::NegativeSize(field) => write!(f, "{} cannot be negative", field),
        }
    }
}

impl std::error::Error for ItemValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn widget() -> InventoryItem {
        InventoryItem::new(
            ItemDraft::new("A100", "Red Widget", Money::new(dec!(12.50)))
                .with_company("Acme")
                .with_sizes(Some(dec!(25)), None)
                .with_rates(Rate::new(dec!(18)).unwrap(), Rate::new(dec!(5)).unwrap()),
        )
    }

    #[test]
    fn test_derived_fields_built_on_creation() {
        let item = widget();
        assert_eq!(item.search_blob(), "a100 red widget acme 25.0  12.5 18.0 5.0");
        assert_eq!(item.display_text(), "A100 - Red Widget (Acme)");
    }

    #[test]
    fn test_display_text_without_company() {
        let item = InventoryItem::new(ItemDraft::new("B200", "Blue Widget", Money::zero()));
        assert_eq!(item.display_text(), "B200 - Blue Widget");
        assert_eq!(item.to_string(), "B200 - Blue Widget");
    }

    #[test]
    fn test_apply_refreshes_derived_fields() {
        let mut item = widget();
        let id = item.item_id;
        let created = item.created_at;

        let mut draft = item.draft();
        draft.name = "Green Widget".into();
        draft.company = Some("   ".into());
        item.apply(draft);

        assert_eq!(item.item_id, id);
        assert_eq!(item.created_at, created);
        assert_eq!(item.company, None);
        assert_eq!(item.display_text(), "A100 - Green Widget");
        assert!(item.search_blob().contains("green widget"));
    }

    #[test]
    fn test_validate() {
        assert!(widget().validate().is_ok());

        let item = InventoryItem::new(ItemDraft::new("", "Nameless", Money::zero()));
        assert_eq!(item.validate(), Err(ItemValidationError::MissingSku));

        let item = InventoryItem::new(ItemDraft::new("C1", " ", Money::zero()));
        assert_eq!(item.validate(), Err(ItemValidationError::MissingName));

        let item = InventoryItem::new(ItemDraft::new("C1", "Thing", Money::new(dec!(-1))));
        assert_eq!(item.validate(), Err(ItemValidationError::NegativePrice));

        let item = InventoryItem::new(
            ItemDraft::new("C1", "Thing", Money::zero()).with_sizes(None, Some(dec!(-0.5))),
        );
        assert_eq!(
            item.validate(),
            Err(ItemValidationError::NegativeSize("size_inch"))
        );
    }

    #[test]
    fn test_derived_fields_ignored_from_input() {
        let mut item = widget();
        let mut json = serde_json::to_value(&item).unwrap();
        json["search_blob"] = "tampered".into();
        let mut loaded: InventoryItem = serde_json::from_value(json).unwrap();
        assert_eq!(loaded.search_blob(), "tampered");

        loaded.refresh_derived();
        item.refresh_derived();
        assert_eq!(loaded, item);
    }
}
