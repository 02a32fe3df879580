//! Inventory search
//!
//! Every item is scored against the query: a partial fuzzy match over the
//! item's search blob, plus fixed boosts when the query appears literally in
//! the SKU, name or company, plus a numeric boost for all-digit queries that
//! appear in the price or a size. Results above the threshold come back
//! best-first; when nothing clears it, the first items in store order are
//! returned instead.

use tracing::{debug, warn};

use super::fuzzy::partial_ratio;
use crate::models::{number_text, InventoryItem};

/// Default cap on the number of results
pub const DEFAULT_LIMIT: usize = 10;

/// Scores at or below this are discarded
pub const SCORE_THRESHOLD: f64 = 30.0;

const SKU_BOOST: f64 = 20.0;
const NAME_BOOST: f64 = 15.0;
const COMPANY_BOOST: f64 = 10.0;
const PRICE_BOOST: f64 = 15.0;
const SIZE_BOOST: f64 = 10.0;

/// How an item's score was built
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub blob: f64,
    pub sku_boost: f64,
    pub name_boost: f64,
    pub company_boost: f64,
    pub numeric_boost: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.blob + self.sku_boost + self.name_boost + self.company_boost + self.numeric_boost
    }
}

/// One search result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub item: InventoryItem,
    /// `None` when the result is a store-order fill rather than a ranked match
    pub score: Option<ScoreBreakdown>,
}

impl SearchHit {
    pub fn is_ranked(&self) -> bool {
        self.score.is_some()
    }
}

/// Ranks inventory items against free-text queries
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine {
    limit: usize,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl SearchEngine {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Search `items` (in store order) for `query`
    pub fn search(&self, query: &str, items: &[InventoryItem]) -> Vec<SearchHit> {
        let query = normalize_query(query);

        if query.is_empty() {
            debug!(limit = self.limit, "Empty query, returning store order");
            return self.store_order(items);
        }

        let mut scored: Vec<(&InventoryItem, ScoreBreakdown)> = items
            .iter()
            .map(|item| (item, score_item(&query, item)))
            .collect();

        // Vec::sort_by is stable, so ties keep store order
        scored.sort_by(|a, b| {
            b.1.total()
                .partial_cmp(&a.1.total())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let hits: Vec<SearchHit> = scored
            .into_iter()
            .filter(|(_, score)| score.total() > SCORE_THRESHOLD)
            .take(self.limit)
            .map(|(item, score)| SearchHit {
                item: item.clone(),
                score: Some(score),
            })
            .collect();

        if hits.is_empty() && !items.is_empty() {
            warn!(query = %query, "No item scored above threshold, returning store order");
            return self.store_order(items);
        }

        debug!(query = %query, limit = self.limit, hits = hits.len(), "Search complete");
        hits
    }

    fn store_order(&self, items: &[InventoryItem]) -> Vec<SearchHit> {
        items
            .iter()
            .take(self.limit)
            .map(|item| SearchHit {
                item: item.clone(),
                score: None,
            })
            .collect()
    }
}

fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Score one item against an already normalized query
pub fn score_item(query: &str, item: &InventoryItem) -> ScoreBreakdown {
    let boost = |field: &str, amount: f64| {
        if field.to_lowercase().contains(query) {
            amount
        } else {
            0.0
        }
    };

    ScoreBreakdown {
        blob: partial_ratio(query, item.search_blob()),
        sku_boost: boost(&item.sku, SKU_BOOST),
        name_boost: boost(&item.name, NAME_BOOST),
        company_boost: boost(item.company_text(), COMPANY_BOOST),
        numeric_boost: numeric_boost(query, item),
    }
}

fn numeric_boost(query: &str, item: &InventoryItem) -> f64 {
    let digits = query.replace('.', "");
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return 0.0;
    }

    let price = if number_text(item.base_price.amount()).contains(query) {
        PRICE_BOOST
    } else {
        0.0
    };

    let in_size = [item.size_mm, item.size_inch]
        .iter()
        .flatten()
        .any(|size| number_text(*size).contains(query));
    let size = if in_size { SIZE_BOOST } else { 0.0 };

    price.max(size)
}
