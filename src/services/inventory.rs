//! Inventory service
//!
//! Provides business logic for catalog management: CRUD on items with SKU
//! uniqueness, lookup by SKU or id prefix, and search.

use tracing::info;

use super::search::{SearchEngine, SearchHit};
use crate::error::{BillbookError, BillbookResult};
use crate::models::{InventoryItem, ItemDraft, ItemId};
use crate::storage::Storage;

/// Service for inventory management
pub struct InventoryService<'a> {
    storage: &'a Storage,
}

fn same_sku(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl<'a> InventoryService<'a> {
    /// Create a new inventory service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Add a new item
    pub fn add(&self, draft: ItemDraft) -> BillbookResult<InventoryItem> {
        let item = InventoryItem::new(draft);
        item.validate()
            .map_err(|e| BillbookError::Validation(e.to_string()))?;

        let mut items = self.storage.inventory.load()?;

        if items.iter().any(|existing| same_sku(&existing.sku, &item.sku)) {
            return Err(BillbookError::Duplicate {
                entity_type: "Item",
                identifier: item.sku.clone(),
            });
        }

        items.push(item.clone());
        self.storage.inventory.save(&mut items)?;

        info!(sku = %item.sku, id = %item.item_id.short(), "Item added");
        Ok(item)
    }

    /// Replace an item's editable fields
    pub fn update(&self, identifier: &str, draft: ItemDraft) -> BillbookResult<InventoryItem> {
        let mut items = self.storage.inventory.load()?;
        let index = locate(&items, identifier)?
            .ok_or_else(|| BillbookError::item_not_found(identifier))?;

        let mut updated = items[index].clone();
        updated.apply(draft);
        updated
            .validate()
            .map_err(|e| BillbookError::Validation(e.to_string()))?;

        // Check for duplicate SKU (excluding self)
        if items
            .iter()
            .any(|other| other.item_id != updated.item_id && same_sku(&other.sku, &updated.sku))
        {
            return Err(BillbookError::Duplicate {
                entity_type: "Item",
                identifier: updated.sku.clone(),
            });
        }

        items[index] = updated.clone();
        self.storage.inventory.save(&mut items)?;

        info!(sku = %updated.sku, id = %updated.item_id.short(), "Item updated");
        Ok(updated)
    }

    /// Delete an item, returning it
    pub fn delete(&self, identifier: &str) -> BillbookResult<InventoryItem> {
        let mut items = self.storage.inventory.load()?;
        let index = locate(&items, identifier)?
            .ok_or_else(|| BillbookError::item_not_found(identifier))?;

        let removed = items.remove(index);
        self.storage.inventory.save(&mut items)?;

        info!(sku = %removed.sku, id = %removed.item_id.short(), "Item deleted");
        Ok(removed)
    }

    /// Get an item by ID
    pub fn get(&self, id: ItemId) -> BillbookResult<Option<InventoryItem>> {
        let items = self.storage.inventory.load()?;
        Ok(items.into_iter().find(|item| item.item_id == id))
    }

    /// Find an item by SKU (case-insensitive) or by id prefix
    pub fn find(&self, identifier: &str) -> BillbookResult<Option<InventoryItem>> {
        let items = self.storage.inventory.load()?;
        Ok(locate(&items, identifier)?.map(|index| items[index].clone()))
    }

    /// Like `find`, but a missing item is an error
    pub fn require(&self, identifier: &str) -> BillbookResult<InventoryItem> {
        self.find(identifier)?
            .ok_or_else(|| BillbookError::item_not_found(identifier))
    }

    /// All items in store order
    pub fn list(&self) -> BillbookResult<Vec<InventoryItem>> {
        self.storage.inventory.load()
    }

    /// Rank items against a free-text query
    pub fn search(&self, engine: &SearchEngine, query: &str) -> BillbookResult<Vec<SearchHit>> {
        let items = self.storage.inventory.load()?;
        Ok(engine.search(query, &items))
    }
}

/// Index of the item named by `identifier`
///
/// SKU matches win over id matches. An id prefix shared by several items is
/// an error rather than a guess.
fn locate(items: &[InventoryItem], identifier: &str) -> BillbookResult<Option<usize>> {
    if let Some(index) = items.iter().position(|item| same_sku(&item.sku, identifier)) {
        return Ok(Some(index));
    }

    let matches: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.item_id.matches(identifier))
        .map(|(index, _)| index)
        .collect();

    match matches.as_slice() {
        [] => Ok(None),
        [index] => Ok(Some(*index)),
        _ => Err(BillbookError::Validation(format!(
            "'{}' matches {} items; use more of the id",
            identifier,
            matches.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BillbookPaths, Settings, StorageMode};
    use crate::models::Money;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = BillbookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let settings = Settings {
            storage_mode: StorageMode::Json,
            ..Settings::default()
        };
        let storage = Storage::new(paths, &settings).unwrap();
        (temp_dir, storage)
    }

    fn draft(sku: &str, name: &str) -> ItemDraft {
        ItemDraft::new(sku, name, Money::new(dec!(10.00)))
    }

    #[test]
    fn test_add_item() {
        let (_temp, storage) = create_test_storage();
        let service = InventoryService::new(&storage);

        let item = service.add(draft(" A100 ", "Red Widget")).unwrap();
        assert_eq!(item.sku, "A100");
        assert_eq!(service.list().unwrap(), vec![item]);
    }

    #[test]
    fn test_add_duplicate_sku() {
        let (_temp, storage) = create_test_storage();
        let service = InventoryService::new(&storage);

        service.add(draft("A100", "Red Widget")).unwrap();
        let err = service.add(draft("a100", "Other")).unwrap_err();
        assert!(matches!(err, BillbookError::Duplicate { .. }));
        assert_eq!(service.list().unwrap().len(), 1);
    }

    #[test]
    fn test_add_invalid_item() {
        let (_temp, storage) = create_test_storage();
        let service = InventoryService::new(&storage);

        let err = service.add(draft("A100", "")).unwrap_err();
        assert!(err.is_validation());
        assert!(!storage.inventory.path().exists());
    }

    #[test]
    fn test_find_by_sku_and_id() {
        let (_temp, storage) = create_test_storage();
        let service = InventoryService::new(&storage);

        let item = service.add(draft("A100", "Red Widget")).unwrap();
        service.add(draft("B200", "Blue Widget")).unwrap();

        assert_eq!(service.find("a100").unwrap().unwrap().item_id, item.item_id);
        assert_eq!(
            service.find(&item.item_id.short()).unwrap().unwrap().sku,
            "A100"
        );
        assert_eq!(service.get(item.item_id).unwrap().unwrap().sku, "A100");
        assert!(service.find("Z999").unwrap().is_none());
        assert!(service.require("Z999").unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_item() {
        let (_temp, storage) = create_test_storage();
        let service = InventoryService::new(&storage);

        let item = service.add(draft("A100", "Red Widget")).unwrap();
        service.add(draft("B200", "Blue Widget")).unwrap();

        let mut changes = item.draft();
        changes.name = "Crimson Widget".into();
        let updated = service.update("A100", changes).unwrap();
        assert_eq!(updated.item_id, item.item_id);
        assert_eq!(updated.display_text(), "A100 - Crimson Widget");

        let mut clash = updated.draft();
        clash.sku = "b200".into();
        assert!(matches!(
            service.update("A100", clash).unwrap_err(),
            BillbookError::Duplicate { .. }
        ));

        assert!(service
            .update("Z999", draft("Z999", "Nothing"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_delete_item() {
        let (_temp, storage) = create_test_storage();
        let service = InventoryService::new(&storage);

        service.add(draft("A100", "Red Widget")).unwrap();
        let removed = service.delete("A100").unwrap();
        assert_eq!(removed.sku, "A100");
        assert!(service.list().unwrap().is_empty());
        assert!(service.delete("A100").unwrap_err().is_not_found());
    }

    #[test]
    fn test_search_reads_store() {
        let (_temp, storage) = create_test_storage();
        let service = InventoryService::new(&storage);

        service.add(draft("A100", "Red Widget")).unwrap();
        service.add(draft("B200", "Blue Widget")).unwrap();

        let hits = service.search(&SearchEngine::default(), "blue").unwrap();
        assert_eq!(hits[0].item.sku, "B200");
    }
}
