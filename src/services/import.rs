//! CSV import service
//!
//! Bulk-loads inventory items from comma-separated text. The header row names
//! the columns (any order, case-insensitive); `sku` and `name` are required,
//! `company`, `size_mm`, `size_inch`, `base_price`, `tax_rate` and
//! `discount_rate` are optional. Bad rows are rejected one by one with a
//! reason while the rest of the file imports.

use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{BillbookError, BillbookResult};
use crate::models::{InventoryItem, ItemDraft, Money, Rate};
use crate::storage::Storage;

/// How imported rows combine with the existing table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Keep existing items; skip rows whose SKU is already present
    #[default]
    Append,
    /// Discard the existing table and keep only the imported rows
    Replace,
}

impl FromStr for ImportMode {
    type Err = BillbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "replace" => Ok(Self::Replace),
            other => Err(BillbookError::Validation(format!(
                "Unknown import mode '{}' (expected append or replace)",
                other
            ))),
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => write!(f, "append"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

/// Column positions found in the header row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pub sku: usize,
    pub name: usize,
    pub company: Option<usize>,
    pub size_mm: Option<usize>,
    pub size_inch: Option<usize>,
    pub base_price: Option<usize>,
    pub tax_rate: Option<usize>,
    pub discount_rate: Option<usize>,
}

impl ColumnMapping {
    /// Detect column mapping from the header record
    pub fn from_headers(headers: &StringRecord) -> BillbookResult<Self> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
        };

        let required = |wanted: &str| {
            find(wanted).ok_or_else(|| {
                BillbookError::Import(format!("Missing required column '{}'", wanted))
            })
        };

        Ok(Self {
            sku: required("sku")?,
            name: required("name")?,
            company: find("company"),
            size_mm: find("size_mm"),
            size_inch: find("size_inch"),
            base_price: find("base_price"),
            tax_rate: find("tax_rate"),
            discount_rate: find("discount_rate"),
        })
    }
}

/// What happened to one data row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Imported { sku: String },
    Skipped { sku: String, reason: String },
    Rejected { reason: String },
}

/// One data row's outcome; `line` is the 1-based line in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowReport {
    pub line: usize,
    pub outcome: RowOutcome,
}

/// Result of a completed import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub mode: ImportMode,
    /// Items in the table before the import
    pub previous_count: usize,
    pub rows: Vec<RowReport>,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Imported { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Skipped { .. }))
    }

    pub fn rejected(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Rejected { .. }))
    }

    fn count(&self, predicate: impl Fn(&RowOutcome) -> bool) -> usize {
        self.rows.iter().filter(|r| predicate(&r.outcome)).count()
    }
}

/// Service for CSV import
pub struct ImportService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> ImportService<'a> {
    /// Create a new import service; missing rates default from `settings`
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    /// Parse CSV text into per-row drafts without touching the store
    pub fn parse<R: Read>(&self, input: R) -> BillbookResult<Vec<(usize, Result<ItemDraft, String>)>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(input);

        let mapping = ColumnMapping::from_headers(reader.headers()?)?;

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let line = record
                .as_ref()
                .ok()
                .and_then(|r| r.position())
                .map(|p| p.line() as usize)
                .unwrap_or(index + 2);
            let parsed = match record {
                Ok(record) => self.parse_record(&record, &mapping),
                Err(e) => Err(format!("Error reading CSV record: {}", e)),
            };
            rows.push((line, parsed));
        }
        Ok(rows)
    }

    /// Import from a file on disk
    pub fn import_file(&self, path: &Path, mode: ImportMode) -> BillbookResult<ImportReport> {
        let file = std::fs::File::open(path).map_err(|e| {
            BillbookError::Import(format!("Failed to open {}: {}", path.display(), e))
        })?;
        self.import(file, mode)
    }

    /// Import CSV text into the inventory table
    pub fn import<R: Read>(&self, input: R, mode: ImportMode) -> BillbookResult<ImportReport> {
        let parsed = self.parse(input)?;

        let existing = self.storage.inventory.load()?;
        let previous_count = existing.len();
        let mut items = match mode {
            ImportMode::Append => existing,
            ImportMode::Replace => Vec::new(),
        };

        let mut seen: HashSet<String> = items.iter().map(|i| sku_key(&i.sku)).collect();
        let mut rows = Vec::with_capacity(parsed.len());

        for (line, result) in parsed {
            let outcome = match result {
                Err(reason) => RowOutcome::Rejected { reason },
                Ok(draft) => {
                    let item = InventoryItem::new(draft);
                    if let Err(e) = item.validate() {
                        RowOutcome::Rejected {
                            reason: e.to_string(),
                        }
                    } else if !seen.insert(sku_key(&item.sku)) {
                        RowOutcome::Skipped {
                            sku: item.sku,
                            reason: "SKU already present".into(),
                        }
                    } else {
                        let sku = item.sku.clone();
                        items.push(item);
                        RowOutcome::Imported { sku }
                    }
                }
            };

            if let RowOutcome::Rejected { reason } = &outcome {
                warn!(line, reason = %reason, "Import row rejected");
            }
            rows.push(RowReport { line, outcome });
        }

        let report = ImportReport {
            mode,
            previous_count,
            rows,
        };

        if report.imported() > 0 || mode == ImportMode::Replace {
            self.storage.inventory.save(&mut items)?;
        }

        info!(
            mode = %mode,
            imported = report.imported(),
            skipped = report.skipped(),
            rejected = report.rejected(),
            "Inventory import finished"
        );
        Ok(report)
    }

    fn parse_record(&self, record: &StringRecord, mapping: &ColumnMapping) -> Result<ItemDraft, String> {
        let cell = |index: Option<usize>| {
            index
                .and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        let sku = cell(Some(mapping.sku)).ok_or("Missing SKU")?;
        let name = cell(Some(mapping.name)).ok_or("Missing name")?;

        let size = |field: &str, index: Option<usize>| -> Result<Option<Decimal>, String> {
            cell(index)
                .map(|s| {
                    Decimal::from_str(s).map_err(|_| format!("Invalid {}: '{}'", field, s))
                })
                .transpose()
        };
        let rate = |field: &str, index: Option<usize>, default: Rate| -> Result<Rate, String> {
            match cell(index) {
                Some(s) => Rate::parse(s).map_err(|e| format!("Invalid {}: {}", field, e)),
                None => Ok(default),
            }
        };

        let base_price = match cell(mapping.base_price) {
            Some(s) => Money::parse(s).map_err(|e| format!("Invalid base_price: {}", e))?,
            None => Money::zero(),
        };

        let mut draft = ItemDraft::new(sku, name, base_price)
            .with_sizes(
                size("size_mm", mapping.size_mm)?,
                size("size_inch", mapping.size_inch)?,
            )
            .with_rates(
                rate("tax_rate", mapping.tax_rate, self.settings.default_tax_rate)?,
                rate(
                    "discount_rate",
                    mapping.discount_rate,
                    self.settings.default_discount_rate,
                )?,
            );
        draft.company = cell(mapping.company).map(str::to_string);

        Ok(draft)
    }
}

fn sku_key(sku: &str) -> String {
    sku.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BillbookPaths, StorageMode};
    use crate::services::InventoryService;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage, Settings) {
        let temp_dir = TempDir::new().unwrap();
        let paths = BillbookPaths::with_base_dir(temp_dir.path().to_path_buf());
        let settings = Settings {
            storage_mode: StorageMode::Json,
            default_tax_rate: Rate::new(dec!(18)).unwrap(),
            ..Settings::default()
        };
        let storage = Storage::new(paths, &settings).unwrap();
        (temp_dir, storage, settings)
    }

    const CSV: &str = "\
SKU,Name,Company,size_mm,base_price,discount_rate
A100,Red Widget,Acme,12.7,100.00,10
B200,Blue Widget,,,50,
,Nameless SKU,,,1,
C300,Bad Price,,,abc,
a100,Duplicate Red,,,1,
";

    #[test]
    fn test_mapping_from_headers() {
        let headers = StringRecord::from(vec![" Name ", "SKU", "tax_rate"]);
        let mapping = ColumnMapping::from_headers(&headers).unwrap();
        assert_eq!(mapping.sku, 1);
        assert_eq!(mapping.name, 0);
        assert_eq!(mapping.tax_rate, Some(2));
        assert_eq!(mapping.company, None);

        let missing = StringRecord::from(vec!["sku", "company"]);
        assert!(ColumnMapping::from_headers(&missing).is_err());
    }

    #[test]
    fn test_parse_defaults() {
        let (_temp, storage, settings) = create_test_storage();
        let service = ImportService::new(&storage, &settings);

        let rows = service.parse(CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 5);

        let (line, b200) = &rows[1];
        assert_eq!(*line, 3);
        let b200 = b200.as_ref().unwrap();
        assert_eq!(b200.company, None);
        assert_eq!(b200.tax_rate.percent(), dec!(18));
        assert_eq!(b200.discount_rate, Rate::zero());

        assert_eq!(rows[2].1, Err("Missing SKU".to_string()));
        assert!(rows[3].1.as_ref().unwrap_err().contains("base_price"));
    }

    #[test]
    fn test_append_partial_success() {
        let (_temp, storage, settings) = create_test_storage();
        InventoryService::new(&storage)
            .add(ItemDraft::new("B200", "Existing Blue", Money::zero()))
            .unwrap();

        let report = ImportService::new(&storage, &settings)
            .import(CSV.as_bytes(), ImportMode::Append)
            .unwrap();

        assert_eq!(report.previous_count, 1);
        assert_eq!(report.imported(), 1);
        assert_eq!(report.skipped(), 2);
        assert_eq!(report.rejected(), 2);

        let items = storage.inventory.load().unwrap();
        let skus: Vec<_> = items.iter().map(|i| i.sku.as_str()).collect();
        assert_eq!(skus, vec!["B200", "A100"]);
        assert_eq!(items[0].name, "Existing Blue");
        assert_eq!(items[1].base_price.amount(), dec!(100.00));
    }

    #[test]
    fn test_replace_discards_existing() {
        let (_temp, storage, settings) = create_test_storage();
        InventoryService::new(&storage)
            .add(ItemDraft::new("Z900", "Old", Money::zero()))
            .unwrap();

        let report = ImportService::new(&storage, &settings)
            .import(CSV.as_bytes(), ImportMode::Replace)
            .unwrap();

        assert_eq!(report.imported(), 2);
        assert_eq!(report.skipped(), 1);

        let items = storage.inventory.load().unwrap();
        let skus: Vec<_> = items.iter().map(|i| i.sku.as_str()).collect();
        assert_eq!(skus, vec!["A100", "B200"]);
        assert_eq!(items[0].name, "Red Widget");
        assert_eq!(storage.inventory.list_backups().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_required_column_fails_whole_file() {
        let (_temp, storage, settings) = create_test_storage();
        let err = ImportService::new(&storage, &settings)
            .import("sku,price\nA1,2\n".as_bytes(), ImportMode::Append)
            .unwrap_err();
        assert!(matches!(err, BillbookError::Import(_)));
        assert!(!storage.inventory.path().exists());
    }

    #[test]
    fn test_import_mode_from_str() {
        assert_eq!("Replace".parse::<ImportMode>().unwrap(), ImportMode::Replace);
        assert!("merge".parse::<ImportMode>().is_err());
    }
}
