//! Settings for Billbook
//!
//! Settings are an explicitly constructed value: `Settings::load` reads the
//! file, overlays it on the hard-coded defaults, and writes the merged result
//! straight back, so keys introduced by newer versions appear in old files.
//! Keys this version does not recognize are carried through untouched.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::paths::BillbookPaths;
use crate::error::{BillbookError, BillbookResult};
use crate::models::Rate;
use crate::storage::file_io::{read_json_required, write_json_atomic};

/// Physical layout used for table files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Columnar binary layout (`.parquet`)
    #[default]
    Parquet,
    /// Line-oriented JSON layout (`.json`)
    Json,
}

impl StorageMode {
    /// File extension used for table files in this mode
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Parquet => "parquet",
            Self::Json => "json",
        }
    }

    /// The mode that is not this one
    pub fn other(&self) -> Self {
        match self {
            Self::Parquet => Self::Json,
            Self::Json => Self::Parquet,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "parquet" | "columnar" => Some(Self::Parquet),
            "json" | "jsonl" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Rounding applied to monetary results. Only round-half-up is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RoundingMode {
    #[default]
    #[serde(rename = "ROUND_HALF_UP")]
    HalfUp,
}

/// Business details printed on invoices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

impl Default for BusinessInfo {
    fn default() -> Self {
        Self {
            name: "Your Business Name".to_string(),
            address: "123 Business St\nCity, State 12345".to_string(),
            phone: "(555) 123-4567".to_string(),
            email: "contact@business.com".to_string(),
        }
    }
}

/// Settings for Billbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Which table layout is canonical
    #[serde(default)]
    pub storage_mode: StorageMode,

    /// Tax rate pre-filled for new items and invoices
    #[serde(default)]
    pub default_tax_rate: Rate,

    /// Discount rate pre-filled for new items
    #[serde(default)]
    pub default_discount_rate: Rate,

    #[serde(default = "default_invoice_prefix")]
    pub invoice_number_prefix: String,

    /// Number the next saved invoice receives
    #[serde(default = "default_invoice_counter")]
    pub invoice_counter: u64,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default)]
    pub rounding_mode: RoundingMode,

    #[serde(default)]
    pub business_info: BusinessInfo,

    /// Keys written by other versions, preserved on save
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_invoice_prefix() -> String {
    "INV".to_string()
}

fn default_invoice_counter() -> u64 {
    1
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::default(),
            default_tax_rate: Rate::zero(),
            default_discount_rate: Rate::zero(),
            invoice_number_prefix: default_invoice_prefix(),
            invoice_counter: default_invoice_counter(),
            currency: default_currency(),
            currency_symbol: default_currency_symbol(),
            rounding_mode: RoundingMode::default(),
            business_info: BusinessInfo::default(),
            extra: serde_json::Map::new(),
        }
    }
}

impl Settings {
    /// Load settings, merge them over the defaults and persist the merged result
    ///
    /// A missing file yields the defaults. A present file that cannot be parsed
    /// is reported as a configuration error and left untouched.
    pub fn load(paths: &BillbookPaths) -> BillbookResult<Self> {
        let settings_path = paths.settings_file();

        let settings = if settings_path.exists() {
            let settings: Settings = read_json_required(&settings_path).map_err(|e| {
                BillbookError::Config(format!("Failed to read settings file: {}", e))
            })?;
            settings.validate()?;
            settings
        } else {
            Settings::default()
        };

        settings.save(paths)?;
        debug!(path = %settings_path.display(), mode = %settings.storage_mode, "Settings loaded");
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &BillbookPaths) -> BillbookResult<()> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }

    /// Check the invariants serde cannot express
    pub fn validate(&self) -> BillbookResult<()> {
        if self.invoice_counter == 0 {
            return Err(BillbookError::Config(
                "invoice_counter must be a positive integer".into(),
            ));
        }
        if self.invoice_number_prefix.trim().is_empty() {
            return Err(BillbookError::Config(
                "invoice_number_prefix cannot be empty".into(),
            ));
        }
        Ok(())
    }

    /// Render the invoice number the next saved invoice receives
    pub fn next_invoice_number(&self) -> String {
        format_invoice_number(&self.invoice_number_prefix, self.invoice_counter)
    }

    /// Move the counter past the number just issued
    pub fn advance_invoice_counter(&mut self) -> BillbookResult<()> {
        self.invoice_counter = self
            .invoice_counter
            .checked_add(1)
            .ok_or_else(|| BillbookError::Config("invoice_counter overflowed".into()))?;
        Ok(())
    }

    /// Update one recognized key from its textual value
    pub fn set_value(&mut self, key: &str, value: &str) -> BillbookResult<()> {
        let invalid = |what: &str| {
            BillbookError::Validation(format!("Invalid value for {}: '{}' ({})", key, value, what))
        };

        match key {
            "storage_mode" => {
                self.storage_mode =
                    StorageMode::parse(value).ok_or_else(|| invalid("expected parquet or json"))?;
            }
            "default_tax_rate" => {
                self.default_tax_rate = Rate::parse(value).map_err(|e| invalid(&e.to_string()))?;
            }
            "default_discount_rate" => {
                self.default_discount_rate =
                    Rate::parse(value).map_err(|e| invalid(&e.to_string()))?;
            }
            "invoice_number_prefix" => {
                if value.trim().is_empty() {
                    return Err(invalid("prefix cannot be empty"));
                }
                self.invoice_number_prefix = value.trim().to_string();
            }
            "invoice_counter" => {
                let counter: u64 = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("expected a positive integer"))?;
                if counter == 0 {
                    return Err(invalid("expected a positive integer"));
                }
                self.invoice_counter = counter;
            }
            "currency" => self.currency = value.trim().to_string(),
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "business_info.name" => self.business_info.name = value.to_string(),
            "business_info.address" => self.business_info.address = value.to_string(),
            "business_info.phone" => self.business_info.phone = value.to_string(),
            "business_info.email" => self.business_info.email = value.to_string(),
            "rounding_mode" => {
                if value != "ROUND_HALF_UP" {
                    return Err(invalid("only ROUND_HALF_UP is supported"));
                }
            }
            _ => {
                return Err(BillbookError::Config(format!("Unknown setting: {}", key)));
            }
        }

        Ok(())
    }
}

/// Render `<prefix>-<counter>` with the counter zero-padded to four digits
pub fn format_invoice_number(prefix: &str, counter: u64) -> String {
    format!("{}-{:04}", prefix, counter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn test_paths() -> (TempDir, BillbookPaths) {
        let temp_dir = TempDir::new().unwrap();
        let paths = BillbookPaths::with_base_dir(temp_dir.path().to_path_buf());
        (temp_dir, paths)
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.storage_mode, StorageMode::Parquet);
        assert_eq!(settings.invoice_counter, 1);
        assert_eq!(settings.currency_symbol, "$");
        assert_eq!(settings.next_invoice_number(), "INV-0001");
    }

    #[test]
    fn test_load_creates_file() {
        let (_temp, paths) = test_paths();
        assert!(!paths.settings_file().exists());

        let settings = Settings::load(&paths).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(paths.settings_file().exists());
    }

    #[test]
    fn test_load_merges_missing_keys_and_persists() {
        let (_temp, paths) = test_paths();
        std::fs::write(
            paths.settings_file(),
            r#"{"storage_mode": "json", "invoice_counter": 7, "default_tax_rate": 18.0}"#,
        )
        .unwrap();

        let settings = Settings::load(&paths).unwrap();
        assert_eq!(settings.storage_mode, StorageMode::Json);
        assert_eq!(settings.invoice_counter, 7);
        assert_eq!(settings.default_tax_rate.percent(), dec!(18));
        assert_eq!(settings.currency, "USD");
        assert_eq!(settings.business_info, BusinessInfo::default());

        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(paths.settings_file()).unwrap())
                .unwrap();
        assert_eq!(on_disk["currency"], "USD");
        assert_eq!(on_disk["rounding_mode"], "ROUND_HALF_UP");
        assert_eq!(on_disk["business_info"]["phone"], "(555) 123-4567");
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let (_temp, paths) = test_paths();
        std::fs::write(paths.settings_file(), r#"{"theme": "dark"}"#).unwrap();

        let settings = Settings::load(&paths).unwrap();
        assert_eq!(settings.extra["theme"], "dark");

        let on_disk = std::fs::read_to_string(paths.settings_file()).unwrap();
        assert!(on_disk.contains("\"theme\""));
    }

    #[test]
    fn test_unparseable_file_is_not_replaced() {
        let (_temp, paths) = test_paths();
        std::fs::write(paths.settings_file(), "{ not json").unwrap();

        let err = Settings::load(&paths).unwrap_err();
        assert!(matches!(err, BillbookError::Config(_)));
        assert_eq!(
            std::fs::read_to_string(paths.settings_file()).unwrap(),
            "{ not json"
        );
    }

    #[test]
    fn test_zero_counter_rejected() {
        let (_temp, paths) = test_paths();
        std::fs::write(paths.settings_file(), r#"{"invoice_counter": 0}"#).unwrap();
        assert!(Settings::load(&paths).is_err());
    }

    #[test]
    fn test_set_value() {
        let mut settings = Settings::default();
        settings.set_value("storage_mode", "json").unwrap();
        settings.set_value("default_tax_rate", "12.5").unwrap();
        settings.set_value("invoice_number_prefix", "BB").unwrap();
        settings.set_value("business_info.name", "Acme").unwrap();

        assert_eq!(settings.storage_mode, StorageMode::Json);
        assert_eq!(settings.default_tax_rate.percent(), dec!(12.5));
        assert_eq!(settings.next_invoice_number(), "BB-0001");
        assert_eq!(settings.business_info.name, "Acme");

        assert!(settings.set_value("default_tax_rate", "150").is_err());
        assert!(settings.set_value("invoice_counter", "0").is_err());
        assert!(settings.set_value("rounding_mode", "ROUND_HALF_EVEN").is_err());
        assert!(settings.set_value("nonsense", "1").is_err());
    }

    #[test]
    fn test_counter_advances() {
        let mut settings = Settings::default();
        settings.advance_invoice_counter().unwrap();
        assert_eq!(settings.next_invoice_number(), "INV-0002");
        assert_eq!(format_invoice_number("INV", 12345), "INV-12345");
    }
}
