//! Custom error types for Billbook
//!
//! Every fallible operation in the library returns [`BillbookResult`]. The
//! `billbook` binary flattens each command's result into an [`Outcome`]
//! (success flag plus message) and reports a failure as one line on stderr
//! with a failing exit status, never a panic or a backtrace.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for Billbook operations
#[derive(Error, Debug)]
pub enum BillbookError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Binary (columnar) encoding errors
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A stored table exists but could not be read back
    #[error("Failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl BillbookError {
    /// Create a "not found" error for inventory items
    pub fn item_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Item",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for invoices
    pub fn invoice_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Invoice",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for backups
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error came from reading a present but unreadable file
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

impl From<std::io::Error> for BillbookError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BillbookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<bincode::Error> for BillbookError {
    fn from(err: bincode::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<csv::Error> for BillbookError {
    fn from(err: csv::Error) -> Self {
        Self::Import(err.to_string())
    }
}

/// Result type alias for Billbook operations
pub type BillbookResult<T> = Result<T, BillbookError>;

/// Flat outcome of an operation: a success flag and a human-readable message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

impl Outcome {
    /// A successful outcome
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A failed outcome
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    /// Flatten a result, describing the success value with `describe`
    pub fn from_result<T>(
        result: &BillbookResult<T>,
        describe: impl FnOnce(&T) -> String,
    ) -> Self {
        match result {
            Ok(value) => Self::ok(describe(value)),
            Err(err) => Self::failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BillbookError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = BillbookError::item_not_found("A100");
        assert_eq!(err.to_string(), "Item not found: A100");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_parse_error_names_path() {
        let err = BillbookError::Parse {
            path: PathBuf::from("data/inventory.json"),
            reason: "line 3: expected value".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse data/inventory.json: line 3: expected value"
        );
        assert!(err.is_parse());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BillbookError = io_err.into();
        assert!(matches!(err, BillbookError::Io(_)));
    }

    #[test]
    fn test_outcome_from_result() {
        let ok: BillbookResult<usize> = Ok(3);
        let outcome = Outcome::from_result(&ok, |n| format!("Saved {} rows", n));
        assert_eq!(outcome, Outcome::ok("Saved 3 rows"));

        let err: BillbookResult<usize> = Err(BillbookError::invoice_not_found("INV-0009"));
        let outcome = Outcome::from_result(&err, |n| format!("Saved {} rows", n));
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Invoice not found: INV-0009");
    }
}
