//! On-disk table layouts
//!
//! Two layouts encode the same logical schema:
//!
//! - **JSON Lines**: one JSON object per record, one record per line.
//! - **Columnar**: the table transposed into one vector per column, wrapped
//!   in a small header and encoded with `bincode`.
//!
//! Decimal columns are stored as their exact text in the columnar layout, so
//! no value passes through binary floating point on the way to disk.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{BillbookError, BillbookResult};

/// Version written into every columnar file header
pub const COLUMNAR_SCHEMA_VERSION: u32 = 1;

/// Header and payload of a columnar table file
#[derive(Debug, Serialize, Deserialize)]
pub struct ColumnarFile<C> {
    pub schema_version: u32,
    pub table: String,
    pub row_count: u64,
    pub columns: C,
}

/// Encode records as JSON Lines
pub fn encode_json_lines<T: Serialize>(rows: &[T]) -> BillbookResult<Vec<u8>> {
    let mut out = Vec::new();
    for row in rows {
        serde_json::to_writer(&mut out, row)?;
        out.push(b'\n');
    }
    Ok(out)
}

/// Decode JSON Lines, skipping blank lines
///
/// Errors name the 1-based line that failed.
pub fn decode_json_lines<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>, String> {
    let text = std::str::from_utf8(bytes).map_err(|e| format!("not valid UTF-8: {}", e))?;

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| format!("line {}: {}", index + 1, e))
        })
        .collect()
}

/// Encode a column set with its header
pub fn encode_columnar<C: Serialize>(
    table: &str,
    row_count: usize,
    columns: C,
) -> BillbookResult<Vec<u8>> {
    let file = ColumnarFile {
        schema_version: COLUMNAR_SCHEMA_VERSION,
        table: table.to_string(),
        row_count: row_count as u64,
        columns,
    };
    bincode::serialize(&file).map_err(BillbookError::from)
}

/// Decode a columnar file, checking its header against the expected table
pub fn decode_columnar<C: DeserializeOwned>(
    table: &str,
    bytes: &[u8],
) -> Result<(usize, C), String> {
    let file: ColumnarFile<C> = bincode::deserialize(bytes).map_err(|e| e.to_string())?;

    if file.schema_version > COLUMNAR_SCHEMA_VERSION {
        return Err(format!(
            "schema version {} is newer than supported version {}",
            file.schema_version, COLUMNAR_SCHEMA_VERSION
        ));
    }
    if file.table != table {
        return Err(format!(
            "file holds table '{}', expected '{}'",
            file.table, table
        ));
    }

    let row_count = usize::try_from(file.row_count)
        .map_err(|_| format!("row count {} is too large", file.row_count))?;
    Ok((row_count, file.columns))
}

/// Check that a column holds exactly one value per row
pub fn ensure_len<V>(column: &str, values: &[V], row_count: usize) -> Result<(), String> {
    if values.len() != row_count {
        return Err(format!(
            "column '{}' has {} values, expected {}",
            column,
            values.len(),
            row_count
        ));
    }
    Ok(())
}

/// Parse one cell of a decimal column
pub fn parse_decimal(column: &str, row: usize, text: &str) -> Result<Decimal, String> {
    Decimal::from_str(text)
        .map_err(|e| format!("column '{}' row {}: invalid decimal '{}': {}", column, row, text, e))
}

/// Parse one cell of an optional decimal column
pub fn parse_optional_decimal(
    column: &str,
    row: usize,
    text: Option<&str>,
) -> Result<Option<Decimal>, String> {
    text.map(|t| parse_decimal(column, row, t)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        sku: String,
        qty: u32,
    }

    #[test]
    fn test_json_lines_one_record_per_line() {
        let rows = vec![
            Row {
                sku: "A100".into(),
                qty: 1,
            },
            Row {
                sku: "B200".into(),
                qty: 2,
            },
        ];
        let bytes = encode_json_lines(&rows).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert_eq!(text.lines().count(), 2);

        let decoded: Vec<Row> = decode_json_lines(&bytes).unwrap();
        assert_eq!(decoded, rows);
    }

    #[test]
    fn test_json_lines_skips_blank_and_reports_line() {
        let input = b"{\"sku\":\"A\",\"qty\":1}\n\n{\"sku\":\"B\"}\n";
        let err = decode_json_lines::<Row>(input).unwrap_err();
        assert!(err.starts_with("line 3:"), "{}", err);

        let decoded: Vec<Row> = decode_json_lines(b"\n{\"sku\":\"A\",\"qty\":1}\n  \n").unwrap();
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn test_columnar_rejects_wrong_table() {
        let bytes = encode_columnar("inventory", 0, Vec::<String>::new()).unwrap();
        let err = decode_columnar::<Vec<String>>("invoices", &bytes).unwrap_err();
        assert!(err.contains("expected 'invoices'"));
    }

    #[test]
    fn test_columnar_rejects_garbage() {
        assert!(decode_columnar::<Vec<String>>("inventory", b"\xff\x00garbage").is_err());
    }

    #[test]
    fn test_ensure_len() {
        assert!(ensure_len("sku", &["a", "b"], 2).is_ok());
        let err = ensure_len("sku", &["a"], 2).unwrap_err();
        assert_eq!(err, "column 'sku' has 1 values, expected 2");
    }

    #[test]
    fn test_parse_decimal_cells() {
        assert_eq!(parse_decimal("base_price", 0, "12.50").unwrap(), dec!(12.50));
        assert!(parse_decimal("base_price", 0, "12,50").is_err());
        assert_eq!(parse_optional_decimal("size_mm", 0, None).unwrap(), None);
    }
}
