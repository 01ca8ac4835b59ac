//! Per-sheet model structures.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of text cells as read from a sheet.
///
/// A row may be shorter than the header row; missing trailing cells are
/// absent rather than empty strings.
pub type RawRow = Vec<String>;

/// All rows of a sheet in document order.
pub type RawSheet = Vec<RawRow>;

/// A single output record, keyed by (possibly renamed) header names.
pub type Record = BTreeMap<String, String>;

/// Records extracted from one sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetResult {
    /// The header row exactly as found, untrimmed and unfiltered
    pub headers: Vec<String>,

    /// Records in original row order
    pub records: Vec<Record>,

    /// Number of records, always equal to `records.len()`
    pub record_count: usize,
}

impl SheetResult {
    /// Create a result from a header row and its records.
    pub fn new(headers: Vec<String>, records: Vec<Record>) -> Self {
        let record_count = records.len();
        Self {
            headers,
            records,
            record_count,
        }
    }

    /// Check if the sheet produced no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_count_matches() {
        let mut record = Record::new();
        record.insert("Name".to_string(), "Bob".to_string());

        let result = SheetResult::new(vec!["Name".to_string()], vec![record.clone(), record]);
        assert_eq!(result.record_count, 2);
        assert_eq!(result.record_count, result.records.len());
        assert!(!result.is_empty());
    }

    #[test]
    fn test_serialized_field_names() {
        let result = SheetResult::new(vec!["A".to_string()], Vec::new());
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"headers":["A"],"records":[],"recordCount":0}"#);
    }
}
