//! Extraction options configuration.

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Rows scanned for a header when no scan limit is configured.
pub const DEFAULT_SCAN_LIMIT: usize = 10;

/// Options controlling which sheets are read and how rows become records.
///
/// Options can be built in code with the `with_*` methods or loaded from a
/// JSON document using camelCase keys (`sheetNames`, `headerFilter`,
/// `headerMap`, `trimSpace`, `skipEmpty`, `headerRowAutoDetect`,
/// `headerRowScanLimit`, `maxConcurrentSheets`). Missing keys take their
/// default values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    /// Sheets to process (empty = every sheet in the workbook)
    pub sheet_names: Vec<String>,

    /// Headers to keep, matched case-insensitively (empty = keep all)
    pub header_filter: Vec<String>,

    /// Exact header name to output key renames
    pub header_map: HashMap<String, String>,

    /// Trim whitespace from headers and values
    pub trim_space: bool,

    /// Omit fields whose value is empty
    pub skip_empty: bool,

    /// Search for the header row instead of assuming row 0
    pub header_row_auto_detect: bool,

    /// Rows to scan during header detection (0 = [`DEFAULT_SCAN_LIMIT`])
    #[serde(deserialize_with = "non_positive_as_zero")]
    pub header_row_scan_limit: usize,

    /// Sheets processed at once (0 = unbounded)
    #[serde(deserialize_with = "non_positive_as_zero")]
    pub max_concurrent_sheets: usize,
}

impl ParseOptions {
    /// Create new options with everything disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Restrict processing to the given sheets.
    pub fn with_sheets<I, S>(mut self, sheets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sheet_names = sheets.into_iter().map(Into::into).collect();
        self
    }

    /// Keep only the given headers.
    pub fn with_header_filter<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header_filter = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Rename a header in the output records.
    pub fn with_header_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.header_map.insert(from.into(), to.into());
        self
    }

    /// Trim whitespace from headers and values.
    pub fn with_trim_space(mut self, trim: bool) -> Self {
        self.trim_space = trim;
        self
    }

    /// Omit empty fields.
    pub fn with_skip_empty(mut self, skip: bool) -> Self {
        self.skip_empty = skip;
        self
    }

    /// Enable header row detection.
    pub fn with_header_detection(mut self, detect: bool) -> Self {
        self.header_row_auto_detect = detect;
        self
    }

    /// Set how many rows header detection scans.
    pub fn with_scan_limit(mut self, limit: usize) -> Self {
        self.header_row_scan_limit = limit;
        self
    }

    /// Bound the number of sheets processed at once.
    pub fn with_max_concurrent_sheets(mut self, max: usize) -> Self {
        self.max_concurrent_sheets = max;
        self
    }

    /// Scan limit with the default applied.
    pub fn effective_scan_limit(&self) -> usize {
        if self.header_row_scan_limit == 0 {
            DEFAULT_SCAN_LIMIT
        } else {
            self.header_row_scan_limit
        }
    }
}

/// Read a signed count, treating zero and negative values as unset (0).
fn non_positive_as_zero<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    Ok(usize::try_from(value.max(0)).unwrap_or(usize::MAX))
}
