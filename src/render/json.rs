//! JSON renderer implementation.

use crate::error::Result;
use crate::model::WorkbookRecords;

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Render extracted records as JSON.
///
/// The output is an object mapping each processed sheet name to
/// `{"headers": [...], "records": [...], "recordCount": n}`. Skipped sheets
/// do not appear.
pub fn to_json(records: &WorkbookRecords, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(&records.sheets)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(&records.sheets)?,
    };
    Ok(json)
}

/// Render extracted records as pretty-printed JSON.
pub fn to_json_default(records: &WorkbookRecords) -> Result<String> {
    to_json(records, JsonFormat::Pretty)
}
