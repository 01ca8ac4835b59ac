//! Workbook-level aggregate of sheet results.

use super::SheetResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Why a requested sheet has no entry in [`WorkbookRecords::sheets`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "message", rename_all = "camelCase")]
pub enum SkipReason {
    /// The sheet has no rows
    Empty,
    /// The reader failed to return the sheet's rows
    ReadFailed(String),
    /// The worker processing the sheet panicked
    WorkerFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Empty => write!(f, "sheet is empty"),
            SkipReason::ReadFailed(msg) => write!(f, "read failed: {}", msg),
            SkipReason::WorkerFailed(msg) => write!(f, "worker failed: {}", msg),
        }
    }
}

/// Records extracted from a workbook.
///
/// `sheets` holds one entry per successfully processed sheet. Sheets that
/// were requested but produced nothing are listed in `skipped` instead, so
/// callers can tell an empty sheet from a read error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkbookRecords {
    /// Sheet name to extracted records
    pub sheets: BTreeMap<String, SheetResult>,

    /// Sheet name to the reason it was left out
    pub skipped: BTreeMap<String, SkipReason>,
}

impl WorkbookRecords {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the result for a sheet.
    pub fn get(&self, sheet: &str) -> Option<&SheetResult> {
        self.sheets.get(sheet)
    }

    /// Total number of records across all sheets.
    pub fn total_records(&self) -> usize {
        self.sheets.values().map(|s| s.record_count).sum()
    }

    /// Record a processed sheet.
    pub(crate) fn insert(&mut self, sheet: String, result: SheetResult) {
        self.sheets.insert(sheet, result);
    }

    /// Record a skipped sheet.
    pub(crate) fn skip(&mut self, sheet: String, reason: SkipReason) {
        self.skipped.insert(sheet, reason);
    }
}
