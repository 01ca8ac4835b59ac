//! Sources of raw sheet rows.

use crate::error::{Error, Result};
use crate::model::RawSheet;

/// A workbook that can list its sheets and hand out their rows.
///
/// Implementations are shared between concurrent workers, so `read_rows`
/// takes `&self` and must tolerate being called for different sheets at
/// the same time.
pub trait SheetSource: Send + Sync + 'static {
    /// Names of all sheets in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Read every row of a sheet as text.
    fn read_rows(&self, sheet: &str) -> Result<RawSheet>;
}

/// Sheets already held in memory.
///
/// Useful when rows come from somewhere other than an XLSX file.
///
/// # Example
///
/// ```
/// use unsheet::extract::{InMemorySource, SheetSource};
///
/// let source = InMemorySource::new()
///     .with_sheet("People", vec![vec!["Name".to_string()], vec!["Bob".to_string()]]);
///
/// assert_eq!(source.sheet_names(), vec!["People"]);
/// assert_eq!(source.read_rows("People")?.len(), 2);
/// # Ok::<(), unsheet::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    sheets: Vec<(String, RawSheet)>,
}

impl InMemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet, replacing any sheet with the same name.
    pub fn with_sheet(mut self, name: impl Into<String>, rows: RawSheet) -> Self {
        let name = name.into();
        match self.sheets.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = rows,
            None => self.sheets.push((name, rows)),
        }
        self
    }
}

impl SheetSource for InMemorySource {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn read_rows(&self, sheet: &str) -> Result<RawSheet> {
        self.sheets
            .iter()
            .find(|(name, _)| name == sheet)
            .map(|(_, rows)| rows.clone())
            .ok_or_else(|| Error::SheetNotFound(sheet.to_string()))
    }
}
