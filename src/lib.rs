//! # unsheet
//!
//! Concurrent extraction of header-keyed records from Excel workbooks.
//!
//! Each sheet becomes a list of records keyed by its header row. The header
//! row can be found automatically when a sheet starts with titles or blank
//! lines, and headers can be filtered, renamed and trimmed. Sheets are
//! processed in parallel under an optional concurrency bound.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unsheet::{parse_file, render, ParseOptions};
//!
//! let options = ParseOptions::new()
//!     .with_header_detection(true)
//!     .with_trim_space(true)
//!     .with_skip_empty(true)
//!     .with_max_concurrent_sheets(4);
//!
//! let records = parse_file("report.xlsx", &options)?;
//! for (sheet, result) in &records.sheets {
//!     println!("{}: {} records", sheet, result.record_count);
//! }
//! for (sheet, reason) in &records.skipped {
//!     println!("{} skipped: {}", sheet, reason);
//! }
//!
//! let json = render::to_json_default(&records)?;
//! # Ok::<(), unsheet::Error>(())
//! ```
//!
//! ## Other Sources
//!
//! Anything implementing [`SheetSource`] can be processed, for example rows
//! already held in memory:
//!
//! ```
//! use std::sync::Arc;
//! use unsheet::extract::{process_workbook, InMemorySource};
//! use unsheet::ParseOptions;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let source = InMemorySource::new().with_sheet(
//!     "People",
//!     vec![vec!["Name".into()], vec!["Bob".into()]],
//! );
//! let records = process_workbook(Arc::new(source), &ParseOptions::default()).await;
//! assert_eq!(records.sheets["People"].records[0]["Name"], "Bob");
//! # }
//! ```

pub mod container;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod options;
pub mod render;
pub mod xlsx;

// Re-exports
pub use container::OoxmlContainer;
pub use detect::{detect_format_from_bytes, detect_format_from_path, FormatType};
pub use error::{Error, Result};
pub use extract::{process_workbook, SheetSource};
pub use model::{RawRow, RawSheet, Record, SheetResult, SkipReason, WorkbookRecords};
pub use options::ParseOptions;
pub use xlsx::XlsxReader;

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extract records from an XLSX file.
///
/// The workbook is opened before any sheet is processed; failing to open it
/// is the only error returned. Problems with individual sheets are reported
/// through [`WorkbookRecords::skipped`].
///
/// This blocks the calling thread on an internal Tokio runtime. Called from
/// inside a Tokio runtime it returns [`Error::Runtime`] instead; use
/// [`parse_file_async`] from async code.
///
/// # Example
///
/// ```no_run
/// use unsheet::{parse_file, ParseOptions};
///
/// let records = parse_file("workbook.xlsx", &ParseOptions::default())?;
/// println!("Sheets: {}", records.sheets.len());
/// # Ok::<(), unsheet::Error>(())
/// ```
pub fn parse_file(path: impl AsRef<Path>, options: &ParseOptions) -> Result<WorkbookRecords> {
    let reader = XlsxReader::open(path)?;
    run_blocking(reader, options)
}

/// Extract records from XLSX bytes.
///
/// Like [`parse_file`], this must not be called from inside a Tokio runtime.
///
/// # Example
///
/// ```no_run
/// use unsheet::{parse_bytes, ParseOptions};
///
/// let data = std::fs::read("workbook.xlsx")?;
/// let records = parse_bytes(&data, &ParseOptions::default())?;
/// # Ok::<(), unsheet::Error>(())
/// ```
pub fn parse_bytes(data: &[u8], options: &ParseOptions) -> Result<WorkbookRecords> {
    let reader = XlsxReader::from_bytes(data.to_vec())?;
    run_blocking(reader, options)
}

/// Extract records from an XLSX file inside an existing Tokio runtime.
///
/// The runtime must be multi-threaded.
pub async fn parse_file_async(
    path: impl Into<PathBuf>,
    options: &ParseOptions,
) -> Result<WorkbookRecords> {
    let path = path.into();
    let reader = tokio::task::spawn_blocking(move || XlsxReader::open(path))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))??;
    Ok(process_workbook(Arc::new(reader), options).await)
}

/// Process a reader on a dedicated multi-threaded runtime.
fn run_blocking(reader: XlsxReader, options: &ParseOptions) -> Result<WorkbookRecords> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(Error::Runtime(
            "blocking parse called from within a Tokio runtime; use parse_file_async".to_string(),
        ));
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("unsheet-worker")
        .build()?;
    Ok(runtime.block_on(process_workbook(Arc::new(reader), options)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bytes_rejects_non_zip() {
        let result = parse_bytes(b"not a workbook", &ParseOptions::default());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[tokio::test]
    async fn test_blocking_parse_inside_runtime() {
        let mut buffer = Vec::new();
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buffer));
        zip.start_file("xl/workbook.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        std::io::Write::write_all(&mut zip, b"<workbook><sheets/></workbook>").unwrap();
        zip.finish().unwrap();

        let result = parse_bytes(&buffer, &ParseOptions::default());
        assert!(matches!(result, Err(Error::Runtime(_))));
    }

    #[test]
    fn test_parse_file_missing() {
        let result = parse_file("does-not-exist.xlsx", &ParseOptions::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
