//! Record extraction pipeline.
//!
//! Rows flow from a [`SheetSource`] through header detection and column
//! projection into per-sheet [`SheetResult`](crate::model::SheetResult)s,
//! with sheets processed concurrently.
//!
//! # Example
//!
//! ```
//! use unsheet::extract::extract_sheet;
//! use unsheet::ParseOptions;
//!
//! let rows: Vec<Vec<String>> = vec![
//!     vec!["Name".into(), "Amount".into(), "Note".into()],
//!     vec!["Bob".into(), "5".into(), "skip-me".into()],
//! ];
//! let options = ParseOptions::new()
//!     .with_header_filter(["name", "amount"])
//!     .with_header_rename("Amount", "amt");
//!
//! let result = extract_sheet("Sales", &rows, &options).unwrap();
//! assert_eq!(result.records[0]["Name"], "Bob");
//! assert_eq!(result.records[0]["amt"], "5");
//! ```

mod header;
mod processor;
mod projector;
mod sheet;
mod source;

pub use header::detect_header_row;
pub use processor::{process_workbook, AdmissionGate};
pub use projector::{ColumnPlan, HeaderFilter};
pub use sheet::{extract_sheet, header_row_index};
pub use source::{InMemorySource, SheetSource};
