//! XLSX (Excel) workbook reader.
//!
//! This module reads Microsoft Excel workbooks in the Office Open XML
//! (.xlsx) format into raw text rows. Cells keep their stored text, except
//! date-formatted numbers, which become ISO 8601 dates.
//!
//! # Example
//!
//! ```no_run
//! use unsheet::xlsx::XlsxReader;
//!
//! let reader = XlsxReader::open("spreadsheet.xlsx")?;
//!
//! for name in reader.sheet_names() {
//!     let rows = reader.read_sheet(name)?;
//!     println!("{}: {} rows", name, rows.len());
//! }
//! # Ok::<(), unsheet::Error>(())
//! ```

mod reader;
mod shared_strings;
mod styles;
mod worksheet;

pub use reader::XlsxReader;
pub use styles::{serial_to_date, CellStyles};
pub use worksheet::column_index;
