//! Record model for extracted workbooks.
//!
//! Readers produce [`RawSheet`]s, the extractor turns each one into a
//! [`SheetResult`], and the processor gathers them into [`WorkbookRecords`].

mod sheet;
mod workbook;

pub use sheet::*;
pub use workbook::*;
