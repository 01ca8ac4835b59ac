//! Output rendering for extracted records.
//!
//! # Example
//!
//! ```no_run
//! use unsheet::{parse_file, render::*, ParseOptions};
//!
//! let records = parse_file("workbook.xlsx", &ParseOptions::default())?;
//! let json = to_json(&records, JsonFormat::Pretty)?;
//! std::fs::write("output.json", json)?;
//! # Ok::<(), unsheet::Error>(())
//! ```

mod json;

pub use json::{to_json, to_json_default, JsonFormat};
