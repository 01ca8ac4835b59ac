//! Projection of data rows onto header-keyed records.

use crate::model::{RawRow, Record};
use crate::options::ParseOptions;
use std::collections::HashSet;

/// Case-insensitive set of header names to keep.
#[derive(Debug, Clone, Default)]
pub struct HeaderFilter {
    /// Lowercased names; empty keeps everything
    names: HashSet<String>,
}

impl HeaderFilter {
    /// Build a filter from header names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names.into_iter().map(|n| n.as_ref().to_lowercase()).collect(),
        }
    }

    /// Check whether a header passes the filter.
    pub fn allows(&self, header: &str) -> bool {
        self.names.is_empty() || self.names.contains(&header.to_lowercase())
    }
}

/// One retained header column.
#[derive(Debug, Clone)]
struct Column {
    index: usize,
    key: String,
}

/// The retained columns of a sheet and the keys they are written under.
///
/// The plan is built once from the header row and then applied to every
/// data row of the sheet. Columns dropped by the header filter are never
/// read.
#[derive(Debug, Clone)]
pub struct ColumnPlan {
    /// Retained columns in ascending index order
    columns: Vec<Column>,
    trim_space: bool,
    skip_empty: bool,
}

impl ColumnPlan {
    /// Build a plan from a header row.
    pub fn new(header_row: &[String], options: &ParseOptions) -> Self {
        let filter = HeaderFilter::new(&options.header_filter);
        let columns = header_row
            .iter()
            .enumerate()
            .filter_map(|(index, header)| {
                let header = if options.trim_space {
                    header.trim()
                } else {
                    header.as_str()
                };
                if !filter.allows(header) {
                    return None;
                }
                let key = options
                    .header_map
                    .get(header)
                    .cloned()
                    .unwrap_or_else(|| header.to_string());
                Some(Column { index, key })
            })
            .collect();

        Self {
            columns,
            trim_space: options.trim_space,
            skip_empty: options.skip_empty,
        }
    }

    /// Number of retained columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if every column was filtered out.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Output keys in column order (may repeat when renames collide).
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    /// Turn one data row into a record.
    ///
    /// Returns `None` when no field survives, in which case the row is
    /// dropped from the output. When two columns share an output key the
    /// later column wins.
    pub fn project(&self, row: &RawRow) -> Option<Record> {
        let mut record = Record::new();

        for column in &self.columns {
            let Some(value) = row.get(column.index) else {
                continue;
            };
            let value = if self.trim_space {
                value.trim()
            } else {
                value.as_str()
            };
            if self.skip_empty && value.is_empty() {
                continue;
            }
            record.insert(column.key.clone(), value.to_string());
        }

        if record.is_empty() {
            None
        } else {
            Some(record)
        }
    }
}
