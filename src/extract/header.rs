//! Header row detection.
//!
//! Workbooks often carry a title, a date line or a blank spacer above the
//! real table. The detector walks the first rows of a sheet and picks the
//! first one that is dense enough to be a header and is followed by rows
//! that look like data.

use crate::model::RawRow;

/// Non-empty cells a row needs to count as a header or as a data row.
const MIN_FILLED_CELLS: usize = 3;

/// Rows examined below each header candidate.
const LOOKAHEAD_ROWS: usize = 5;

/// Data rows among the lookahead window needed to accept a candidate.
const MIN_DATA_ROWS: usize = 4;

/// Find the index of the header row within the first `scan_limit` rows.
///
/// A `scan_limit` of 0, or one larger than the sheet, scans every row.
/// Returns 0 when no candidate qualifies, so sparse sheets still use their
/// first row as the header.
///
/// # Example
///
/// ```
/// use unsheet::extract::detect_header_row;
///
/// let rows: Vec<Vec<String>> = [
///     vec!["Quarterly report"],
///     vec!["ID", "Name", "Amount"],
///     vec!["1", "Bob", "5"],
///     vec!["2", "Sue", "6"],
///     vec!["3", "Al", "7"],
///     vec!["4", "Meg", "8"],
/// ]
/// .iter()
/// .map(|r| r.iter().map(|c| c.to_string()).collect())
/// .collect();
///
/// assert_eq!(detect_header_row(&rows, 10), 1);
/// ```
pub fn detect_header_row(rows: &[RawRow], scan_limit: usize) -> usize {
    let scan_limit = if scan_limit == 0 || scan_limit > rows.len() {
        rows.len()
    } else {
        scan_limit
    };

    for (idx, candidate) in rows.iter().enumerate().take(scan_limit) {
        if filled_cells(candidate) < MIN_FILLED_CELLS {
            continue;
        }

        let window_end = rows.len().min(idx + 1 + LOOKAHEAD_ROWS);
        let data_rows = rows[idx + 1..window_end]
            .iter()
            .filter(|row| filled_cells(row) >= MIN_FILLED_CELLS)
            .count();

        if data_rows >= MIN_DATA_ROWS {
            return idx;
        }
    }

    0
}

/// Count cells that are non-empty after trimming.
fn filled_cells(row: &[String]) -> usize {
    row.iter().filter(|cell| !cell.trim().is_empty()).count()
}
