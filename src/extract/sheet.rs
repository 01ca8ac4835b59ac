//! Single-sheet extraction.

use super::header::detect_header_row;
use super::projector::ColumnPlan;
use crate::model::{RawRow, SheetResult};
use crate::options::ParseOptions;

/// Locate the header row of a sheet according to the options.
pub fn header_row_index(rows: &[RawRow], options: &ParseOptions) -> usize {
    if options.header_row_auto_detect {
        detect_header_row(rows, options.effective_scan_limit())
    } else {
        0
    }
}

/// Extract the records of one sheet.
///
/// Returns `None` for a sheet without rows. Rows above the header row are
/// ignored; rows below it are projected in order and rows that yield no
/// fields are dropped.
pub fn extract_sheet(sheet: &str, rows: &[RawRow], options: &ParseOptions) -> Option<SheetResult> {
    if rows.is_empty() {
        return None;
    }

    let header_idx = header_row_index(rows, options);
    let headers = rows[header_idx].clone();
    let plan = ColumnPlan::new(&headers, options);

    let records: Vec<_> = rows[header_idx + 1..]
        .iter()
        .filter_map(|row| plan.project(row))
        .collect();

    log::debug!(
        "sheet {}: header at row {}, {} of {} data rows kept",
        sheet,
        header_idx,
        records.len(),
        rows.len() - header_idx - 1
    );

    Some(SheetResult::new(headers, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<RawRow> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn report() -> Vec<RawRow> {
        rows(&[
            &["a", "b"],
            &["", "", ""],
            &[" ID ", "Name", "Amount"],
            &["1", "Bob", "5"],
            &["2", "Sue", "6"],
            &["3", "Al", "7"],
            &["4", "Meg", "8"],
            &["5", "Cid", "9"],
        ])
    }

    #[test]
    fn test_empty_sheet_yields_nothing() {
        assert!(extract_sheet("Empty", &[], &ParseOptions::default()).is_none());
    }

    #[test]
    fn test_auto_detect_off_uses_first_row() {
        let opts = ParseOptions::new().with_header_detection(false);
        let sheet = report();
        assert_eq!(header_row_index(&sheet, &opts), 0);

        let result = extract_sheet("Report", &sheet, &opts).unwrap();
        assert_eq!(result.headers, vec!["a", "b"]);
        assert_eq!(result.record_count, 7);
        assert_eq!(result.records[0]["a"], "");
        assert_eq!(result.records[1]["a"], " ID ");
        assert_eq!(result.records[1]["b"], "Name");
    }

    #[test]
    fn test_auto_detect_finds_header() {
        let opts = ParseOptions::new()
            .with_header_detection(true)
            .with_trim_space(true);
        let result = extract_sheet("Report", &report(), &opts).unwrap();

        // Headers are returned verbatim.
        assert_eq!(result.headers, vec![" ID ", "Name", "Amount"]);
        assert_eq!(result.record_count, 5);
        assert_eq!(result.records[0]["ID"], "1");
        assert_eq!(result.records[4]["Name"], "Cid");
    }

    #[test]
    fn test_rows_without_fields_are_dropped() {
        let opts = ParseOptions::new()
            .with_trim_space(true)
            .with_skip_empty(true);
        let sheet = rows(&[&["Name", "Amount"], &[" Bob ", "  "], &["", ""], &["Sue", "6"]]);
        let result = extract_sheet("S", &sheet, &opts).unwrap();

        assert_eq!(result.record_count, 2);
        assert_eq!(result.records[0].len(), 1);
        assert_eq!(result.records[0]["Name"], "Bob");
        assert_eq!(result.records[1]["Amount"], "6");
    }

    #[test]
    fn test_header_only_sheet() {
        let result = extract_sheet("S", &rows(&[&["A", "B"]]), &ParseOptions::default()).unwrap();
        assert_eq!(result.headers, vec!["A", "B"]);
        assert!(result.is_empty());
        assert_eq!(result.record_count, 0);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let opts = ParseOptions::new()
            .with_header_detection(true)
            .with_trim_space(true)
            .with_skip_empty(true)
            .with_header_rename("Amount", "amt");
        let sheet = report();

        let first = extract_sheet("Report", &sheet, &opts).unwrap();
        let second = extract_sheet("Report", &sheet, &opts).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
