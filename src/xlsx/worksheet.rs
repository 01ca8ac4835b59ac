//! Worksheet row extraction.

use super::shared_strings::SharedStrings;
use super::styles::CellStyles;
use crate::error::{Error, Result};
use crate::model::{RawRow, RawSheet};

/// Convert the column letters of a cell reference ("AB12") to a 0-based index.
pub fn column_index(cell_ref: &str) -> Option<usize> {
    let letters: Vec<u8> = cell_ref
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .map(|b| b.to_ascii_uppercase())
        .collect();
    if letters.is_empty() {
        return None;
    }

    letters
        .iter()
        .try_fold(0usize, |acc, &b| {
            acc.checked_mul(26)?.checked_add(usize::from(b - b'A') + 1)
        })
        .map(|n| n - 1)
}

/// Cell being assembled while reading a `<c>` element.
#[derive(Debug, Default)]
struct PendingCell {
    column: Option<usize>,
    cell_type: Option<String>,
    style: Option<usize>,
    value: String,
}

/// Read a worksheet into a matrix of text cells.
///
/// Rows and cells are positioned by their references: skipped rows become
/// empty rows and skipped cells become empty strings. Trailing empty cells
/// of each row and trailing empty rows are dropped. Values are kept as their
/// stored text, except numbers with a date or time format, which are
/// rendered as ISO 8601 text.
pub fn read_rows(
    xml: &str,
    shared_strings: &SharedStrings,
    styles: &CellStyles,
) -> Result<RawSheet> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut rows: RawSheet = Vec::new();
    let mut buf = Vec::new();
    let mut current_row: Option<RawRow> = None;
    let mut cell: Option<PendingCell> = None;
    let mut in_value = false;
    let mut in_inline = false;
    let mut phonetic_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(ref e)) => match e.local_name().as_ref() {
                b"row" => {
                    pad_to_row(&mut rows, row_number(e));
                    current_row = Some(Vec::new());
                }
                b"c" if current_row.is_some() => {
                    let mut pending = PendingCell::default();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"r" => {
                                pending.column = column_index(&String::from_utf8_lossy(&attr.value))
                            }
                            b"t" => {
                                pending.cell_type =
                                    Some(String::from_utf8_lossy(&attr.value).to_string())
                            }
                            b"s" => {
                                pending.style = String::from_utf8_lossy(&attr.value).parse().ok()
                            }
                            _ => {}
                        }
                    }
                    cell = Some(pending);
                }
                b"v" if cell.is_some() => in_value = true,
                b"is" if cell.is_some() => in_inline = true,
                b"rPh" if in_inline => phonetic_depth += 1,
                b"t" if in_inline && phonetic_depth == 0 => in_value = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Empty(ref e)) => {
                // <row r="7"/> still occupies its position.
                if e.local_name().as_ref() == b"row" {
                    pad_to_row(&mut rows, row_number(e));
                    rows.push(Vec::new());
                }
            }
            Ok(quick_xml::events::Event::Text(ref e)) => {
                if let (true, Some(pending)) = (in_value, cell.as_mut()) {
                    let text = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                    pending.value.push_str(&text);
                }
            }
            Ok(quick_xml::events::Event::CData(ref e)) => {
                if let (true, Some(pending)) = (in_value, cell.as_mut()) {
                    pending.value.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(quick_xml::events::Event::End(ref e)) => match e.local_name().as_ref() {
                b"row" => {
                    if let Some(mut row) = current_row.take() {
                        while row.last().is_some_and(|c| c.is_empty()) {
                            row.pop();
                        }
                        rows.push(row);
                    }
                }
                b"c" => {
                    if let (Some(pending), Some(row)) = (cell.take(), current_row.as_mut()) {
                        let value = resolve_cell_value(&pending, shared_strings, styles);
                        place_cell(row, pending.column, value);
                    }
                    in_value = false;
                    in_inline = false;
                    phonetic_depth = 0;
                }
                b"v" | b"t" => in_value = false,
                b"is" => in_inline = false,
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    while rows.last().is_some_and(|r| r.is_empty()) {
        rows.pop();
    }

    Ok(rows)
}

/// 1-based row number from the `r` attribute of a row element.
fn row_number(e: &quick_xml::events::BytesStart<'_>) -> Option<usize> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"r")
        .and_then(|attr| String::from_utf8_lossy(&attr.value).trim().parse().ok())
}

/// Insert empty rows so the next row lands at `row_number`.
fn pad_to_row(rows: &mut RawSheet, row_number: Option<usize>) {
    if let Some(number) = row_number {
        while rows.len() + 1 < number {
            rows.push(Vec::new());
        }
    }
}

/// Put a value at its column, padding skipped columns with empty strings.
fn place_cell(row: &mut RawRow, column: Option<usize>, value: String) {
    let column = column.unwrap_or(row.len());
    if column < row.len() {
        row[column] = value;
    } else {
        row.resize(column, String::new());
        row.push(value);
    }
}

/// Resolve a raw cell value to its display text based on type and style.
fn resolve_cell_value(cell: &PendingCell, shared: &SharedStrings, styles: &CellStyles) -> String {
    let value = cell.value.as_str();
    match cell.cell_type.as_deref() {
        Some("s") => match value.trim().parse::<usize>() {
            Ok(idx) => shared.get(idx).unwrap_or_default().to_string(),
            Err(_) => value.to_string(),
        },
        Some("b") => match value.trim() {
            "1" => "TRUE".to_string(),
            "0" => "FALSE".to_string(),
            other => other.to_string(),
        },
        None | Some("n") => cell
            .style
            .and_then(|style| styles.format_number(style, value))
            .unwrap_or_else(|| value.to_string()),
        // Errors, formula strings and ISO dates (t="d") keep their stored text.
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> SharedStrings {
        SharedStrings::parse("<sst><si><t>Name</t></si><si><t>Bob</t></si></sst>").unwrap()
    }

    fn read(xml: &str) -> Result<RawSheet> {
        read_rows(xml, &shared(), &CellStyles::default())
    }

    fn date_styles() -> CellStyles {
        CellStyles::parse(
            r#"<styleSheet>
                <numFmts count="1"><numFmt numFmtId="164" formatCode="dd/mm/yyyy"/></numFmts>
                <cellXfs count="3"><xf numFmtId="0"/><xf numFmtId="14"/><xf numFmtId="164"/></cellXfs>
            </styleSheet>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A1"), Some(0));
        assert_eq!(column_index("Z9"), Some(25));
        assert_eq!(column_index("AA10"), Some(26));
        assert_eq!(column_index("ab3"), Some(27));
        assert_eq!(column_index("XFD1048576"), Some(16383));
        assert_eq!(column_index("12"), None);
    }

    #[test]
    fn test_read_rows_with_types() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="inlineStr"><is><t>Flag</t></is></c><c r="C1"><v>3.5</v></c></row>
            <row r="2"><c r="A2" t="s"><v>1</v></c><c r="B2" t="b"><v>1</v></c><c r="C2" t="e"><v>#DIV/0!</v></c></row>
            <row r="3"><c r="A3" t="str"><f>A2</f><v>Bob</v></c></row>
        </sheetData></worksheet>"#;

        let rows = read(xml).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["Name", "Flag", "3.5"],
                vec!["Bob", "TRUE", "#DIV/0!"],
                vec!["Bob"],
            ]
        );
    }

    #[test]
    fn test_gaps_are_padded() {
        let xml = r#"<worksheet><sheetData>
            <row r="2"><c r="B2"><v>1</v></c><c r="D2"><v>2</v></c></row>
            <row r="4"/>
            <row r="5"><c r="A5"><v>x</v></c></row>
        </sheetData></worksheet>"#;

        let rows = read(xml).unwrap();
        assert_eq!(rows.len(), 5);
        assert!(rows[0].is_empty());
        assert_eq!(rows[1], vec!["", "1", "", "2"]);
        assert!(rows[2].is_empty());
        assert!(rows[3].is_empty());
        assert_eq!(rows[4], vec!["x"]);
    }

    #[test]
    fn test_trailing_empties_dropped() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1"><v>a</v></c><c r="B1" t="inlineStr"><is><t></t></is></c><c r="C1"/></row>
            <row r="2"><c r="A2"/></row>
            <row r="3"/>
        </sheetData></worksheet>"#;

        let rows = read(xml).unwrap();
        assert_eq!(rows, vec![vec!["a"]]);
    }

    #[test]
    fn test_cells_without_references() {
        let xml = r#"<worksheet><sheetData>
            <row><c><v>a</v></c><c><v>b</v></c></row>
            <row><c><v>c</v></c></row>
        </sheetData></worksheet>"#;

        let rows = read(xml).unwrap();
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn test_inline_string_whitespace_and_phonetics() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="inlineStr"><is><r><t xml:space="preserve"> Bob </t></r><rPh><t>ボブ</t></rPh></is></c></row>
        </sheetData></worksheet>"#;

        let rows = read(xml).unwrap();
        assert_eq!(rows, vec![vec![" Bob "]]);
    }

    #[test]
    fn test_date_cells_rendered() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" s="1"><v>45306</v></c><c r="B1" s="2" t="n"><v>45306.5</v></c><c r="C1" s="0"><v>45306</v></c></row>
            <row r="2"><c r="A2" s="1" t="s"><v>1</v></c><c r="B2" s="2" t="d"><v>2024-01-15</v></c><c r="C2" s="7"><v>12</v></c></row>
        </sheetData></worksheet>"#;

        let rows = read_rows(xml, &shared(), &date_styles()).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["2024-01-15", "2024-01-15T12:00:00", "45306"],
                vec!["Bob", "2024-01-15", "12"],
            ]
        );
    }

    #[test]
    fn test_prefixed_namespace() {
        let xml = r#"<x:worksheet xmlns:x="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><x:sheetData>
            <x:row r="1"><x:c r="A1" t="s"><x:v>0</x:v></x:c><x:c r="B1" t="inlineStr"><x:is><x:t>Flag</x:t></x:is></x:c></x:row>
            <x:row r="3"><x:c r="B3"><x:v>7</x:v></x:c></x:row>
        </x:sheetData></x:worksheet>"#;

        let rows = read(xml).unwrap();
        assert_eq!(rows, vec![vec!["Name", "Flag"], vec![], vec!["", "7"]]);
    }

    #[test]
    fn test_empty_sheet() {
        let rows = read("<worksheet><sheetData/></worksheet>").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_malformed_xml() {
        assert!(read("<worksheet><sheetData><row></sheetData>").is_err());
    }
}
