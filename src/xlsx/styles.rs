//! Number formats from xl/styles.xml, used to render date cells.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Days from 1899-12-30 (the serial epoch) to 1970-01-01.
const SERIAL_EPOCH_OFFSET: i64 = 25_569;

/// Part of styles.xml being read.
#[derive(Debug, Clone, Copy)]
enum Section {
    NumFmts,
    CellXfs,
    Other,
}

/// Cell style table mapping a cell's `s` index to its number format.
#[derive(Debug, Clone, Default)]
pub struct CellStyles {
    /// Custom formats declared in `<numFmts>`: numFmtId -> formatCode
    custom_formats: HashMap<u32, String>,
    /// numFmtId of each `<xf>` in `<cellXfs>`, indexed by style
    cell_formats: Vec<u32>,
}

impl CellStyles {
    /// Parse the style table from styles.xml content.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut styles = Self::default();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut section = Section::Other;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"numFmts" => section = Section::NumFmts,
                    b"cellXfs" => section = Section::CellXfs,
                    _ => styles.read_element(e, section)?,
                },
                Ok(quick_xml::events::Event::Empty(ref e)) => styles.read_element(e, section)?,
                Ok(quick_xml::events::Event::End(ref e)) => {
                    if matches!(e.local_name().as_ref(), b"numFmts" | b"cellXfs") {
                        section = Section::Other;
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(styles)
    }

    /// Record a `<numFmt>` or `<xf>` element found inside its section.
    fn read_element(
        &mut self,
        e: &quick_xml::events::BytesStart<'_>,
        section: Section,
    ) -> Result<()> {
        match (section, e.local_name().as_ref()) {
            (Section::NumFmts, b"numFmt") => {
                let mut id = None;
                let mut code = String::new();
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"numFmtId" => id = String::from_utf8_lossy(&attr.value).parse().ok(),
                        b"formatCode" => {
                            code = attr
                                .unescape_value()
                                .map_err(|e| Error::XmlParse(e.to_string()))?
                                .to_string();
                        }
                        _ => {}
                    }
                }
                if let Some(id) = id {
                    self.custom_formats.insert(id, code);
                }
            }
            (Section::CellXfs, b"xf") => {
                let id = e
                    .attributes()
                    .flatten()
                    .find(|attr| attr.key.as_ref() == b"numFmtId")
                    .and_then(|attr| String::from_utf8_lossy(&attr.value).parse().ok())
                    .unwrap_or(0);
                self.cell_formats.push(id);
            }
            _ => {}
        }
        Ok(())
    }

    /// Number format id applied by a cell style.
    pub fn num_fmt_id(&self, style: usize) -> Option<u32> {
        self.cell_formats.get(style).copied()
    }

    /// Check if a cell style displays its number as a date or time.
    pub fn is_date_style(&self, style: usize) -> bool {
        self.num_fmt_id(style)
            .is_some_and(|id| self.is_date_format(id))
    }

    /// Check if a number format id is a date or time format.
    ///
    /// Built-in ids 14-22 and 45-47 are dates and times. Custom ids are
    /// judged by their format code.
    pub fn is_date_format(&self, num_fmt_id: u32) -> bool {
        match num_fmt_id {
            14..=22 | 45..=47 => true,
            id => self
                .custom_formats
                .get(&id)
                .is_some_and(|code| is_date_format_code(code)),
        }
    }

    /// Display text for a numeric cell, or `None` to keep the stored text.
    pub fn format_number(&self, style: usize, raw: &str) -> Option<String> {
        if !self.is_date_style(style) {
            return None;
        }
        serial_to_date(raw.trim().parse().ok()?)
    }
}

/// Check if a format code contains date or time tokens.
///
/// Bracketed sections (`[Red]`, `[$-409]`), quoted literals and escaped
/// characters are not tokens.
fn is_date_format_code(code: &str) -> bool {
    // Only the positive-number section decides.
    let section = code.split(';').next().unwrap_or_default();
    if section.eq_ignore_ascii_case("general") {
        return false;
    }

    let mut chars = section.chars();
    let mut in_bracket = false;
    let mut in_quote = false;
    while let Some(c) = chars.next() {
        match c {
            '"' if !in_bracket => in_quote = !in_quote,
            '[' if !in_quote => in_bracket = true,
            ']' if !in_quote => in_bracket = false,
            '\\' if !in_quote => {
                chars.next();
            }
            _ if in_bracket || in_quote => {}
            'd' | 'D' | 'y' | 'Y' | 'h' | 'H' => return true,
            _ => {}
        }
    }
    false
}

/// Convert a serial date number to ISO 8601 text.
///
/// Whole serials give `YYYY-MM-DD`, fractional ones add `THH:MM:SS`, and
/// serials below 1 are times of day (`HH:MM:SS`). Serials before March 1900
/// follow the 1900 leap-year quirk, so serial 1 is 1900-01-01.
pub fn serial_to_date(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let whole = serial.trunc();
    let mut days = whole as i64;
    let mut seconds = ((serial - whole) * 86_400.0).round() as i64;
    if seconds >= 86_400 {
        days += 1;
        seconds -= 86_400;
    }
    let time = format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        seconds % 3600 / 60,
        seconds % 60
    );

    if days == 0 {
        return Some(time);
    }

    // Serial 60 is the nonexistent 1900-02-29; earlier serials sit one day later.
    let epoch_offset = if days < 61 {
        SERIAL_EPOCH_OFFSET - 1
    } else {
        SERIAL_EPOCH_OFFSET
    };
    let (year, month, day) = civil_from_days(days - epoch_offset);
    let date = format!("{:04}-{:02}-{:02}", year, month, day);

    if seconds == 0 {
        Some(date)
    } else {
        Some(format!("{}T{}", date, time))
    }
}

/// Convert days since 1970-01-01 to a proleptic Gregorian (year, month, day).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
        <numFmts count="2">
            <numFmt numFmtId="164" formatCode="yyyy/mm/dd"/>
            <numFmt numFmtId="165" formatCode="&quot;Total:&quot; #,##0.00"/>
        </numFmts>
        <cellXfs count="4">
            <xf numFmtId="0" fontId="0"/>
            <xf numFmtId="14" fontId="0" applyNumberFormat="1"/>
            <xf numFmtId="164" fontId="0" applyNumberFormat="1"/>
            <xf numFmtId="165" fontId="0" applyNumberFormat="1"><alignment horizontal="left"/></xf>
        </cellXfs>
    </styleSheet>"#;

    #[test]
    fn test_parse_cell_formats() {
        let styles = CellStyles::parse(STYLES).unwrap();
        assert_eq!(styles.num_fmt_id(0), Some(0));
        assert_eq!(styles.num_fmt_id(1), Some(14));
        assert_eq!(styles.num_fmt_id(2), Some(164));
        assert_eq!(styles.num_fmt_id(3), Some(165));
        assert_eq!(styles.num_fmt_id(4), None);
    }

    #[test]
    fn test_date_styles() {
        let styles = CellStyles::parse(STYLES).unwrap();
        assert!(!styles.is_date_style(0));
        assert!(styles.is_date_style(1));
        assert!(styles.is_date_style(2));
        assert!(!styles.is_date_style(3));
        assert!(!styles.is_date_style(99));
    }

    #[test]
    fn test_format_number() {
        let styles = CellStyles::parse(STYLES).unwrap();
        assert_eq!(styles.format_number(1, "45306"), Some("2024-01-15".to_string()));
        assert_eq!(styles.format_number(2, "45306.75"), Some("2024-01-15T18:00:00".to_string()));
        assert_eq!(styles.format_number(0, "45306"), None);
        assert_eq!(styles.format_number(1, "n/a"), None);
    }

    #[test]
    fn test_date_format_codes() {
        assert!(is_date_format_code("yyyy-mm-dd"));
        assert!(is_date_format_code("d/m/yy"));
        assert!(is_date_format_code("[$-409]mmmm\\ d\\,\\ yyyy;@"));
        assert!(is_date_format_code("h:mm AM/PM"));

        assert!(!is_date_format_code("General"));
        assert!(!is_date_format_code("0.00"));
        assert!(!is_date_format_code("#,##0;[Red]-#,##0"));
        assert!(!is_date_format_code("\"days\" 0"));
        assert!(!is_date_format_code("0\\d"));
    }

    #[test]
    fn test_serial_to_date() {
        assert_eq!(serial_to_date(1.0), Some("1900-01-01".to_string()));
        assert_eq!(serial_to_date(59.0), Some("1900-02-28".to_string()));
        assert_eq!(serial_to_date(61.0), Some("1900-03-01".to_string()));
        assert_eq!(serial_to_date(44197.0), Some("2021-01-01".to_string()));
        assert_eq!(serial_to_date(45306.0), Some("2024-01-15".to_string()));
        assert_eq!(serial_to_date(44197.5), Some("2021-01-01T12:00:00".to_string()));
        assert_eq!(serial_to_date(0.25), Some("06:00:00".to_string()));
        assert_eq!(serial_to_date(-1.0), None);
    }
}
