//! Format detection for Office Open XML packages.

use crate::container::OoxmlContainer;
use crate::error::{Error, Result};
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Content type for DOCX main document part.
const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

/// Content types for XLSX workbook parts (regular and macro-enabled).
const XLSX_CONTENT_TYPES: [&str; 2] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
    "application/vnd.ms-excel.sheet.macroEnabled.main+xml",
];

/// Content type for PPTX presentation part.
const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

/// Detected Office document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Microsoft Word document (.docx)
    Docx,
    /// Microsoft Excel workbook (.xlsx, .xlsm)
    Xlsx,
    /// Microsoft PowerPoint presentation (.pptx)
    Pptx,
}

impl FormatType {
    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            FormatType::Docx => "Word Document",
            FormatType::Xlsx => "Excel Workbook",
            FormatType::Pptx => "PowerPoint Presentation",
        }
    }
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the format of an opened package.
///
/// `[Content_Types].xml` decides when it names a main part; otherwise the
/// top-level folder layout is used.
pub fn detect_format(container: &OoxmlContainer) -> Result<FormatType> {
    if let Ok(content_types) = container.read_xml("[Content_Types].xml") {
        if XLSX_CONTENT_TYPES.iter().any(|ct| content_types.contains(ct)) {
            return Ok(FormatType::Xlsx);
        } else if content_types.contains(DOCX_CONTENT_TYPE) {
            return Ok(FormatType::Docx);
        } else if content_types.contains(PPTX_CONTENT_TYPE) {
            return Ok(FormatType::Pptx);
        }
    }

    let names = container.list_files();
    let has = |prefix: &str| names.iter().any(|n| n.starts_with(prefix));

    match (has("word/"), has("xl/"), has("ppt/")) {
        (true, false, false) => Ok(FormatType::Docx),
        (false, true, false) => Ok(FormatType::Xlsx),
        (false, false, true) => Ok(FormatType::Pptx),
        _ => Err(Error::UnknownFormat),
    }
}

/// Detect the format type from a file path.
///
/// # Example
///
/// ```no_run
/// use unsheet::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("workbook.xlsx")?;
/// println!("Detected format: {}", format);
/// # Ok::<(), unsheet::Error>(())
/// ```
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<FormatType> {
    let data = std::fs::read(path.as_ref())?;
    detect_format_from_bytes(&data)
}

/// Detect the format type from a byte slice.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<FormatType> {
    if !is_zip_file(data) {
        return Err(Error::UnknownFormat);
    }
    detect_format(&OoxmlContainer::from_bytes(data.to_vec())?)
}

/// Fail unless the package is a spreadsheet.
pub fn ensure_workbook(container: &OoxmlContainer) -> Result<()> {
    match detect_format(container)? {
        FormatType::Xlsx => Ok(()),
        other => Err(Error::UnsupportedFormat(other.name().to_string())),
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, content) in parts {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        buffer
    }

    fn content_types(main: &str) -> String {
        format!(
            r#"<Types><Override PartName="/main.xml" ContentType="{}"/></Types>"#,
            main
        )
    }

    #[test]
    fn test_format_type_display() {
        assert_eq!(FormatType::Xlsx.to_string(), "Excel Workbook");
        assert_eq!(FormatType::Docx.to_string(), "Word Document");
    }

    #[test]
    fn test_is_zip_file() {
        assert!(is_zip_file(&[0x50, 0x4B, 0x03, 0x04, 0x00]));
        assert!(!is_zip_file(&[0x00, 0x00, 0x00, 0x00]));
        assert!(!is_zip_file(&[0x50, 0x4B]));
    }

    #[test]
    fn test_detect_invalid_data() {
        let result = detect_format_from_bytes(&[0x00, 0x00, 0x00, 0x00]);
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_by_content_type() {
        let xlsx = package(&[(
            "[Content_Types].xml",
            content_types(XLSX_CONTENT_TYPES[0]).as_str(),
        )]);
        assert_eq!(detect_format_from_bytes(&xlsx).unwrap(), FormatType::Xlsx);

        let xlsm = package(&[(
            "[Content_Types].xml",
            content_types(XLSX_CONTENT_TYPES[1]).as_str(),
        )]);
        assert_eq!(detect_format_from_bytes(&xlsm).unwrap(), FormatType::Xlsx);

        let docx = package(&[(
            "[Content_Types].xml",
            content_types(DOCX_CONTENT_TYPE).as_str(),
        )]);
        assert_eq!(detect_format_from_bytes(&docx).unwrap(), FormatType::Docx);
    }

    #[test]
    fn test_detect_by_folder() {
        let data = package(&[("xl/workbook.xml", "<workbook/>")]);
        assert_eq!(detect_format_from_bytes(&data).unwrap(), FormatType::Xlsx);

        let data = package(&[("other/file.xml", "<x/>")]);
        assert!(matches!(
            detect_format_from_bytes(&data),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_ensure_workbook_rejects_documents() {
        let data = package(&[(
            "[Content_Types].xml",
            content_types(PPTX_CONTENT_TYPE).as_str(),
        )]);
        let container = OoxmlContainer::from_bytes(data).unwrap();
        assert!(matches!(
            ensure_workbook(&container),
            Err(Error::UnsupportedFormat(name)) if name == "PowerPoint Presentation"
        ));
    }
}
