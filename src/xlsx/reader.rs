//! XLSX workbook reader.

use crate::container::OoxmlContainer;
use crate::detect::{ensure_workbook, is_zip_file};
use crate::error::{Error, Result};
use crate::extract::SheetSource;
use crate::model::RawSheet;
use std::path::Path;

use super::shared_strings::SharedStrings;
use super::styles::CellStyles;
use super::worksheet;

/// Workbook part listing the sheets.
const WORKBOOK_PART: &str = "xl/workbook.xml";

/// Shared strings part, absent in workbooks without text cells.
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Styles part holding number formats.
const STYLES_PART: &str = "xl/styles.xml";

/// Sheet info from workbook.xml.
#[derive(Debug, Clone)]
struct SheetInfo {
    name: String,
    /// Worksheet part path, `None` when the relationship is missing
    part: Option<String>,
}

/// Reader for XLSX (Excel) workbooks.
///
/// Opening the reader parses the workbook structure and shared strings;
/// worksheet rows are read on demand. The reader is `Send + Sync` and
/// sheets can be read concurrently.
#[derive(Debug, Clone)]
pub struct XlsxReader {
    container: OoxmlContainer,
    shared_strings: SharedStrings,
    styles: CellStyles,
    sheets: Vec<SheetInfo>,
}

impl XlsxReader {
    /// Open an XLSX file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    /// Create a reader from bytes.
    ///
    /// Input without the ZIP signature fails with [`Error::UnknownFormat`].
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if !is_zip_file(&data) {
            return Err(Error::UnknownFormat);
        }
        let container = OoxmlContainer::from_bytes(data)?;
        Self::from_container(container)
    }

    /// Create a reader from a container.
    fn from_container(container: OoxmlContainer) -> Result<Self> {
        ensure_workbook(&container)?;

        let shared_strings = match container.read_xml(SHARED_STRINGS_PART) {
            Ok(xml) => SharedStrings::parse(&xml)?,
            Err(Error::MissingComponent(_)) => SharedStrings::default(),
            Err(e) => return Err(e),
        };

        let styles = match container.read_xml(STYLES_PART) {
            Ok(xml) => CellStyles::parse(&xml)?,
            Err(Error::MissingComponent(_)) => CellStyles::default(),
            Err(e) => return Err(e),
        };

        let sheets = Self::parse_workbook(&container)?;

        Ok(Self {
            container,
            shared_strings,
            styles,
            sheets,
        })
    }

    /// Parse workbook.xml and its relationships for sheet names and parts.
    fn parse_workbook(container: &OoxmlContainer) -> Result<Vec<SheetInfo>> {
        let xml = container.read_xml(WORKBOOK_PART)?;
        let relationships = container.read_relationships(WORKBOOK_PART)?;

        let mut sheets = Vec::new();
        let mut reader = quick_xml::Reader::from_str(&xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Empty(e)) | Ok(quick_xml::events::Event::Start(e))
                    if e.local_name().as_ref() == b"sheet" =>
                {
                    let mut name = String::new();
                    let mut rel_id = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = attr
                                    .unescape_value()
                                    .map_err(|e| Error::XmlParse(e.to_string()))?
                                    .to_string();
                            }
                            // r:id, whatever the namespace prefix
                            _ if attr.key.local_name().as_ref() == b"id" => {
                                rel_id = String::from_utf8_lossy(&attr.value).to_string();
                            }
                            _ => {}
                        }
                    }

                    if !name.is_empty() {
                        let part = relationships
                            .get(&rel_id)
                            .map(|target| OoxmlContainer::resolve_path(WORKBOOK_PART, target));
                        sheets.push(SheetInfo { name, part });
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read every row of a sheet as text.
    pub fn read_sheet(&self, name: &str) -> Result<RawSheet> {
        let sheet = self
            .sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))?;

        let part = sheet
            .part
            .as_deref()
            .ok_or_else(|| Error::MissingComponent(format!("worksheet part for {}", name)))?;

        let xml = self.container.read_xml(part)?;
        worksheet::read_rows(&xml, &self.shared_strings, &self.styles)
    }

    /// Get a reference to the container.
    pub fn container(&self) -> &OoxmlContainer {
        &self.container
    }

    /// Get the number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Get sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

impl SheetSource for XlsxReader {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn read_rows(&self, sheet: &str) -> Result<RawSheet> {
        self.read_sheet(sheet)
    }
}
