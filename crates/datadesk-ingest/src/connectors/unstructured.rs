//! PDF connector.

use super::{Connector, SourceKind};
use crate::error::{IngestError, IngestResult};
use crate::metadata::MetadataMap;
use datadesk_core::{Specification, UnstructuredDocument, UnstructuredDraft};
use datadesk_db::Database;
use pdf::content::{Op, TextDrawAdjusted};
use pdf::file::FileOptions;
use pdf::font::{Font, ToUnicodeMap};
use pdf::object::{Lazy, Resolve};
use pdf::primitive::PdfString;
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};

const FILE_NAME_KEY: &str = "file_name";
const FILE_DESCRIPTION_KEY: &str = "file_description";

/// Name and description collected for a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInfo {
    pub file_name: Option<String>,
    pub file_description: Option<String>,
}

impl FileInfo {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "file_name": self.file_name,
            "file_description": self.file_description,
        })
    }
}

/// Connector for paginated documents.
#[derive(Debug, Clone)]
pub struct UnstructuredConnector {
    content: String,
    page_count: usize,
    info: FileInfo,
}

impl UnstructuredConnector {
    /// Open a PDF file and extract its text.
    pub fn from_path(path: &Path) -> IngestResult<Self> {
        if !path.exists() {
            return Err(IngestError::FileNotFound(path.to_path_buf()));
        }

        debug!("Parsing PDF: {:?}", path);
        let data = std::fs::read(path)?;
        Self::load(&data, &path.display().to_string())
    }

    /// Extract the text of an in-memory PDF.
    pub fn from_bytes(data: &[u8]) -> IngestResult<Self> {
        Self::load(data, "<memory>")
    }

    fn load(data: &[u8], source_name: &str) -> IngestResult<Self> {
        let pages = extract_pages(data).map_err(|message| IngestError::PdfParse {
            source_name: source_name.to_string(),
            message,
        })?;

        let content = join_pages(&pages);
        debug!("Extracted {} characters from {} pages", content.len(), pages.len());

        Ok(Self {
            content,
            page_count: pages.len(),
            info: FileInfo::default(),
        })
    }

    /// Store the name and description verbatim.
    pub fn save_data(&mut self, file_name: impl Into<String>, file_description: impl Into<String>) {
        self.info.file_name = Some(file_name.into());
        self.info.file_description = Some(file_description.into());
    }

    /// Concatenated text of every page.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn data_info(&self) -> &FileInfo {
        &self.info
    }

    /// Write the document record, returned as a one-element list.
    /// Without a store the record is only built and nothing is returned.
    pub fn persist(&self, db: Option<&Database>) -> IngestResult<Vec<UnstructuredDocument>> {
        let (name, description) = match (&self.info.file_name, &self.info.file_description) {
            (Some(name), Some(description)) => (name.clone(), description.clone()),
            (None, _) => return Err(IngestError::MissingInformation(FILE_NAME_KEY.to_string())),
            (_, None) => {
                return Err(IngestError::MissingInformation(
                    FILE_DESCRIPTION_KEY.to_string(),
                ))
            }
        };

        let draft = UnstructuredDraft {
            name,
            description,
            content: self.content.clone(),
        };

        info!(
            "Uploading PDF to SQL database: {} ({} chars)",
            draft.name,
            draft.content.len()
        );

        match db {
            Some(db) => Ok(vec![db.register_unstructured(&draft)?]),
            None => {
                info!("No database handle, skipping write for '{}'", draft.name);
                Ok(Vec::new())
            }
        }
    }
}

impl Connector for UnstructuredConnector {
    fn specification(&self) -> Specification {
        let mut spec = Specification::new();
        spec.push(
            FILE_NAME_KEY,
            "Please, provide a short but significant name to the file you just uploaded.",
        );
        spec.push(
            FILE_DESCRIPTION_KEY,
            "Provide a detailed description of the usage of the file you just uploaded.",
        );
        spec
    }

    fn save_metadata(&mut self, metadata: &MetadataMap) {
        if let Some(name) = metadata.get(FILE_NAME_KEY) {
            self.info.file_name = Some(name.clone());
        }
        if let Some(description) = metadata.get(FILE_DESCRIPTION_KEY) {
            self.info.file_description = Some(description.clone());
        }
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::Unstructured
    }
}

/// `TJ` offsets (thousandths of an em) wider than this separate words.
const WORD_GAP: f32 = 200.0;

/// Text drawn on each page, in page order.
fn extract_pages(data: &[u8]) -> Result<Vec<String>, String> {
    let file = FileOptions::cached().load(data).map_err(|e| e.to_string())?;
    let resolver = file.resolver();

    let mut pages = Vec::with_capacity(file.num_pages() as usize);
    for page_num in 0..file.num_pages() {
        let page = file.get_page(page_num).map_err(|e| e.to_string())?;
        let fonts = page.resources().ok().map(|resources| &resources.fonts);

        let mut text = PageText::default();
        let mut font = FontDecoder::default();

        if let Some(content) = &page.contents {
            let operations = content.operations(&resolver).map_err(|e| e.to_string())?;
            for op in operations.iter() {
                match op {
                    Op::TextFont { name, .. } => {
                        font = fonts
                            .and_then(|fonts| fonts.get(name))
                            .map(|lazy| FontDecoder::load(lazy, &resolver))
                            .unwrap_or_default();
                    }
                    Op::TextDraw { text: drawn } => text.push_str(&font.decode(drawn)),
                    Op::TextDrawAdjusted { array } => {
                        for item in array {
                            match item {
                                TextDrawAdjusted::Text(drawn) => text.push_str(&font.decode(drawn)),
                                TextDrawAdjusted::Spacing(gap) if *gap < -WORD_GAP => text.space(),
                                TextDrawAdjusted::Spacing(_) => {}
                            }
                        }
                    }
                    Op::Leading { leading } => text.leading = *leading,
                    Op::TextNewline => text.next_line(),
                    Op::MoveTextPosition { translation } => text.move_by(translation.y),
                    Op::SetTextMatrix { matrix } => text.move_to(matrix.f),
                    _ => {}
                }
            }
        }

        pages.push(text.finish());
    }

    Ok(pages)
}

/// Page text with line and word breaks derived from text positioning.
#[derive(Debug, Default)]
struct PageText {
    out: String,
    line_y: Option<f32>,
    leading: f32,
}

impl PageText {
    fn push_str(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn line_has_text(&self) -> bool {
        !self.out.is_empty() && !self.out.ends_with('\n')
    }

    fn newline(&mut self) {
        if self.line_has_text() {
            let trimmed = self.out.trim_end_matches(' ').len();
            self.out.truncate(trimmed);
            self.out.push('\n');
        }
    }

    fn space(&mut self) {
        if self.line_has_text() && !self.out.ends_with(' ') {
            self.out.push(' ');
        }
    }

    /// `T*` and the quote operators.
    fn next_line(&mut self) {
        self.line_y = self.line_y.map(|y| y - self.leading);
        self.newline();
    }

    /// `Td` / `TD`: a vertical move starts a new line, a horizontal one a new word.
    fn move_by(&mut self, dy: f32) {
        if dy.abs() > f32::EPSILON {
            self.line_y = self.line_y.map(|y| y + dy);
            self.newline();
        } else {
            self.space();
        }
    }

    /// `Tm`: absolute positioning.
    fn move_to(&mut self, y: f32) {
        match self.line_y {
            Some(current) if (current - y).abs() < 0.5 => self.space(),
            _ => self.newline(),
        }
        self.line_y = Some(y);
    }

    fn finish(mut self) -> String {
        let trimmed = self.out.trim_end().len();
        self.out.truncate(trimmed);
        self.out
    }
}

/// Maps the bytes of shown strings to text for the current font.
#[derive(Default)]
struct FontDecoder {
    to_unicode: Option<ToUnicodeMap>,
    two_byte: bool,
}

impl FontDecoder {
    fn load(lazy: &Lazy<Font>, resolver: &impl Resolve) -> Self {
        let font = match lazy.load(resolver) {
            Ok(font) => font,
            Err(e) => {
                debug!("Unreadable font, decoding as Latin-1: {}", e);
                return Self::default();
            }
        };

        let to_unicode = match font.to_unicode(resolver) {
            Some(Ok(map)) => Some(map),
            Some(Err(e)) => {
                debug!("Unreadable ToUnicode map: {}", e);
                None
            }
            None => None,
        };

        Self {
            to_unicode,
            two_byte: font.is_cid(),
        }
    }

    fn decode(&self, text: &PdfString) -> String {
        let bytes = text.as_bytes();
        match (&self.to_unicode, self.two_byte) {
            (Some(map), true) => bytes
                .chunks(2)
                .filter_map(|pair| {
                    let code = u16::from_be_bytes([pair[0], *pair.get(1).unwrap_or(&0)]);
                    map.get(code)
                })
                .collect(),
            (Some(map), false) => bytes
                .iter()
                .map(|&b| match map.get(b as u16) {
                    Some(s) => s.to_string(),
                    None => (b as char).to_string(),
                })
                .collect(),
            // CIDs without a ToUnicode map are glyph ids, not characters
            (None, true) => String::new(),
            (None, false) => {
                if bytes.starts_with(&[0xfe, 0xff]) {
                    text.to_string_lossy()
                } else {
                    bytes.iter().map(|&b| b as char).collect()
                }
            }
        }
    }
}

/// Every page followed by a newline.
fn join_pages(pages: &[String]) -> String {
    pages.iter().fold(String::new(), |mut acc, page| {
        acc.push_str(page);
        acc.push('\n');
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages() {
        let pages = vec!["A".to_string(), "B".to_string()];
        assert_eq!(join_pages(&pages), "A\nB\n");
        assert_eq!(join_pages(&[]), "");
    }

    #[test]
    fn test_specification_is_fixed() {
        let connector = UnstructuredConnector {
            content: String::new(),
            page_count: 0,
            info: FileInfo::default(),
        };
        let spec = connector.specification();
        assert_eq!(spec.inputs_required, vec!["file_name", "file_description"]);
        assert_eq!(spec.inputs_required_prompts.len(), 2);
    }

    #[test]
    fn test_persist_requires_name_and_description() {
        let mut connector = UnstructuredConnector {
            content: "a long body of text".repeat(100),
            page_count: 1,
            info: FileInfo::default(),
        };
        assert!(matches!(
            connector.persist(None),
            Err(IngestError::MissingInformation(field)) if field == "file_name"
        ));

        let mut metadata = MetadataMap::new();
        metadata.insert("file_name".to_string(), "manual".to_string());
        connector.save_metadata(&metadata);
        assert!(matches!(
            connector.persist(None),
            Err(IngestError::MissingInformation(field)) if field == "file_description"
        ));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let result = UnstructuredConnector::from_bytes(b"definitely not a pdf");
        assert!(matches!(result, Err(IngestError::PdfParse { .. })));
    }
}
