use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config_file;

// Re-export for convenience
pub use backend::{BackendError, PageImage, PageRasterizer, PdfBackend, TextRecognizer};

/// Sentinel rendered for a field that could not be located in the document.
pub const NOT_FOUND: &str = "Not found";

/// Baseline insertion point of a run in page coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One atomic unit of decoded text on a page: a word, a fragment, or a
/// single glyph, placed at its baseline origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedRun {
    pub text: String,
    pub origin: Point,
}

impl PositionedRun {
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            origin: Point::new(x, y),
        }
    }
}

/// The runs of one page, in the decoder's paint order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number.
    pub index: usize,
    pub runs: Vec<PositionedRun>,
}

impl Page {
    pub fn new(index: usize, runs: Vec<PositionedRun>) -> Self {
        Self { index, runs }
    }
}

/// Which path produced the text handed to the section extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    /// Text layer reconstructed from positioned runs.
    Direct,
    /// Page images run through optical character recognition.
    Ocr,
}

/// Value of one semantic field: either the captured text or the
/// "not found" sentinel. Absence is never an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    Found(String),
    #[default]
    NotFound,
}

impl FieldValue {
    pub fn is_found(&self) -> bool {
        matches!(self, FieldValue::Found(_))
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            FieldValue::Found(s) => Some(s),
            FieldValue::NotFound => None,
        }
    }

    /// Display form, with the sentinel substituted for absent fields.
    pub fn as_str(&self) -> &str {
        self.as_deref().unwrap_or(NOT_FOUND)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) => FieldValue::Found(s),
            None => FieldValue::NotFound,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single field resolved against a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedField {
    pub name: String,
    pub value: FieldValue,
}

/// Field name → value, in field-table declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    fields: Vec<ExtractedField>,
}

impl ExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.push(ExtractedField {
            name: name.into(),
            value,
        });
    }

    /// Look up a field by name. Unknown names return `None`, not the sentinel.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtractedField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn found_count(&self) -> usize {
        self.fields.iter().filter(|f| f.value.is_found()).count()
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.end()
    }
}
