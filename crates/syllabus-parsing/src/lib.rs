use thiserror::Error;

pub mod config;
pub mod extractor;
pub mod fields;
pub mod layout;
pub mod section;

pub use config::{ListOverride, ParsingConfig, ParsingConfigBuilder};
pub use extractor::SyllabusExtractor;
pub use fields::{DocumentVariant, FieldDef, FieldTable};
pub use layout::{reconstruct, reconstruct_page};
pub use section::{Capture, FieldRule, FieldSpec, LineFilter, evaluate, extract};
// Re-export domain types from core (canonical definitions live there)
pub use syllabus_core::{
    ExtractedField, ExtractionResult, FieldValue, NOT_FOUND, Page, Point, PositionedRun,
};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("invalid pattern for {field}: {source}")]
    InvalidPattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },
    #[error("unknown document variant: {0}")]
    UnknownVariant(String),
}

/// Reconstruct the text of `pages` and extract the standard syllabus fields.
///
/// Pipeline:
/// 1. Linearize each page's positioned runs (line breaks, word spacing)
/// 2. Concatenate pages, separated by a blank line
/// 3. Resolve every field of the standard table, "not found" for absent ones
pub fn extract_syllabus(pages: &[Page]) -> (String, ExtractionResult) {
    SyllabusExtractor::new().extract_from_pages(pages)
}
