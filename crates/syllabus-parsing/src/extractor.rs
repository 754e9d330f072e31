use syllabus_core::{ExtractionResult, Page};

use crate::config::ParsingConfig;
use crate::fields::{DocumentVariant, FieldTable};
use crate::{layout, section};

/// A configurable syllabus extraction pipeline.
///
/// Holds the field table built from a [`ParsingConfig`] and a
/// [`DocumentVariant`], and exposes each pipeline step as a method.
/// Use [`SyllabusExtractor::with_config`] to supply custom markers and patterns.
pub struct SyllabusExtractor {
    variant: DocumentVariant,
    table: FieldTable,
}

impl Default for SyllabusExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SyllabusExtractor {
    /// Create an extractor for the standard field table with default configuration.
    pub fn new() -> Self {
        Self::for_variant(DocumentVariant::Standard)
    }

    pub fn for_variant(variant: DocumentVariant) -> Self {
        Self::with_config(variant, &ParsingConfig::default())
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(variant: DocumentVariant, config: &ParsingConfig) -> Self {
        Self {
            variant,
            table: FieldTable::with_config(variant, config),
        }
    }

    pub fn variant(&self) -> DocumentVariant {
        self.variant
    }

    pub fn table(&self) -> &FieldTable {
        &self.table
    }

    /// Linearize decoded pages into one text stream (step 1).
    pub fn reconstruct(&self, pages: &[Page]) -> String {
        layout::reconstruct(pages)
    }

    /// Resolve every field against already-linearized text (step 2).
    ///
    /// The text may come from layout reconstruction or from OCR.
    pub fn extract_fields(&self, text: &str) -> ExtractionResult {
        section::extract(text, &self.table)
    }

    /// Run both steps on decoded pages.
    pub fn extract_from_pages(&self, pages: &[Page]) -> (String, ExtractionResult) {
        let text = self.reconstruct(pages);
        let fields = self.extract_fields(&text);
        (text, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParsingConfigBuilder;
    use crate::fields::{EMAIL, GRADING_SCALE, OFFICE_HOURS};
    use syllabus_core::{FieldValue, PositionedRun};

    fn syllabus_pages() -> Vec<Page> {
        vec![
            Page::new(
                1,
                vec![
                    PositionedRun::new("Office Hours: ", 72.0, 700.0),
                    PositionedRun::new("Thu 1-3pm", 160.0, 700.0),
                    PositionedRun::new("Contact: ", 72.0, 680.0),
                    PositionedRun::new("prof@college.edu", 130.0, 680.0),
                ],
            ),
            Page::new(
                2,
                vec![
                    PositionedRun::new("Grade Letter ", 72.0, 700.0),
                    PositionedRun::new("Minimum", 200.0, 700.0),
                    PositionedRun::new("A ", 72.0, 680.0),
                    PositionedRun::new("92", 200.0, 680.0),
                    PositionedRun::new("B ", 72.0, 660.0),
                    PositionedRun::new("82", 200.0, 660.0),
                ],
            ),
        ]
    }

    #[test]
    fn test_extract_from_pages() {
        let extractor = SyllabusExtractor::for_variant(DocumentVariant::Contact);
        let (text, fields) = extractor.extract_from_pages(&syllabus_pages());

        assert!(text.starts_with("Office Hours: Thu 1-3pm\r\nContact: prof@college.edu\n\n"));
        assert_eq!(
            fields.get(OFFICE_HOURS),
            Some(&FieldValue::Found("Thu 1-3pm".into()))
        );
        assert_eq!(fields.get(EMAIL).unwrap().as_str(), "prof@college.edu");
        assert!(text.ends_with("Grade Letter Minimum\r\nA 92\r\nB 82\n\n"));
        assert_eq!(fields.get(GRADING_SCALE).unwrap().as_str(), "A 92\nB 82");
    }

    #[test]
    fn test_with_config_custom_email() {
        let config = ParsingConfigBuilder::new()
            .email_regex(r"[a-z]+@college\.edu")
            .build()
            .unwrap();
        let extractor = SyllabusExtractor::with_config(DocumentVariant::Contact, &config);
        let fields = extractor.extract_fields("ta@other.org then prof@college.edu");
        assert_eq!(fields.get(EMAIL).unwrap().as_str(), "prof@college.edu");
    }

    #[test]
    fn test_standard_has_no_email() {
        let extractor = SyllabusExtractor::new();
        assert_eq!(extractor.variant(), DocumentVariant::Standard);
        let fields = extractor.extract_fields("prof@college.edu");
        assert!(fields.get(EMAIL).is_none());
    }
}
