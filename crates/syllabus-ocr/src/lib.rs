//! Tesseract OCR backend.
//!
//! Recognizes the text of rasterized syllabus pages when a document has no
//! extractable text layer (scanned handouts, image-only exports).
//! Requires the Tesseract and Leptonica system libraries plus language data.

use leptess::{LepTess, Variable};
use thiserror::Error;

use syllabus_core::{BackendError, PageImage, TextRecognizer};

/// Configuration for OCR processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    /// Tesseract language codes (e.g., "eng", "eng+fra")
    pub language: String,
    /// Page segmentation mode (see Tesseract PSM)
    pub page_segmentation_mode: u32,
    /// Resolution the page images were rendered at, passed to Tesseract
    pub source_dpi: Option<u32>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            page_segmentation_mode: 3, // PSM_AUTO (fully automatic)
            source_dpi: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("failed to initialize Tesseract with language '{language}': {message}")]
    Init { language: String, message: String },
}

/// [`TextRecognizer`] backed by Tesseract via `leptess`.
pub struct TesseractRecognizer {
    config: OcrConfig,
}

impl TesseractRecognizer {
    /// Create a recognizer, verifying Tesseract can load the configured language.
    pub fn new(config: OcrConfig) -> Result<Self, OcrError> {
        let _probe = LepTess::new(None, &config.language).map_err(|e| OcrError::Init {
            language: config.language.clone(),
            message: format!("{e}. Make sure the language data is installed"),
        })?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &PageImage) -> Result<String, BackendError> {
        let page = image.page();
        let recognize_err = |message: String| BackendError::Recognize { page, message };

        // LepTess is not Sync, so each call owns its engine
        let mut lt = LepTess::new(None, &self.config.language)
            .map_err(|e| recognize_err(format!("failed to initialize Tesseract: {e}")))?;

        lt.set_variable(
            Variable::TesseditPagesegMode,
            &self.config.page_segmentation_mode.to_string(),
        )
        .map_err(|e| recognize_err(format!("failed to set PSM: {e}")))?;

        lt.set_image(image.path())
            .map_err(|e| recognize_err(format!("failed to load page image: {e}")))?;

        if let Some(dpi) = self.config.source_dpi {
            lt.set_source_resolution(dpi as i32);
        }

        let text = lt
            .get_utf8_text()
            .map_err(|e| recognize_err(format!("recognized text is not UTF-8: {e}")))?;

        tracing::debug!(page, chars = text.len(), "recognized page");
        Ok(text)
    }
}
