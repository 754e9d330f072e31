use std::path::Path;

use thiserror::Error;

pub mod pipeline;

// Re-export domain types for convenience
pub use syllabus_core::{BackendError, ExtractionResult, FieldValue, TextSource};
pub use syllabus_parsing::{DocumentVariant, ParsingConfig};
// Re-export pipeline API
pub use pipeline::{DocumentPipeline, OcrPath, PDF_SIGNATURE, ProcessedDocument, needs_ocr};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("document has no text layer and OCR is not enabled")]
    NoOcrSupport,
    #[cfg(feature = "ocr")]
    #[error("OCR setup failed: {0}")]
    OcrInit(#[from] syllabus_ocr::OcrError),
    #[cfg(not(feature = "pdf"))]
    #[error("PDF support not compiled in (enable the `pdf` feature of syllabus-ingest)")]
    NoPdfSupport,
}

impl IngestError {
    /// True when the document failed on the OCR path rather than while decoding.
    pub fn is_ocr_failure(&self) -> bool {
        match self {
            IngestError::Backend(e) => e.is_ocr_failure(),
            #[cfg(feature = "ocr")]
            IngestError::OcrInit(_) => true,
            _ => false,
        }
    }
}

/// Settings for [`process_syllabus`].
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub variant: DocumentVariant,
    pub parsing: ParsingConfig,
    /// Tesseract language codes; `None` uses the recognizer default.
    pub ocr_language: Option<String>,
    /// Rasterization resolution; `None` uses the rasterizer default.
    pub dpi: Option<u32>,
}

/// Reconstruct a syllabus PDF and extract its fields with the default
/// backends (MuPDF for decoding and rasterization, Tesseract for OCR).
///
/// Without the `ocr` feature, documents lacking a text layer fail with
/// [`IngestError::NoOcrSupport`].
#[cfg(feature = "pdf")]
pub fn process_syllabus(
    path: &Path,
    options: &IngestOptions,
) -> Result<ProcessedDocument, IngestError> {
    let backend = mupdf_backend(options);
    let extractor =
        syllabus_parsing::SyllabusExtractor::with_config(options.variant, &options.parsing);
    let pipeline = DocumentPipeline::new(&backend, extractor);

    let (text, source) = text_with_fallback(&pipeline, &backend, path, options)?;
    Ok(pipeline.finish(path, text, source))
}

/// The text fields would be extracted from, without extracting them.
#[cfg(feature = "pdf")]
pub fn document_text(
    path: &Path,
    options: &IngestOptions,
) -> Result<(String, TextSource), IngestError> {
    let backend = mupdf_backend(options);
    let pipeline = DocumentPipeline::new(&backend, syllabus_parsing::SyllabusExtractor::new());
    text_with_fallback(&pipeline, &backend, path, options)
}

#[cfg(feature = "pdf")]
fn mupdf_backend(options: &IngestOptions) -> syllabus_pdf_mupdf::MupdfBackend {
    match options.dpi {
        Some(dpi) => syllabus_pdf_mupdf::MupdfBackend::new().with_dpi(dpi),
        None => syllabus_pdf_mupdf::MupdfBackend::new(),
    }
}

#[cfg(feature = "ocr")]
fn text_with_fallback(
    pipeline: &DocumentPipeline<'_>,
    backend: &syllabus_pdf_mupdf::MupdfBackend,
    path: &Path,
    options: &IngestOptions,
) -> Result<(String, TextSource), IngestError> {
    // Tesseract is only initialized once a document turns out to need it
    match pipeline.document_text(path) {
        Err(IngestError::NoOcrSupport) => {}
        direct => return direct,
    }

    let mut config = syllabus_ocr::OcrConfig {
        source_dpi: Some(backend.dpi()),
        ..Default::default()
    };
    if let Some(language) = &options.ocr_language {
        config.language = language.clone();
    }
    let recognizer = syllabus_ocr::TesseractRecognizer::new(config)?;
    let ocr = OcrPath {
        rasterizer: backend,
        recognizer: &recognizer,
    };
    Ok((pipeline::ocr_document(path, ocr)?, TextSource::Ocr))
}

#[cfg(all(feature = "pdf", not(feature = "ocr")))]
fn text_with_fallback(
    pipeline: &DocumentPipeline<'_>,
    _backend: &syllabus_pdf_mupdf::MupdfBackend,
    path: &Path,
    _options: &IngestOptions,
) -> Result<(String, TextSource), IngestError> {
    pipeline.document_text(path)
}

#[cfg(not(feature = "pdf"))]
pub fn process_syllabus(
    _path: &Path,
    _options: &IngestOptions,
) -> Result<ProcessedDocument, IngestError> {
    Err(IngestError::NoPdfSupport)
}

#[cfg(not(feature = "pdf"))]
pub fn document_text(
    _path: &Path,
    _options: &IngestOptions,
) -> Result<(String, TextSource), IngestError> {
    Err(IngestError::NoPdfSupport)
}
