use std::path::Path;

use syllabus_core::{
    ExtractionResult, PageRasterizer, PdfBackend, TextRecognizer, TextSource,
};
use syllabus_parsing::SyllabusExtractor;

use crate::IngestError;

/// File signature that marks raw PDF container bytes.
pub const PDF_SIGNATURE: &str = "%PDF";

/// Whether reconstructed text is unusable and the document must go
/// through OCR: nothing but whitespace, or raw container bytes instead of
/// decoded text.
pub fn needs_ocr(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed.starts_with(PDF_SIGNATURE)
}

/// The two collaborators used when a document has no usable text layer.
#[derive(Clone, Copy)]
pub struct OcrPath<'a> {
    pub rasterizer: &'a dyn PageRasterizer,
    pub recognizer: &'a dyn TextRecognizer,
}

/// Output of processing one document.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    /// Text handed to the section extractor.
    pub text: String,
    pub source: TextSource,
    pub fields: ExtractionResult,
}

/// Chooses between direct text extraction and OCR, then extracts fields.
///
/// Pages are handled strictly one at a time in ascending order. Any
/// decoder or OCR failure aborts the document; there is no partial output.
pub struct DocumentPipeline<'a> {
    decoder: &'a dyn PdfBackend,
    ocr: Option<OcrPath<'a>>,
    extractor: SyllabusExtractor,
}

impl<'a> DocumentPipeline<'a> {
    pub fn new(decoder: &'a dyn PdfBackend, extractor: SyllabusExtractor) -> Self {
        Self {
            decoder,
            ocr: None,
            extractor,
        }
    }

    /// Enable the OCR fallback.
    pub fn with_ocr(
        mut self,
        rasterizer: &'a dyn PageRasterizer,
        recognizer: &'a dyn TextRecognizer,
    ) -> Self {
        self.ocr = Some(OcrPath {
            rasterizer,
            recognizer,
        });
        self
    }

    pub fn extractor(&self) -> &SyllabusExtractor {
        &self.extractor
    }

    /// Produce the document's text and extract every field from it.
    pub fn process(&self, path: &Path) -> Result<ProcessedDocument, IngestError> {
        let (text, source) = self.document_text(path)?;
        Ok(self.finish(path, text, source))
    }

    /// Extract fields from text that was already produced for `path`.
    pub fn finish(&self, path: &Path, text: String, source: TextSource) -> ProcessedDocument {
        let fields = self.extractor.extract_fields(&text);

        tracing::info!(
            path = %path.display(),
            source = ?source,
            found = fields.found_count(),
            total = fields.len(),
            "processed document"
        );

        ProcessedDocument {
            text,
            source,
            fields,
        }
    }

    /// Reconstructed text, or OCR text when the text layer is unusable.
    pub fn document_text(&self, path: &Path) -> Result<(String, TextSource), IngestError> {
        let pages = self.decoder.extract_pages(path)?;
        let text = self.extractor.reconstruct(&pages);

        if !needs_ocr(&text) {
            return Ok((text, TextSource::Direct));
        }

        tracing::info!(
            path = %path.display(),
            pages = pages.len(),
            "no usable text layer, falling back to OCR"
        );
        let ocr = self.ocr.ok_or(IngestError::NoOcrSupport)?;
        let text = ocr_document(path, ocr)?;
        Ok((text, TextSource::Ocr))
    }
}

/// Rasterize and recognize every page in order, joining page texts with `\n`.
///
/// Each page image is deleted as soon as its recognition call returns,
/// on failure as well as on success.
pub fn ocr_document(path: &Path, ocr: OcrPath<'_>) -> Result<String, IngestError> {
    let page_count = ocr.rasterizer.page_count(path)?;
    let mut pages = Vec::with_capacity(page_count);

    for page in 1..=page_count {
        let image = ocr.rasterizer.rasterize(path, page)?;
        let text = ocr.recognizer.recognize(&image)?;
        image.close()?;
        pages.push(text);
    }

    Ok(pages.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_ocr_empty() {
        assert!(needs_ocr(""));
        assert!(needs_ocr("\n\n\n\n"));
        assert!(needs_ocr("  \r\n \t"));
    }

    #[test]
    fn test_needs_ocr_pdf_signature() {
        assert!(needs_ocr("%PDF-1.7\n%âãÏÓ\n1 0 obj"));
        assert!(needs_ocr("\n  %PDF-1.4"));
    }

    #[test]
    fn test_needs_ocr_real_text() {
        assert!(!needs_ocr("Office Hours: Mon 2pm\n\n"));
        assert!(!needs_ocr("Grading is 50% exams; see %PDF notes"));
    }
}
