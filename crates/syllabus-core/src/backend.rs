use std::path::Path;

use tempfile::TempPath;
use thiserror::Error;

use crate::Page;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to decode PDF: {0}")]
    Decode(String),
    #[error("failed to rasterize page {page}: {message}")]
    Rasterize { page: usize, message: String },
    #[error("OCR failed on page {page}: {message}")]
    Recognize { page: usize, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    /// True for failures raised on the OCR path (rasterization or recognition).
    pub fn is_ocr_failure(&self) -> bool {
        matches!(
            self,
            BackendError::Rasterize { .. } | BackendError::Recognize { .. }
        )
    }
}

/// Trait for PDF decoders.
///
/// Implementors turn a document into per-page positioned runs in paint
/// order; layout reconstruction and field extraction live in
/// `syllabus_parsing`.
pub trait PdfBackend: Send + Sync {
    /// Decode every page of the document, in ascending page order.
    fn extract_pages(&self, path: &Path) -> Result<Vec<Page>, BackendError>;
}

/// Renders document pages to images for OCR.
pub trait PageRasterizer: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self, path: &Path) -> Result<usize, BackendError>;

    /// Render page `page` (1-based) to an image file owned by the returned handle.
    fn rasterize(&self, path: &Path, page: usize) -> Result<PageImage, BackendError>;
}

/// Optical character recognition over a rasterized page.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &PageImage) -> Result<String, BackendError>;
}

/// A rasterized page image on disk.
///
/// The file lives exactly as long as the handle: dropping it deletes the
/// file, whether recognition succeeded or not.
#[derive(Debug)]
pub struct PageImage {
    page: usize,
    path: TempPath,
}

impl PageImage {
    /// Reserve a fresh temporary `.png` path for page `page`.
    ///
    /// The file is created empty; the rasterizer overwrites it.
    pub fn create_png(page: usize) -> Result<Self, BackendError> {
        let file = tempfile::Builder::new()
            .prefix(&format!("syllabus-page-{page}-"))
            .suffix(".png")
            .tempfile()?;
        Ok(Self {
            page,
            path: file.into_temp_path(),
        })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the image now, reporting any filesystem error.
    pub fn close(self) -> Result<(), BackendError> {
        self.path.close().map_err(BackendError::Io)
    }
}
