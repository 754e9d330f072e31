use std::path::Path;

use mupdf::{Colorspace, Document, ImageFormat, Matrix, TextPageFlags};

use syllabus_core::{BackendError, Page, PageImage, PageRasterizer, PdfBackend, PositionedRun};

/// Resolution pages are rendered at for OCR when none is configured.
pub const DEFAULT_DPI: u32 = 200;

/// MuPDF-based implementation of [`PdfBackend`] and [`PageRasterizer`].
///
/// Keeps the AGPL-3.0 mupdf dependency out of the parsing crates, which
/// only see [`Page`] values.
///
/// Each MuPDF text line becomes one [`PositionedRun`] anchored at the
/// origin of its first glyph. Lines are emitted in MuPDF's block order,
/// which follows the content stream's paint order.
pub struct MupdfBackend {
    dpi: u32,
}

impl Default for MupdfBackend {
    fn default() -> Self {
        Self { dpi: DEFAULT_DPI }
    }
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rasterization resolution. Values below 72 are clamped to 72.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi.max(72);
        self
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    fn open(path: &Path) -> Result<Document, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::Decode("invalid path encoding".into()))?;
        Document::open(path_str).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

impl PdfBackend for MupdfBackend {
    fn extract_pages(&self, path: &Path) -> Result<Vec<Page>, BackendError> {
        let document = Self::open(path)?;

        let mut pages = Vec::new();

        for (i, page_result) in document
            .pages()
            .map_err(|e| BackendError::Decode(e.to_string()))?
            .enumerate()
        {
            let page = page_result.map_err(|e| BackendError::Decode(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::Decode(e.to_string()))?;

            let mut runs = Vec::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let mut chars = line.chars().peekable();
                    let Some(origin) = chars.peek().map(|c| c.origin()) else {
                        continue;
                    };
                    let text: String = chars.map(|c| c.char().unwrap_or('\u{FFFD}')).collect();
                    if text.is_empty() {
                        continue;
                    }
                    runs.push(PositionedRun::new(text, origin.x, origin.y));
                }
            }

            tracing::trace!(page = i + 1, runs = runs.len(), "decoded page");
            pages.push(Page::new(i + 1, runs));
        }

        Ok(pages)
    }
}

impl PageRasterizer for MupdfBackend {
    fn page_count(&self, path: &Path) -> Result<usize, BackendError> {
        let document = Self::open(path)?;
        let count = document
            .page_count()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn rasterize(&self, path: &Path, page: usize) -> Result<PageImage, BackendError> {
        let rasterize_err = |message: String| BackendError::Rasterize { page, message };

        let document = Self::open(path)?;
        let index = page
            .checked_sub(1)
            .and_then(|i| i32::try_from(i).ok())
            .ok_or_else(|| rasterize_err(format!("invalid page number {page}")))?;
        let pdf_page = document
            .load_page(index)
            .map_err(|e| rasterize_err(e.to_string()))?;

        let scale = self.dpi as f32 / 72.0;
        let pixmap = pdf_page
            .to_pixmap(
                &Matrix::new_scale(scale, scale),
                &Colorspace::device_rgb(),
                false,
                false,
            )
            .map_err(|e| rasterize_err(e.to_string()))?;

        // Deleted on drop if saving fails
        let image = PageImage::create_png(page)?;
        let image_path = image
            .path()
            .to_str()
            .ok_or_else(|| rasterize_err("invalid temp path encoding".into()))?;
        pixmap
            .save_as(image_path, ImageFormat::PNG)
            .map_err(|e| rasterize_err(e.to_string()))?;

        tracing::debug!(page, dpi = self.dpi, path = %image.path().display(), "rasterized page");
        Ok(image)
    }
}
