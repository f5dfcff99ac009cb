//! PDF text sources and page rendering.

mod extractor;
mod rasterizer;

pub use extractor::PdfExtractor;
pub use rasterizer::Rasterizer;

use crate::error::{RenderError, SourceError};
use image::DynamicImage;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains extractable text.
    Text,
    /// Contains only images (scanned drawing).
    Image,
    /// Contains both text and images.
    Hybrid,
    /// Empty or unreadable.
    Empty,
}

impl PdfType {
    /// Whether native text extraction can be expected to find anything.
    pub fn has_text_layer(self) -> bool {
        matches!(self, PdfType::Text | PdfType::Hybrid)
    }
}

/// Per-page text from a document's embedded text layer.
pub trait NativeTextSource {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Text of one page (1-indexed).
    fn page_text(&self, page: u32) -> Result<String, SourceError>;

    /// Text of the whole document.
    fn full_text(&self) -> Result<String, SourceError> {
        let mut text = String::new();
        for page in 1..=self.page_count() {
            if page > 1 {
                text.push('\n');
            }
            text.push_str(&self.page_text(page)?);
        }
        Ok(text)
    }
}

/// Turns document pages into images for OCR.
pub trait PageRenderer {
    /// Render every page, in page order, at the given resolution.
    fn render_pages(&self, dpi: u32) -> Result<Vec<DynamicImage>, RenderError>;
}
