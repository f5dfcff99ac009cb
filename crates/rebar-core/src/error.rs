//! Error types for the rebar-core library.

use thiserror::Error;

/// Main error type for the rebar library.
#[derive(Error, Debug)]
pub enum RebarError {
    /// Native text layer could not be read.
    #[error("text source error: {0}")]
    Source(#[from] SourceError),

    /// Page rendering failed.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the native (embedded) text layer.
///
/// The document extractor never surfaces these: any of them means
/// "no native records" and triggers the OCR pass.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from the PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// No document has been loaded yet.
    #[error("no document loaded")]
    NotLoaded,
}

/// Errors raised while turning pages into images.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The page carries no raster image that could be used.
    #[error("page {page} has no renderable image")]
    NoImage { page: u32 },

    /// The external rasterizer failed or is missing.
    #[error("rasterizer error: {0}")]
    Rasterize(String),

    /// A rendered or embedded image could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// Scratch files for the rasterizer could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// No document has been loaded yet.
    #[error("no document loaded")]
    NotLoaded,
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// No OCR backend is available for this run.
    #[error("OCR unavailable: {0}")]
    Unavailable(String),
}

/// Result type for the rebar library.
pub type Result<T> = std::result::Result<T, RebarError>;
