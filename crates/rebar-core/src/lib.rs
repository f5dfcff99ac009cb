//! Core library for extracting reinforcement schedules from drawings.
//!
//! This crate provides:
//! - Text normalization for native and OCR text
//! - Material code and circle code matching
//! - Circle code association and per-code counts
//! - Native-text-first document extraction with OCR fallback
//! - PDF text layer reading and page rendering via pdftoppm or embedded scans

pub mod error;
pub mod extraction;
pub mod models;
pub mod ocr;
pub mod pdf;

pub use error::{OcrError, RebarError, RenderError, Result, SourceError};
pub use extraction::{
    clean_material_code, discover_circle_codes, parse_code_list, validate_material_code,
    CodeSet, DocumentExtractor, ExtractionMode, PageExtractor, ResultFilter, TextNormalizer,
};
pub use models::{
    CircleCode, CountTable, ExtractionRecord, ExtractionResult, MaterialCode, PageId, RebarConfig,
    TextSource,
};
pub use ocr::{DisabledOcr, ImagePreprocessor, OcrBackend, OcrMode};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pdf::{NativeTextSource, PageRenderer, PdfExtractor, PdfType, Rasterizer};
