//! Data models shared across the extraction pipeline.

pub mod config;
pub mod record;

pub use config::{ExtractionConfig, ModelConfig, OcrConfig, PdfConfig, RebarConfig};
pub use record::{
    CircleCode, CountTable, ExtractionRecord, ExtractionResult, MaterialCode, PageId, TextSource,
};
