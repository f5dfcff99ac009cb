//! OCR backends and layout of recognized text into lines.

mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;

pub use preprocessing::ImagePreprocessor;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use std::cmp::Ordering;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// How recognized text boxes are laid out into lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrMode {
    /// Treat the page as one block: boxes on the same row share a line.
    #[default]
    UniformBlock,
    /// Scattered labels: every box is its own line.
    Sparse,
}

/// Converts a page image into text.
pub trait OcrBackend {
    /// Recognize the text of one page image.
    fn recognize(&self, image: &DynamicImage, mode: OcrMode) -> Result<String, OcrError>;

    /// Fail with the reason this backend cannot run, if any.
    fn check_available(&self) -> Result<(), OcrError> {
        Ok(())
    }

    /// Whether this backend can run at all.
    fn is_available(&self) -> bool {
        self.check_available().is_ok()
    }
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(&self, image: &DynamicImage, mode: OcrMode) -> Result<String, OcrError> {
        (**self).recognize(image, mode)
    }

    fn check_available(&self) -> Result<(), OcrError> {
        (**self).check_available()
    }
}

/// Backend that refuses to run, used when OCR is turned off.
#[derive(Debug, Clone)]
pub struct DisabledOcr {
    reason: String,
}

impl DisabledOcr {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl OcrBackend for DisabledOcr {
    fn recognize(&self, _image: &DynamicImage, _mode: OcrMode) -> Result<String, OcrError> {
        Err(OcrError::Unavailable(self.reason.clone()))
    }

    fn check_available(&self) -> Result<(), OcrError> {
        Err(OcrError::Unavailable(self.reason.clone()))
    }
}

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the center point of the bounding box.
    pub fn center(&self) -> (f32, f32) {
        let x = (self.bbox[0] + self.bbox[2] + self.bbox[4] + self.bbox[6]) / 4.0;
        let y = (self.bbox[1] + self.bbox[3] + self.bbox[5] + self.bbox[7]) / 4.0;
        (x, y)
    }

    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Detected and recognized text boxes.
    pub boxes: Vec<TextBox>,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Create an empty result.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            boxes: Vec::new(),
            processing_time_ms: 0,
            image_size: (width, height),
        }
    }

    /// Mean recognition confidence over all boxes, if any were found.
    pub fn mean_confidence(&self) -> Option<f32> {
        if self.boxes.is_empty() {
            return None;
        }
        let total: f32 = self.boxes.iter().map(|b| b.confidence).sum();
        Some(total / self.boxes.len() as f32)
    }

    /// Group boxes into rows, top to bottom, each row left to right.
    ///
    /// A box starts a new row when its top edge lies more than
    /// `row_tolerance` pixels below the top edge of the row's first box.
    pub fn rows(&self, row_tolerance: f32) -> Vec<Vec<&TextBox>> {
        let mut boxes: Vec<&TextBox> = self.boxes.iter().collect();
        boxes.sort_by(|a, b| compare_f32(a.rect().1, b.rect().1));

        let mut rows: Vec<Vec<&TextBox>> = Vec::new();
        let mut row_top = f32::NEG_INFINITY;

        for text_box in boxes {
            let top = text_box.rect().1;
            match rows.last_mut() {
                Some(row) if top - row_top <= row_tolerance => row.push(text_box),
                _ => {
                    row_top = top;
                    rows.push(vec![text_box]);
                }
            }
        }

        for row in &mut rows {
            row.sort_by(|a, b| compare_f32(a.rect().0, b.rect().0));
        }
        rows
    }

    /// Lay the recognized boxes out as text.
    pub fn to_text(&self, mode: OcrMode, row_tolerance: f32) -> String {
        let rows = self.rows(row_tolerance);
        let lines: Vec<String> = match mode {
            OcrMode::UniformBlock => rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| b.text.trim())
                        .filter(|t| !t.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect(),
            OcrMode::Sparse => rows
                .iter()
                .flatten()
                .map(|b| b.text.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        };
        lines.join("\n")
    }
}

fn compare_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
