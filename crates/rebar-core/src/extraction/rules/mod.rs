//! Rule-based matchers for reinforcement schedule text.

pub mod circle;
pub mod material;
pub mod normalize;
pub mod patterns;

pub use circle::{discover_circle_codes, CircleCodeMatcher, CirclePattern};
pub use material::{
    canonicalize_material_code, clean_material_code, extract_material_code,
    validate_material_code, MaterialCodeMatcher,
};
pub use normalize::{rejoin_wrapped_codes, TextNormalizer};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first (leftmost) occurrence of the field.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all non-overlapping occurrences, left to right.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A matched value with the span it was found at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte span `[start, end)` in the searched text.
    pub position: (usize, usize),
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: (0, 0),
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = (start, end);
        self
    }

    pub fn start(&self) -> usize {
        self.position.0
    }

    pub fn end(&self) -> usize {
        self.position.1
    }
}
