//! Reinforcement schedule extraction: rules, association and orchestration.

mod associator;
mod document;
mod filter;
mod page;
pub mod rules;

pub use associator::{Association, CodeAssociator};
pub use document::DocumentExtractor;
pub use filter::{parse_code_list, CodeSet, ExtractionMode, ResultFilter};
pub use page::{PageExtraction, PageExtractor};
pub use rules::{
    clean_material_code, discover_circle_codes, validate_material_code, CircleCodeMatcher,
    MaterialCodeMatcher, TextNormalizer,
};
