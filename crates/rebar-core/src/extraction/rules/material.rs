//! Material code matching, canonicalization and validation.
//!
//! Two surface forms are accepted, case-insensitively:
//!
//! - with length: `<int>Rfi[<int>(/<int>)*][cm][,]L=<number>m[']`
//! - spacing only: `<int>Rfi<int>/<int>cm`
//!
//! The first (leftmost) substring of a line satisfying either form is the
//! match; at equal positions the form with length wins.

use std::collections::HashSet;

use super::patterns::{
    CM_SPACING, DECIMAL_BEFORE_METRE, LENGTH_SEPARATOR, LOOSE_LENGTH, LOOSE_RFI, MATERIAL_CODE,
    MISSING_CM, RFI_SPACING, SLASH_SPACING, STRICT_MATERIAL_CODE, WHITESPACE,
};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::MaterialCode;

/// Material code matcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialCodeMatcher;

impl MaterialCodeMatcher {
    /// Create a new material code matcher.
    pub fn new() -> Self {
        Self
    }

    /// Every distinct canonical material code in `text`, first-seen order.
    pub fn distinct(&self, text: &str) -> Vec<MaterialCode> {
        let mut seen = HashSet::new();
        self.extract_all(text)
            .into_iter()
            .map(|m| m.value)
            .filter(|code| seen.insert(code.clone()))
            .collect()
    }
}

impl FieldExtractor for MaterialCodeMatcher {
    type Output = ExtractionMatch<MaterialCode>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        MATERIAL_CODE.find(text).map(|m| {
            ExtractionMatch::new(canonicalize_material_code(m.as_str()), m.as_str())
                .with_position(m.start(), m.end())
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        MATERIAL_CODE
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(canonicalize_material_code(m.as_str()), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Extract the first material code from text.
pub fn extract_material_code(text: &str) -> Option<MaterialCode> {
    MaterialCodeMatcher::new().extract(text).map(|m| m.value)
}

/// Canonical form of a matched code: no whitespace around `,L=`, `/`, `cm`
/// and `Rfi`, no trailing apostrophe.
pub fn canonicalize_material_code(matched: &str) -> MaterialCode {
    let code = LENGTH_SEPARATOR.replace_all(matched, ",L=");
    let code = SLASH_SPACING.replace_all(&code, "/");
    let code = CM_SPACING.replace_all(&code, "cm");
    let code = RFI_SPACING.replace_all(&code, "Rfi");
    MaterialCode::from_canonical(code.trim_end_matches('\'').to_string())
}

/// Strict gate: `<int>Rfi<int>/<int>cm,L=<int>[.<digits>]m`, nothing else.
pub fn validate_material_code(code: &str) -> bool {
    STRICT_MATERIAL_CODE.is_match(code)
}

/// Repair a loosely written material code and accept it only if it then
/// passes [`validate_material_code`].
///
/// Removes all whitespace, spells `rf`/`rfi` as `Rfi`, reads a decimal
/// comma before the metre suffix as a point and inserts a missing `cm`
/// before the length.
pub fn clean_material_code(raw: &str) -> Option<MaterialCode> {
    let clean = WHITESPACE.replace_all(raw, "");
    let clean = LOOSE_RFI.replace_all(&clean, "Rfi");
    let clean = LOOSE_LENGTH.replace_all(&clean, ",L=");
    let mut clean = DECIMAL_BEFORE_METRE.replace_all(&clean, ".${2}").into_owned();

    if !clean.to_lowercase().contains("cm") {
        clean = MISSING_CM.replace_all(&clean, "${1}cm,").into_owned();
    }

    validate_material_code(&clean).then(|| MaterialCode::from_canonical(clean))
}
