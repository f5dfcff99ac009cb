//! Circle code association for matched material codes.

use tracing::trace;

use super::rules::{CircleCodeMatcher, FieldExtractor};
use crate::models::CircleCode;

/// How a circle code was found for a material code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Association {
    /// Found after the material code on the same line.
    SameLine(CircleCode),
    /// The next non-blank line is exactly one circle code.
    NextLine(CircleCode),
    /// No circle code belongs to the material code.
    Unassociated,
}

impl Association {
    pub fn code(&self) -> Option<&CircleCode> {
        match self {
            Association::SameLine(code) | Association::NextLine(code) => Some(code),
            Association::Unassociated => None,
        }
    }

    pub fn into_code(self) -> Option<CircleCode> {
        match self {
            Association::SameLine(code) | Association::NextLine(code) => Some(code),
            Association::Unassociated => None,
        }
    }
}

/// Resolves the circle code, if any, that belongs to a material code.
///
/// The rest of the material's line is searched first; the first strict
/// circle code found there wins. Otherwise the next non-blank line is
/// accepted only if, trimmed, it is a single circle code. Lines further
/// down are never examined.
#[derive(Debug, Clone, Default)]
pub struct CodeAssociator {
    matcher: CircleCodeMatcher,
}

impl CodeAssociator {
    pub fn new() -> Self {
        Self {
            matcher: CircleCodeMatcher::strict(),
        }
    }

    /// Associate the material code ending at byte `material_end` of
    /// `lines[index]`.
    pub fn associate(&self, lines: &[&str], index: usize, material_end: usize) -> Association {
        let Some(line) = lines.get(index) else {
            return Association::Unassociated;
        };

        let rest = line.get(material_end..).unwrap_or("");
        if let Some(found) = self.matcher.extract(rest) {
            trace!("Same-line circle code {} on line {}", found.value, index);
            return Association::SameLine(found.value);
        }

        let next = lines
            .iter()
            .skip(index + 1)
            .map(|l| l.trim())
            .find(|l| !l.is_empty());

        match next.and_then(|l| self.matcher.full_match(l)) {
            Some(code) => {
                trace!("Next-line circle code {} for line {}", code, index);
                Association::NextLine(code)
            }
            None => Association::Unassociated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MATERIAL: &str = "5Rfi12/8cm,L=3.5m";

    fn associate(lines: &[&str]) -> Association {
        CodeAssociator::new().associate(lines, 0, MATERIAL.len())
    }

    fn code(a: &Association) -> Option<&str> {
        a.code().map(CircleCode::as_str)
    }

    #[test]
    fn test_same_line() {
        let a = associate(&["5Rfi12/8cm,L=3.5m T1"]);
        assert_eq!(a, Association::SameLine(CircleCode::new("T1")));
    }

    #[test]
    fn test_same_line_wins_over_next_line() {
        let a = associate(&["5Rfi12/8cm,L=3.5m B2 T1", "UT7a"]);
        assert_eq!(code(&a), Some("B2"));
    }

    #[test]
    fn test_next_line_full_match() {
        let a = associate(&["5Rfi12/8cm,L=3.5m", "", "  ", "UT7a"]);
        assert_eq!(a, Association::NextLine(CircleCode::new("UT7a")));
    }

    #[test]
    fn test_next_line_partial_match_stops() {
        let a = associate(&["5Rfi12/8cm,L=3.5m", "UT7a extra text", "T1"]);
        assert_eq!(a, Association::Unassociated);
    }

    #[test]
    fn test_no_following_line() {
        assert_eq!(associate(&["5Rfi12/8cm,L=3.5m", "", ""]), Association::Unassociated);
        assert_eq!(
            CodeAssociator::new().associate(&[], 0, 0),
            Association::Unassociated
        );
    }

    #[test]
    fn test_text_before_material_is_ignored() {
        let line = "T9 5Rfi12/8cm,L=3.5m";
        let a = CodeAssociator::new().associate(&[line], 0, line.len());
        assert_eq!(a, Association::Unassociated);
    }

    #[test]
    fn test_deterministic() {
        let lines = ["5Rfi12/8cm,L=3.5m", "14"];
        let first = associate(&lines);
        for _ in 0..10 {
            assert_eq!(associate(&lines), first);
        }
        assert_eq!(code(&first), Some("14"));
    }
}
