//! Circle code (drawing label) matching.

use std::collections::BTreeSet;

use regex::Regex;

use super::patterns::{CIRCLE_CODE_GENERIC, CIRCLE_CODE_STRICT, CIRCLE_CODE_STRICT_FULL};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::CircleCode;

/// Circle code grammar to match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CirclePattern {
    /// Any word-bounded run of 1-5 alphanumerics, except `0`.
    Generic,
    /// One or two uppercase letters, 1-2 digits and an optional lowercase
    /// letter (`T1`, `UT7a`), or a bare 1-3 digit number.
    #[default]
    Strict,
}

/// Circle code matcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct CircleCodeMatcher {
    pattern: CirclePattern,
}

impl CircleCodeMatcher {
    pub fn new(pattern: CirclePattern) -> Self {
        Self { pattern }
    }

    /// Matcher used when associating a code with a material.
    pub fn strict() -> Self {
        Self::new(CirclePattern::Strict)
    }

    /// Matcher used for whole-document discovery.
    pub fn generic() -> Self {
        Self::new(CirclePattern::Generic)
    }

    pub fn pattern(&self) -> CirclePattern {
        self.pattern
    }

    fn regex(&self) -> &'static Regex {
        match self.pattern {
            CirclePattern::Generic => &*CIRCLE_CODE_GENERIC,
            CirclePattern::Strict => &*CIRCLE_CODE_STRICT,
        }
    }

    /// Whether the whole (trimmed) text is a single circle code.
    ///
    /// Returns the code in its original casing.
    pub fn full_match(&self, text: &str) -> Option<CircleCode> {
        let text = text.trim();
        let accepted = match self.pattern {
            CirclePattern::Strict => CIRCLE_CODE_STRICT_FULL.is_match(text),
            CirclePattern::Generic => CIRCLE_CODE_GENERIC
                .find(text)
                .is_some_and(|m| m.start() == 0 && m.end() == text.len() && text != "0"),
        };
        accepted.then(|| CircleCode::new(text))
    }

    fn matches(&self, text: &str) -> impl Iterator<Item = ExtractionMatch<CircleCode>> {
        let generic = self.pattern == CirclePattern::Generic;
        self.regex()
            .find_iter(text)
            .filter(move |m| !(generic && m.as_str() == "0"))
            .map(|m| {
                ExtractionMatch::new(CircleCode::new(m.as_str()), m.as_str())
                    .with_position(m.start(), m.end())
            })
    }

    /// Every distinct code in `text`, upper-cased.
    pub fn discover(&self, text: &str) -> BTreeSet<String> {
        self.extract_all(text)
            .into_iter()
            .map(|m| m.value.key())
            .collect()
    }
}

impl FieldExtractor for CircleCodeMatcher {
    type Output = ExtractionMatch<CircleCode>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.matches(text).next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.matches(text).collect()
    }
}

/// Discover circle codes in a whole document with the generic pattern.
pub fn discover_circle_codes(text: &str) -> BTreeSet<String> {
    CircleCodeMatcher::generic().discover(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn first_strict(text: &str) -> Option<String> {
        CircleCodeMatcher::strict()
            .extract(text)
            .map(|m| m.value.to_string())
    }

    #[test]
    fn test_strict_substring() {
        assert_eq!(first_strict(" T1"), Some("T1".to_string()));
        assert_eq!(first_strict(" UT7a rest"), Some("UT7a".to_string()));
        assert_eq!(first_strict(" pos 12"), Some("12".to_string()));
        assert_eq!(first_strict(" top bottom"), None);
        // Leftmost wins, no scoring.
        assert_eq!(first_strict(" 4 T1"), Some("4".to_string()));
    }

    #[test]
    fn test_strict_is_case_sensitive() {
        assert_eq!(first_strict(" t"), None);
        assert_eq!(first_strict(" ut7a"), Some("7".to_string()));
    }

    #[test]
    fn test_strict_full_match() {
        let matcher = CircleCodeMatcher::strict();
        assert_eq!(matcher.full_match("  UT7a ").map(|c| c.to_string()), Some("UT7a".to_string()));
        assert_eq!(matcher.full_match("123").map(|c| c.to_string()), Some("123".to_string()));
        assert!(matcher.full_match("UT7a extra text").is_none());
        assert!(matcher.full_match("1234").is_none());
        assert!(matcher.full_match("ABC1").is_none());
        assert!(matcher.full_match("").is_none());
    }

    #[test]
    fn test_generic_full_match() {
        let matcher = CircleCodeMatcher::generic();
        assert!(matcher.full_match("pos1").is_some());
        assert!(matcher.full_match("0").is_none());
        assert!(matcher.full_match("toolong").is_none());
    }

    #[test]
    fn test_discover() {
        let codes = discover_circle_codes("T1 t1 UT7a 0 10 longword\nB-2");
        let codes: Vec<&str> = codes.iter().map(String::as_str).collect();
        assert_eq!(codes, vec!["10", "2", "B", "T1", "UT7A"]);
    }

    #[test]
    fn test_discover_is_deterministic() {
        let text = "Z9 A1 M3 A1 z9";
        assert_eq!(discover_circle_codes(text), discover_circle_codes(text));
        assert_eq!(discover_circle_codes(text).len(), 3);
    }
}
