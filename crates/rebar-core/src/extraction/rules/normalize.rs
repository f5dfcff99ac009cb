//! Deterministic cleanup of native and OCR text into trimmed lines.

use std::borrow::Cow;

use super::patterns::{
    COMMA_BEFORE_LENGTH, HORIZONTAL_SPACE, LENGTH_LABEL, NOISE_CHARS, PERIOD_RUN,
    SPACE_BEFORE_APOSTROPHE, SPACE_BEFORE_COMMA, WRAPPED_CODE,
};

/// Literal OCR confusions that need the quote characters still present.
const QUOTE_SUBSTITUTIONS: &[(&str, &str)] = &[("m'", "m"), ("m\"", "m")];

/// Literal OCR confusions applied after noise stripping.
const CONFUSION_SUBSTITUTIONS: &[(&str, &str)] =
    &[("\u{FB01}", "fi"), ("\u{FB02}", "fl"), ("em", "cm")];

/// Text normalizer shared by the native and OCR paths.
///
/// Line breaks survive normalization: every output line is trimmed and has
/// its inner whitespace collapsed to single spaces, blank lines stay in
/// place so "next non-empty line" lookups see the original line order.
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    rejoin_wrapped: bool,
}

impl TextNormalizer {
    /// Create a normalizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejoin material codes hyphen-wrapped across a line break.
    pub fn with_rejoin_wrapped(mut self, rejoin: bool) -> Self {
        self.rejoin_wrapped = rejoin;
        self
    }

    /// Normalize raw page text.
    ///
    /// Each substitution table runs once, never to a fixpoint. Noise is
    /// stripped before the confusion table so that `normalize` applied to
    /// its own output is a no-op.
    pub fn normalize(&self, raw: &str) -> String {
        let text: String = raw
            .chars()
            .filter(|&c| c != '\r')
            .map(|c| match c {
                '\u{2018}' | '\u{2019}' => '\'',
                c => c,
            })
            .collect();

        let mut text = replace_literals(text, QUOTE_SUBSTITUTIONS);
        text = SPACE_BEFORE_APOSTROPHE.replace_all(&text, "'").into_owned();
        text = NOISE_CHARS.replace_all(&text, "").into_owned();

        text = replace_literals(text, CONFUSION_SUBSTITUTIONS);
        text = PERIOD_RUN.replace_all(&text, ".").into_owned();
        text = SPACE_BEFORE_COMMA.replace_all(&text, ",").into_owned();
        text = COMMA_BEFORE_LENGTH.replace_all(&text, ",L").into_owned();
        text = LENGTH_LABEL.replace_all(&text, "L=").into_owned();

        if self.rejoin_wrapped {
            text = rejoin_wrapped_codes(&text).into_owned();
        }

        collapse_whitespace(&text)
    }
}

fn replace_literals(mut text: String, table: &[(&str, &str)]) -> String {
    for (wrong, right) in table {
        if text.contains(wrong) {
            text = text.replace(wrong, right);
        }
    }
    text
}

/// Collapse horizontal whitespace per line, trim lines and the whole text.
fn collapse_whitespace(text: &str) -> String {
    let lines: Vec<Cow<'_, str>> = text
        .split('\n')
        .map(|line| HORIZONTAL_SPACE.replace_all(line.trim(), " "))
        .collect();
    lines.join("\n").trim().to_string()
}

/// Join material codes split by a trailing hyphen and a line break.
///
/// `5Rfi12/8cm,L=3.-\n5m` becomes `5Rfi12/8cm,L=3.5m`. Repeated until no
/// wrapped code remains, so a code broken over several lines is joined
/// completely.
pub fn rejoin_wrapped_codes(text: &str) -> Cow<'_, str> {
    if !WRAPPED_CODE.is_match(text) {
        return Cow::Borrowed(text);
    }

    let mut joined = text.to_string();
    while WRAPPED_CODE.is_match(&joined) {
        joined = WRAPPED_CODE.replace_all(&joined, "${1}${2}").into_owned();
    }
    Cow::Owned(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn normalize(text: &str) -> String {
        TextNormalizer::new().normalize(text)
    }

    #[test]
    fn test_apostrophes_and_carriage_returns() {
        assert_eq!(
            normalize("5Rfi12/8cm,L=3.5m\u{2019} T1\r\nnext"),
            "5Rfi12/8cm,L=3.5m T1\nnext"
        );
        assert_eq!(normalize("it's"), "its");
    }

    #[test]
    fn test_ocr_confusions() {
        assert_eq!(normalize("5R\u{FB01}12/8em , L = 3..5m"), "5Rfi12/8cm,L=3.5m");
        assert_eq!(normalize("2Rfi10/20em"), "2Rfi10/20cm");
        assert_eq!(normalize("L=4m\" B2"), "L=4m B2");
    }

    #[test]
    fn test_noise_characters_removed() {
        assert_eq!(normalize("| T1 | ~5Rfi8/15cm_ ; !"), "T1 5Rfi8/15cm");
    }

    #[test]
    fn test_lines_preserved() {
        let text = "  first   line  \n\n\t second\tline\n   \n";
        assert_eq!(normalize(text), "first line\n\nsecond line");
    }

    #[test]
    fn test_empty_result() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" | ' ; \n _ "), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "5Rfi12/8cm,L=3.5m' T1",
            "e|m and .|. and L |= 3 and x |, y",
            "L  =  4 ,  5 ''' m' m\" \u{2019}\u{2018}",
            "....  ..... \u{FB01}\u{FB02} eem emem",
            "\r\n\r\n  a \u{a0} b \r\n c-\n5",
            "7Rfi8/10cm,L=2.-\n5m\n\n T2",
            "",
        ];

        for normalizer in [TextNormalizer::new(), TextNormalizer::new().with_rejoin_wrapped(true)] {
            for sample in samples {
                let once = normalizer.normalize(sample);
                let twice = normalizer.normalize(&once);
                assert_eq!(once, twice, "not idempotent for {:?}", sample);
            }
        }
    }

    #[test]
    fn test_rejoin_wrapped_codes() {
        let normalizer = TextNormalizer::new().with_rejoin_wrapped(true);
        assert_eq!(
            normalizer.normalize("7Rfi8/10cm,L=2.-\n  5m T3"),
            "7Rfi8/10cm,L=2.5m T3"
        );

        // Only codes are rejoined, ordinary hyphenation is left alone.
        assert_eq!(normalizer.normalize("well-\n5 known"), "well-\n5 known");
        assert_eq!(normalize("7Rfi8/10cm,L=2.-\n5m"), "7Rfi8/10cm,L=2.-\n5m");
    }

    #[test]
    fn test_rejoin_repeats_until_done() {
        assert_eq!(rejoin_wrapped_codes("1Rfi1-\n2-\n3"), "1Rfi123");
        assert!(matches!(rejoin_wrapped_codes("plain"), Cow::Borrowed(_)));
    }
}
