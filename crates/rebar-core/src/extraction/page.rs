//! Single-page extraction: normalize, match, associate.

use tracing::{debug, trace};

use super::associator::CodeAssociator;
use super::filter::CodeSet;
use super::rules::{validate_material_code, FieldExtractor, MaterialCodeMatcher, TextNormalizer};
use crate::models::{CountTable, ExtractionConfig, ExtractionRecord, PageId};

/// Records and counts found on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageExtraction {
    pub page: PageId,
    pub records: Vec<ExtractionRecord>,
    pub counts: CountTable,
}

impl PageExtraction {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Runs the extraction rules over one page of text.
#[derive(Debug, Clone, Default)]
pub struct PageExtractor {
    normalizer: TextNormalizer,
    materials: MaterialCodeMatcher,
    associator: CodeAssociator,
    strict_validation: bool,
}

impl PageExtractor {
    /// Create a page extractor with default settings.
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            materials: MaterialCodeMatcher::new(),
            associator: CodeAssociator::new(),
            strict_validation: false,
        }
    }

    /// Create a page extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_rejoin_wrapped(config.rejoin_wrapped_codes)
            .with_strict_validation(config.strict_validation)
    }

    /// Rejoin hyphen-wrapped material codes before matching.
    pub fn with_rejoin_wrapped(mut self, rejoin: bool) -> Self {
        self.normalizer = self.normalizer.with_rejoin_wrapped(rejoin);
        self
    }

    /// Drop material codes that fail the strict validator.
    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Extract every material code on a page.
    ///
    /// `target_codes` does not narrow the output; filtering happens on the
    /// finished document result.
    pub fn extract_page(
        &self,
        raw_text: &str,
        target_codes: Option<&CodeSet>,
        page: PageId,
    ) -> PageExtraction {
        if let Some(codes) = target_codes.filter(|c| !c.is_empty()) {
            trace!("Page {}: {} target codes requested", page, codes.len());
        }

        let text = self.normalizer.normalize(raw_text);
        let lines: Vec<&str> = text.split('\n').collect();

        let mut records = Vec::new();
        let mut counts = CountTable::new();

        for (index, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }

            let Some(found) = self.materials.extract(line) else {
                continue;
            };

            if self.strict_validation && !validate_material_code(found.value.as_str()) {
                trace!("Page {}: rejected {} (strict)", page, found.value);
                continue;
            }

            let circle_code = self
                .associator
                .associate(&lines, index, found.end())
                .into_code();

            trace!(
                "Page {}: {:?} as {} -> {}",
                page,
                found.source,
                found.value,
                circle_code.as_ref().map_or("-", |c| c.as_str())
            );

            if let Some(code) = &circle_code {
                counts.increment(code);
            }
            records.push(ExtractionRecord {
                circle_code,
                material_code: found.value,
                page,
            });
        }

        debug!(
            "Page {}: {} records, {} with circle code",
            page,
            records.len(),
            counts.total()
        );

        PageExtraction {
            page,
            records,
            counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::filter::parse_code_list;
    use pretty_assertions::assert_eq;

    fn extract(text: &str) -> PageExtraction {
        PageExtractor::new().extract_page(text, None, PageId::new(3))
    }

    fn pairs(page: &PageExtraction) -> Vec<(Option<&str>, &str)> {
        page.records
            .iter()
            .map(|r| {
                (
                    r.circle_code.as_ref().map(|c| c.as_str()),
                    r.material_code.as_str(),
                )
            })
            .collect()
    }

    #[test]
    fn test_same_line_code() {
        let page = extract("5Rfi12/8cm,L=3.5m' T1");
        assert_eq!(pairs(&page), vec![(Some("T1"), "5Rfi12/8cm,L=3.5m")]);
        assert_eq!(page.records[0].page, PageId::new(3));
        assert_eq!(page.counts.get("T1"), 1);
    }

    #[test]
    fn test_next_line_code() {
        let page = extract("5Rfi12/8cm,L=3.5m'\n\n   \nUT7a\n");
        assert_eq!(pairs(&page), vec![(Some("UT7a"), "5Rfi12/8cm,L=3.5m")]);
    }

    #[test]
    fn test_next_line_not_full_match() {
        let page = extract("5Rfi12/8cm,L=3.5m'\nUT7a extra text");
        assert_eq!(pairs(&page), vec![(None, "5Rfi12/8cm,L=3.5m")]);
        assert!(page.counts.is_empty());
    }

    #[test]
    fn test_line_without_material() {
        let page = extract("SECTION A-A\nT1 T2 T3");
        assert!(page.is_empty());
        assert!(page.counts.is_empty());
    }

    #[test]
    fn test_one_material_per_line() {
        let page = extract("2Rfi10/20cm 5Rfi12/8cm,L=3.5m T1");
        assert_eq!(pairs(&page), vec![(Some("5"), "2Rfi10/20cm")]);
    }

    #[test]
    fn test_noisy_ocr_text() {
        let page = extract("| 5R\u{FB01}12/8em , L = 3..5m\u{2019} | T1 |\r\n4Rfi8/15cm,L=2m\r\n\r\nB2");
        assert_eq!(
            pairs(&page),
            vec![
                (Some("T1"), "5Rfi12/8cm,L=3.5m"),
                (Some("B2"), "4Rfi8/15cm,L=2m"),
            ]
        );
        assert_eq!(page.counts.total(), 2);
    }

    #[test]
    fn test_target_codes_do_not_filter() {
        let text = "5Rfi12/8cm,L=3.5m T1\n4Rfi8/15cm,L=2m T2";
        let codes = parse_code_list("T1");
        let targeted = PageExtractor::new().extract_page(text, Some(&codes), PageId::new(1));
        let untargeted = PageExtractor::new().extract_page(text, None, PageId::new(1));
        assert_eq!(targeted, untargeted);
        assert_eq!(targeted.records.len(), 2);
    }

    #[test]
    fn test_strict_validation() {
        let text = "5Rfi12/8cm,L=3.5m T1\n2Rfi10/20cm T2";
        let lenient = PageExtractor::new().extract_page(text, None, PageId::new(1));
        let strict = PageExtractor::new()
            .with_strict_validation(true)
            .extract_page(text, None, PageId::new(1));

        assert_eq!(lenient.records.len(), 2);
        assert_eq!(pairs(&strict), vec![(Some("T1"), "5Rfi12/8cm,L=3.5m")]);
        assert_eq!(strict.counts.get("T2"), 0);
    }

    #[test]
    fn test_rejoin_wrapped() {
        let text = "7Rfi8/10cm,L=2.-\n5m T3";
        // Unjoined, the broken length is read as a spacing code and its
        // stray digit as the circle code.
        assert_eq!(pairs(&extract(text)), vec![(Some("2"), "7Rfi8/10cm")]);

        let page = PageExtractor::from_config(&ExtractionConfig {
            rejoin_wrapped_codes: true,
            strict_validation: false,
        })
        .extract_page(text, None, PageId::new(1));
        assert_eq!(pairs(&page), vec![(Some("T3"), "7Rfi8/10cm,L=2.5m")]);
    }

    #[test]
    fn test_count_consistency() {
        let page = extract("5Rfi12/8cm,L=3.5m T1\n2Rfi10/20cm\nfoo\n4Rfi8/15cm,L=2m T1\n6Rfi8/15cm,L=2m\n12");
        let with_code = page.records.iter().filter(|r| r.circle_code.is_some()).count();
        assert_eq!(page.counts.total(), with_code);
        assert_eq!(page.counts.get("T1"), 2);
    }
}
