//! Extraction records and aggregate results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical material code, e.g. `5Rfi12/8cm,L=3.5m`.
///
/// Only the matcher and the cleaning utility construct these, so every
/// value satisfies the material-code grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialCode(String);

impl MaterialCode {
    pub(crate) fn from_canonical(code: String) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MaterialCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MaterialCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Drawing label such as `T1`, `UT7a` or `14`.
///
/// Keeps the casing it was found with; comparisons used for counting and
/// filtering go through [`CircleCode::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CircleCode(String);

impl CircleCode {
    pub(crate) fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-normalized form used as the count key.
    pub fn key(&self) -> String {
        self.0.to_uppercase()
    }

    /// Case-insensitive comparison against a user-supplied code.
    pub fn matches(&self, other: &str) -> bool {
        self.key() == other.trim().to_uppercase()
    }
}

impl fmt::Display for CircleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(u32);

impl PageId {
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    pub fn number(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One material code found on a page, with its circle code if one could be
/// associated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// Associated drawing label; `None` is a normal outcome.
    pub circle_code: Option<CircleCode>,
    /// Canonical material code.
    pub material_code: MaterialCode,
    /// Page the code was found on.
    pub page: PageId,
}

/// Occurrences per circle code, keyed by the upper-cased code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountTable {
    counts: BTreeMap<String, usize>,
}

impl CountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn increment(&mut self, code: &CircleCode) {
        *self.counts.entry(code.key()).or_insert(0) += 1;
    }

    pub(crate) fn merge(&mut self, other: &CountTable) {
        for (code, count) in &other.counts {
            *self.counts.entry(code.clone()).or_insert(0) += count;
        }
    }

    /// Count for a code, compared case-insensitively.
    pub fn get(&self, code: &str) -> usize {
        self.counts
            .get(&code.trim().to_uppercase())
            .copied()
            .unwrap_or(0)
    }

    /// Iterate `(key, count)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Where the text of a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    /// Embedded text layer of the document.
    Native,
    /// OCR of rendered page images.
    Ocr,
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSource::Native => f.write_str("native"),
            TextSource::Ocr => f.write_str("ocr"),
        }
    }
}

/// Records of one document pass in scan order, plus their counts.
///
/// Fields are private so the count table can only change together with
/// the record list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    records: Vec<ExtractionRecord>,
    counts: CountTable,
    source: TextSource,
}

impl ExtractionResult {
    /// Create an empty result.
    pub fn empty(source: TextSource) -> Self {
        Self {
            records: Vec::new(),
            counts: CountTable::new(),
            source,
        }
    }

    /// Build a result from records, computing the count table.
    pub fn from_records(records: Vec<ExtractionRecord>, source: TextSource) -> Self {
        let mut result = Self::empty(source);
        for record in records {
            result.push(record);
        }
        result
    }

    pub(crate) fn push(&mut self, record: ExtractionRecord) {
        if let Some(code) = &record.circle_code {
            self.counts.increment(code);
        }
        self.records.push(record);
    }

    /// Append one page's output; records keep page order.
    pub(crate) fn append_page(&mut self, records: Vec<ExtractionRecord>, counts: &CountTable) {
        self.records.extend(records);
        self.counts.merge(counts);
    }

    pub fn records(&self) -> &[ExtractionRecord] {
        &self.records
    }

    pub fn counts(&self) -> &CountTable {
        &self.counts
    }

    pub fn source(&self) -> TextSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records that carry a circle code.
    pub fn with_code_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.circle_code.is_some())
            .count()
    }

    /// Count for one circle code, compared case-insensitively.
    pub fn count_for(&self, code: &str) -> usize {
        self.counts.get(code)
    }

    pub fn into_records(self) -> Vec<ExtractionRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(code: Option<&str>, material: &str, page: u32) -> ExtractionRecord {
        ExtractionRecord {
            circle_code: code.map(CircleCode::new),
            material_code: MaterialCode::from_canonical(material.to_string()),
            page: PageId::new(page),
        }
    }

    #[test]
    fn test_counts_follow_records() {
        let result = ExtractionResult::from_records(
            vec![
                record(Some("T1"), "5Rfi12/8cm,L=3.5m", 1),
                record(None, "2Rfi10/20cm", 1),
                record(Some("t1"), "4Rfi8/15cm,L=2m", 2),
                record(Some("UT7a"), "4Rfi8/15cm,L=2m", 2),
            ],
            TextSource::Native,
        );

        assert_eq!(result.len(), 4);
        assert_eq!(result.with_code_count(), 3);
        assert_eq!(result.counts().total(), result.with_code_count());
        assert_eq!(result.count_for("T1"), 2);
        assert_eq!(result.count_for("ut7A"), 1);
        assert_eq!(result.count_for("B2"), 0);
    }

    #[test]
    fn test_circle_code_keeps_case() {
        let code = CircleCode::new("UT7a");
        assert_eq!(code.as_str(), "UT7a");
        assert_eq!(code.key(), "UT7A");
        assert!(code.matches(" ut7a "));
        assert!(!code.matches("UT7"));
    }

    #[test]
    fn test_append_page_merges_counts() {
        let mut result = ExtractionResult::empty(TextSource::Ocr);
        let mut counts = CountTable::new();
        counts.increment(&CircleCode::new("T1"));
        result.append_page(vec![record(Some("T1"), "5Rfi12/8cm,L=3.5m", 3)], &counts);
        result.append_page(vec![record(Some("T1"), "5Rfi12/8cm,L=3.5m", 4)], &counts);

        assert_eq!(result.count_for("t1"), 2);
        assert_eq!(result.records()[1].page, PageId::new(4));
        assert_eq!(result.source(), TextSource::Ocr);
    }
}
