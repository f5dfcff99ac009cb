//! Views over an extraction result.

use serde::{Deserialize, Serialize};

use crate::models::{CircleCode, ExtractionRecord, ExtractionResult};

/// User-supplied circle codes, in the order they were entered.
///
/// Membership is case-insensitive; entered casing is kept for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeSet {
    codes: Vec<String>,
}

impl CodeSet {
    /// Build a set, dropping blanks and case-insensitive duplicates.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for code in codes {
            let code = code.as_ref().trim();
            if !code.is_empty() && !set.contains_str(code) {
                set.codes.push(code.to_string());
            }
        }
        set
    }

    pub fn contains(&self, code: &CircleCode) -> bool {
        self.codes.iter().any(|c| code.matches(c))
    }

    fn contains_str(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c.eq_ignore_ascii_case(code))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Parse a comma separated code list such as `"T1, t2,,UT7a"`.
pub fn parse_code_list(input: &str) -> CodeSet {
    CodeSet::new(input.split(','))
}

/// Which view of a document's records to return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Every material code, with or without a circle code.
    #[default]
    AllMaterials,
    /// Only records that have a circle code.
    AllWithCircleCode,
    /// Only records whose circle code is one of the given codes.
    FilteredByCodes(CodeSet),
}

/// Non-mutating views over one [`ExtractionResult`].
///
/// Every view is a new result whose count table covers only the kept
/// records.
#[derive(Debug, Clone, Copy)]
pub struct ResultFilter<'a> {
    result: &'a ExtractionResult,
}

impl<'a> ResultFilter<'a> {
    pub fn new(result: &'a ExtractionResult) -> Self {
        Self { result }
    }

    /// Identity view.
    pub fn all(&self) -> ExtractionResult {
        self.result.clone()
    }

    /// Records that have any circle code.
    pub fn with_any_circle_code(&self) -> ExtractionResult {
        self.keep(|r| r.circle_code.is_some())
    }

    /// Records whose circle code case-insensitively equals one of `codes`.
    pub fn filtered_to(&self, codes: &CodeSet) -> ExtractionResult {
        self.keep(|r| r.circle_code.as_ref().is_some_and(|c| codes.contains(c)))
    }

    /// Select the view for `mode`. An empty code set selects everything.
    pub fn apply(&self, mode: &ExtractionMode) -> ExtractionResult {
        match mode {
            ExtractionMode::AllMaterials => self.all(),
            ExtractionMode::AllWithCircleCode => self.with_any_circle_code(),
            ExtractionMode::FilteredByCodes(codes) if codes.is_empty() => self.all(),
            ExtractionMode::FilteredByCodes(codes) => self.filtered_to(codes),
        }
    }

    fn keep<F>(&self, predicate: F) -> ExtractionResult
    where
        F: Fn(&ExtractionRecord) -> bool,
    {
        let records = self
            .result
            .records()
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        ExtractionResult::from_records(records, self.result.source())
    }
}
