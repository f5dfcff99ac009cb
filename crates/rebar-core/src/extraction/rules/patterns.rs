//! Common regex patterns for reinforcement schedule extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Material codes. `length` (with an `L=` suffix) is listed first so it
    // wins over `spacing` when both start at the same position.
    pub static ref MATERIAL_CODE: Regex = Regex::new(
        r"(?i)(?P<length>\d+Rfi(?:\d+(?:/\d+)*)?(?:cm)?,?L=\d+\.?\d*m'?)|(?P<spacing>\d+Rfi\d+/\d+cm)"
    ).unwrap();

    pub static ref STRICT_MATERIAL_CODE: Regex = Regex::new(
        r"(?i)^\d+Rfi\d+/\d+cm,L=\d+(?:\.\d+)?m$"
    ).unwrap();

    // Canonical spacing inside a matched material code
    pub static ref LENGTH_SEPARATOR: Regex = Regex::new(r"\s*,\s*L\s*=\s*").unwrap();
    pub static ref SLASH_SPACING: Regex = Regex::new(r"\s*/\s*").unwrap();
    pub static ref CM_SPACING: Regex = Regex::new(r"\s*cm\s*").unwrap();
    pub static ref RFI_SPACING: Regex = Regex::new(r"\s*Rfi\s*").unwrap();

    // Cleaning utility
    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    pub static ref LOOSE_RFI: Regex = Regex::new(r"(?i)rfi?").unwrap();
    pub static ref LOOSE_LENGTH: Regex = Regex::new(r",\s*L\s*=").unwrap();
    pub static ref DECIMAL_BEFORE_METRE: Regex = Regex::new(r"([.,])(\d*m)").unwrap();
    pub static ref MISSING_CM: Regex = Regex::new(r"(?i)(\d+rfi\d+(?:/\d+)*),").unwrap();

    // Circle codes
    pub static ref CIRCLE_CODE_GENERIC: Regex = Regex::new(
        r"(?i)\b[A-Za-z0-9]{1,5}\b"
    ).unwrap();

    pub static ref CIRCLE_CODE_STRICT: Regex = Regex::new(
        r"[A-Z]{1,2}\d{1,2}[a-z]?|\d{1,3}"
    ).unwrap();

    pub static ref CIRCLE_CODE_STRICT_FULL: Regex = Regex::new(
        r"^(?:[A-Z]{1,2}\d{1,2}[a-z]?|\d{1,3})$"
    ).unwrap();

    // Text normalization. `[^\S\n]` is whitespace other than a line break.
    pub static ref HORIZONTAL_SPACE: Regex = Regex::new(r"[^\S\n]+").unwrap();
    pub static ref SPACE_BEFORE_APOSTROPHE: Regex = Regex::new(r"[^\S\n]+'").unwrap();
    pub static ref SPACE_BEFORE_COMMA: Regex = Regex::new(r"[^\S\n]+,").unwrap();
    pub static ref COMMA_BEFORE_LENGTH: Regex = Regex::new(r",[^\S\n]+L").unwrap();
    pub static ref LENGTH_LABEL: Regex = Regex::new(r"L[^\S\n]*=[^\S\n]*").unwrap();
    pub static ref PERIOD_RUN: Regex = Regex::new(r"\.{2,}").unwrap();
    pub static ref NOISE_CHARS: Regex = Regex::new(r#"[|!"';~_]"#).unwrap();

    pub static ref WRAPPED_CODE: Regex = Regex::new(
        r"(?i)(\d+Rfi[^\n]*)-\s*\n\s*(\d)"
    ).unwrap();
}
