//! Format patterns for identifiers checked by the validation engine.
//!
//! Registration and VAT identifier tables are keyed by ISO 3166-1 alpha-2
//! code and kept sorted so lookups can use binary search.

use std::sync::LazyLock;

use regex::Regex;

/// National business registration number shapes (BT-30 / BT-47).
const REGISTRATION_PATTERNS: &[(&str, &str)] = &[
    ("AT", r"^[0-9]{6,9}$"),
    ("BE", r"^[0-9]{10}$"),
    ("BG", r"^[0-9]{9,13}$"),
    ("CY", r"(?i)^[0-9]{8}[A-Z]$"),
    ("CZ", r"^[0-9]{8}$"),
    ("DE", r"(?i)^[A-Z0-9]{1,12}$"),
    ("DK", r"^[0-9]{8}$"),
    ("EE", r"^[0-9]{8}$"),
    ("ES", r"(?i)^[A-Z0-9]{8,12}$"),
    ("FI", r"^[0-9]{7}-[0-9]$"),
    ("FR", r"^[0-9]{9}$"),
    ("GR", r"^[0-9]{9}$"),
    ("HR", r"^[0-9]{11}$"),
    ("HU", r"^[0-9]{8}$"),
    ("IE", r"(?i)^[0-9]{7}[A-Z]{1,2}$"),
    ("IT", r"^[0-9]{11}$"),
    ("LT", r"^[0-9]{9}$"),
    ("LU", r"^[0-9]{8}$"),
    ("LV", r"^[0-9]{11}$"),
    ("MT", r"(?i)^[A-Z0-9]{1,8}$"),
    ("NL", r"^[0-9]{8}$"),
    ("PL", r"^[0-9]{10}$"),
    ("PT", r"^[0-9]{9}$"),
    ("RO", r"^[0-9]{2,10}$"),
    ("SE", r"^[0-9]{6}-[0-9]{4}$"),
    ("SI", r"^[0-9]{8}$"),
    ("SK", r"^[0-9]{8}$"),
];

/// EU VAT identifier shapes (BT-31 / BT-48), matched case-insensitively.
/// Greece uses the `EL` prefix.
const VAT_PATTERNS: &[(&str, &str)] = &[
    ("AT", r"^ATU[0-9]{8}$"),
    ("BE", r"^BE[0-9]{10}$"),
    ("BG", r"^BG[0-9]{9,10}$"),
    ("CY", r"^CY[0-9]{8}[A-Z]$"),
    ("CZ", r"^CZ[0-9]{8,10}$"),
    ("DE", r"^DE[0-9]{9}$"),
    ("DK", r"^DK[0-9]{8}$"),
    ("EE", r"^EE[0-9]{9}$"),
    ("ES", r"^ES[A-Z0-9][0-9]{7}[A-Z0-9]$"),
    ("FI", r"^FI[0-9]{8}$"),
    ("FR", r"^FR[A-Z0-9]{2}[0-9]{9}$"),
    ("GR", r"^EL[0-9]{9}$"),
    ("HR", r"^HR[0-9]{11}$"),
    ("HU", r"^HU[0-9]{8}$"),
    ("IE", r"^IE[0-9][A-Z0-9][0-9]{5}[A-Z]$"),
    ("IT", r"^IT[0-9]{11}$"),
    ("LT", r"^LT[0-9]{9,12}$"),
    ("LU", r"^LU[0-9]{8}$"),
    ("LV", r"^LV[0-9]{11}$"),
    ("MT", r"^MT[0-9]{8}$"),
    ("NL", r"^NL[0-9]{9}B[0-9]{2}$"),
    ("PL", r"^PL[0-9]{10}$"),
    ("PT", r"^PT[0-9]{9}$"),
    ("RO", r"^RO[0-9]{2,10}$"),
    ("SE", r"^SE[0-9]{12}$"),
    ("SI", r"^SI[0-9]{8}$"),
    ("SK", r"^SK[0-9]{10}$"),
];

fn compile(table: &[(&'static str, &str)], case_insensitive: bool) -> Vec<(&'static str, Regex)> {
    table
        .iter()
        .map(|(country, pattern)| {
            let pattern = if case_insensitive {
                format!("(?i){pattern}")
            } else {
                (*pattern).to_string()
            };
            let re = Regex::new(&pattern).expect("static identifier pattern is valid");
            (*country, re)
        })
        .collect()
}

static REGISTRATION_REGEXES: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| compile(REGISTRATION_PATTERNS, false));

static VAT_REGEXES: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| compile(VAT_PATTERNS, true));

pub(crate) static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"));

pub(crate) static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub(crate) static IBAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Z0-9]{4}[0-9]{7}([A-Z0-9]?){0,16}$").expect("valid IBAN regex")
});

pub(crate) static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{6,15}$").expect("valid phone regex"));

fn lookup(table: &'static [(&'static str, Regex)], country_code: &str) -> Option<&'static Regex> {
    let key = country_code.trim().to_ascii_uppercase();
    table
        .binary_search_by(|(c, _)| (*c).cmp(key.as_str()))
        .ok()
        .map(|i| &table[i].1)
}

/// Registration number pattern for `country_code`, if one is curated.
pub(crate) fn registration_pattern(country_code: &str) -> Option<&'static Regex> {
    lookup(&REGISTRATION_REGEXES, country_code)
}

/// VAT identifier pattern for `country_code`, if one is curated.
pub(crate) fn vat_pattern(country_code: &str) -> Option<&'static Regex> {
    lookup(&VAT_REGEXES, country_code)
}
