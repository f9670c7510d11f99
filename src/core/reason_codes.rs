//! UNTDID 5189 (allowance) and 7161 (charge) reason codes.
//!
//! Used for document-level allowances and charges (BT-98 / BT-105) and for
//! the line discount, which is always written with allowance code 95.

/// Allowance reason code used for the fixed-amount line discount.
pub const LINE_DISCOUNT_REASON_CODE: &str = "95";

/// Check whether `code` is a known UNTDID 5189 allowance reason code.
pub fn is_known_allowance_reason(code: &str) -> bool {
    allowance_reason(code).is_some()
}

/// Check whether `code` is a known UNTDID 7161 charge reason code.
pub fn is_known_charge_reason(code: &str) -> bool {
    charge_reason(code).is_some()
}

/// Description of an allowance reason code (BT-97 default text).
pub fn allowance_reason(code: &str) -> Option<&'static str> {
    find(ALLOWANCE_REASON_CODES, code)
}

/// Description of a charge reason code (BT-104 default text).
pub fn charge_reason(code: &str) -> Option<&'static str> {
    find(CHARGE_REASON_CODES, code)
}

fn find(table: &'static [(&'static str, &'static str)], code: &str) -> Option<&'static str> {
    table
        .binary_search_by(|(c, _)| c.cmp(&code))
        .ok()
        .map(|i| table[i].1)
}

/// UNTDID 5189, sorted by code (string order).
static ALLOWANCE_REASON_CODES: &[(&str, &str)] = &[
    ("100", "Special agreement"),
    ("102", "Fixed long term"),
    ("103", "Temporary"),
    ("104", "Standard"),
    ("105", "Yearly turnover"),
    ("41", "Bonus for works ahead of schedule"),
    ("42", "Other bonus"),
    ("60", "Manufacturer's consumer discount"),
    ("62", "Due to military status"),
    ("63", "Due to work accident"),
    ("64", "Special agreement"),
    ("65", "Production error discount"),
    ("66", "New outlet discount"),
    ("67", "Sample discount"),
    ("68", "End-of-range discount"),
    ("70", "Incoterm discount"),
    ("71", "Point of sales threshold allowance"),
    ("88", "Material surcharge/deduction"),
    ("95", "Discount"),
];

/// UNTDID 7161, sorted by code.
static CHARGE_REASON_CODES: &[(&str, &str)] = &[
    ("AA", "Advertising"),
    ("AAA", "Telecommunication"),
    ("AAC", "Technical modification"),
    ("AAD", "Job-order production"),
    ("AAE", "Outlays"),
    ("AAF", "Off-premises"),
    ("ABK", "Miscellaneous"),
    ("ABL", "Additional packaging"),
    ("ADR", "Other services"),
    ("ADT", "Pick-up"),
    ("AEW", "Environmental protection service"),
    ("FC", "Freight service"),
    ("FI", "Financing"),
    ("FL", "Flat rate"),
    ("LA", "Labelling"),
    ("PC", "Packing"),
    ("TS", "Testing"),
];
