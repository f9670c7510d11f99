//! UN/ECE Recommendation 20 unit codes accepted on invoice lines (BT-130).
//!
//! A curated subset of Rec 20 / Rec 21 covering the units offered by the
//! invoice form plus the ones most common in Peppol traffic.

/// Check whether `code` is an accepted unit code. Matching is exact.
pub fn is_known_unit_code(code: &str) -> bool {
    UNIT_CODES.binary_search(&code).is_ok()
}

/// Sorted for binary search.
static UNIT_CODES: &[&str] = &[
    "2N", "4K", "ANN", "BAR", "BLL", "BX", "C62", "CCM", "CLT", "CMK", "CMT", "CS", "CT", "DAY",
    "DMQ", "DMT", "DZN", "EA", "FOT", "GLL", "GM", "GRM", "GRO", "GWH", "H87", "HAR", "HLT", "HUR",
    "INH", "JOU", "KGM", "KGS", "KHZ", "KMH", "KMT", "KTM", "KVA", "KVT", "KWH", "KWT", "LBR",
    "LE", "LM", "LPA", "LS", "LTR", "MAW", "MBR", "MGM", "MHZ", "MIN", "MLT", "MMK", "MMT", "MON",
    "MQH", "MTK", "MTQ", "MTR", "MTS", "MWH", "NAR", "NPR", "P1", "PA", "PCE", "PK", "PR", "QTI",
    "RO", "SA", "SEC", "SET", "SMI", "ST", "STN", "TNE", "WEE", "XBD", "XBG", "XBX", "XCT", "XPA",
    "XPK", "XPX", "XRO", "XSA", "XST", "YRD",
];
