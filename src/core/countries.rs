//! Country names for BT-40 / BT-55 in user-facing messages.
//!
//! Only the EU member states are named; any other code is shown as-is.

/// English name of an EU member state. Greece is listed under `GR`.
pub fn eu_country_name(code: &str) -> Option<&'static str> {
    EU_MEMBER_STATES
        .binary_search_by(|(c, _)| c.cmp(&code))
        .ok()
        .map(|i| EU_MEMBER_STATES[i].1)
}

/// Label for messages: the EU country name when known, else the code itself.
pub fn country_label(code: &str) -> String {
    let code = code.trim().to_ascii_uppercase();
    eu_country_name(&code).map_or(code, str::to_string)
}

static EU_MEMBER_STATES: &[(&str, &str)] = &[
    ("AT", "Austria"),
    ("BE", "Belgium"),
    ("BG", "Bulgaria"),
    ("CY", "Cyprus"),
    ("CZ", "Czech Republic"),
    ("DE", "Germany"),
    ("DK", "Denmark"),
    ("EE", "Estonia"),
    ("ES", "Spain"),
    ("FI", "Finland"),
    ("FR", "France"),
    ("GR", "Greece"),
    ("HR", "Croatia"),
    ("HU", "Hungary"),
    ("IE", "Ireland"),
    ("IT", "Italy"),
    ("LT", "Lithuania"),
    ("LU", "Luxembourg"),
    ("LV", "Latvia"),
    ("MT", "Malta"),
    ("NL", "Netherlands"),
    ("PL", "Poland"),
    ("PT", "Portugal"),
    ("RO", "Romania"),
    ("SE", "Sweden"),
    ("SI", "Slovenia"),
    ("SK", "Slovakia"),
];
