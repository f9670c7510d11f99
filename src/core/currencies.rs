//! ISO 4217 currency codes accepted for BT-5.
//!
//! Every amount in a document is stated in this one currency; there is no
//! conversion. Minor-unit handling lives in the calculation engine.

/// Whether `code` is an accepted currency. Exact, upper-case match.
pub fn is_known_currency_code(code: &str) -> bool {
    currency_name(code).is_some()
}

/// English name of an accepted currency.
pub fn currency_name(code: &str) -> Option<&'static str> {
    CURRENCIES
        .binary_search_by(|(c, _)| (*c).cmp(code))
        .ok()
        .map(|i| CURRENCIES[i].1)
}

/// Every European currency plus the major world currencies. Sorted.
static CURRENCIES: &[(&str, &str)] = &[
    ("ALL", "Albanian lek"),
    ("AMD", "Armenian dram"),
    ("AUD", "Australian dollar"),
    ("AZN", "Azerbaijani manat"),
    ("BAM", "Bosnia-Herzegovina convertible mark"),
    ("BGN", "Bulgarian lev"),
    ("BRL", "Brazilian real"),
    ("BYN", "Belarusian rouble"),
    ("CAD", "Canadian dollar"),
    ("CHF", "Swiss franc"),
    ("CNY", "Chinese yuan"),
    ("CZK", "Czech koruna"),
    ("DKK", "Danish krone"),
    ("EUR", "Euro"),
    ("GBP", "Pound sterling"),
    ("GEL", "Georgian lari"),
    ("GIP", "Gibraltar pound"),
    ("HKD", "Hong Kong dollar"),
    ("HRK", "Croatian kuna"),
    ("HUF", "Hungarian forint"),
    ("INR", "Indian rupee"),
    ("ISK", "Icelandic krona"),
    ("JPY", "Japanese yen"),
    ("KRW", "South Korean won"),
    ("MDL", "Moldovan leu"),
    ("MKD", "Macedonian denar"),
    ("MXN", "Mexican peso"),
    ("NOK", "Norwegian krone"),
    ("PLN", "Polish zloty"),
    ("RON", "Romanian leu"),
    ("RSD", "Serbian dinar"),
    ("RUB", "Russian rouble"),
    ("SEK", "Swedish krona"),
    ("SGD", "Singapore dollar"),
    ("TRY", "Turkish lira"),
    ("UAH", "Ukrainian hryvnia"),
    ("USD", "US dollar"),
    ("ZAR", "South African rand"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_currencies() {
        assert!(is_known_currency_code("EUR"));
        assert!(is_known_currency_code("SEK"));
        assert!(is_known_currency_code("PLN"));
        assert!(is_known_currency_code("RSD"));
        assert_eq!(currency_name("GBP"), Some("Pound sterling"));
    }

    #[test]
    fn unknown_currencies() {
        assert!(!is_known_currency_code("XYZ"));
        assert!(!is_known_currency_code(""));
        assert!(!is_known_currency_code("EURO"));
        assert!(!is_known_currency_code("eur"));
    }

    #[test]
    fn list_is_sorted() {
        for w in CURRENCIES.windows(2) {
            assert!(w[0].0 < w[1].0, "{} should come before {}", w[0].0, w[1].0);
        }
    }
}
