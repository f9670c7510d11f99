use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::calc::{assert_reconciliation, calc_invoice};
use super::countries::country_label;
use super::currencies::is_known_currency_code;
use super::error::{InvoiceError, ValidationError};
use super::patterns::{self, EMAIL_RE, IBAN_RE, ISO_DATE_RE, PHONE_RE};
use super::reason_codes::{is_known_allowance_reason, is_known_charge_reason};
use super::types::*;
use super::units::is_known_unit_code;

/// UNCL 5305 VAT category codes accepted on lines and document
/// allowances/charges.
pub const VAT_CATEGORY_CODES: &[&str] = &["S", "Z", "E", "AE", "K", "G", "O", "L", "M", "B"];

/// Largest accepted magnitude for a quantity, price or amount. Keeps every
/// line product inside the `Decimal` range.
pub const MAX_AMOUNT_MAGNITUDE: Decimal = dec!(1_000_000_000_000);

/// The single message reported when a structurally valid draft does not
/// reconcile.
pub const RECONCILIATION_MESSAGE: &str =
    "Calculations mismatch: totals do not reconcile. Review your data.";

/// Built-in denylist of disposable email domains (sorted).
pub const DISPOSABLE_EMAIL_DOMAINS: &[&str] = &[
    "10minutemail.com",
    "10minutemail.net",
    "dispostable.com",
    "fakeinbox.com",
    "getnada.com",
    "guerrillamail.com",
    "guerrillamail.net",
    "guerrillamail.org",
    "maildrop.cc",
    "mailinator.com",
    "mailnesia.com",
    "sharklasers.com",
    "temp-mail.org",
    "tempail.com",
    "tempmail.com",
    "throwaway.email",
    "trashmail.com",
    "yopmail.com",
];

/// Knobs for the validation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Reject contact emails on a disposable-email domain.
    pub reject_disposable_email: bool,
    /// Domains denied in addition to [`DISPOSABLE_EMAIL_DOMAINS`].
    pub extra_disposable_domains: Vec<String>,
    /// Verify the ISO 13616 mod-97 check digits on top of the IBAN shape.
    pub verify_iban_checksum: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            reject_disposable_email: true,
            extra_disposable_domains: Vec::new(),
            verify_iban_checksum: true,
        }
    }
}

/// Outcome of validating a draft. Every violation is collected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Human-readable messages, in check order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }

    /// `Ok(())` when valid, otherwise [`InvoiceError::Validation`] carrying
    /// every message joined by `"; "`.
    pub fn into_result(self) -> Result<(), InvoiceError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(InvoiceError::Validation(self.messages().join("; ")))
        }
    }
}

/// Validate a draft with default options.
pub fn validate_draft(draft: &InvoiceDraft) -> ValidationReport {
    validate_draft_with(draft, &ValidationOptions::default())
}

/// Check the EN 16931 / Peppol BIS 3.0 rule subset that gates export.
///
/// Never fails and never stops at the first problem: the report lists every
/// violation so all of them can be shown at once.
pub fn validate_draft_with(draft: &InvoiceDraft, options: &ValidationOptions) -> ValidationReport {
    let mut errors = Vec::new();

    validate_header(&draft.header, &mut errors);
    validate_party(&draft.seller, PartyRole::Seller, options, &mut errors);
    validate_party(&draft.buyer, PartyRole::Buyer, options, &mut errors);
    validate_payment(&draft.payment, options, &mut errors);

    for (i, ac) in draft.document_allowances.iter().enumerate() {
        validate_document_allowance_charge(ac, i, false, &mut errors);
    }
    for (i, ac) in draft.document_charges.iter().enumerate() {
        validate_document_allowance_charge(ac, i, true, &mut errors);
    }

    // BG-25
    if draft.lines.is_empty() {
        errors.push(ValidationError::with_rule(
            "lines",
            "At least one invoice line (BG-25) is required",
            "BR-16",
        ));
    }

    let mut seen_ids = HashSet::new();
    for (i, line) in draft.lines.iter().enumerate() {
        validate_line(line, i, &mut seen_ids, &mut errors);
    }

    ValidationReport { errors }
}

/// [`validate_for_export_with`] using default options.
pub fn validate_for_export(draft: &InvoiceDraft) -> ValidationReport {
    validate_for_export_with(draft, &ValidationOptions::default())
}

/// Structural validation followed by the reconciliation check.
///
/// Structural errors are returned as-is. Only a structurally valid draft is
/// reconciled; a failing reconciliation yields exactly one error carrying
/// [`RECONCILIATION_MESSAGE`].
pub fn validate_for_export_with(
    draft: &InvoiceDraft,
    options: &ValidationOptions,
) -> ValidationReport {
    let report = validate_draft_with(draft, options);
    if !report.is_valid() {
        return report;
    }

    let computed = calc_invoice(draft);
    if assert_reconciliation(&computed).is_err() {
        return ValidationReport {
            errors: vec![ValidationError::with_rule(
                "totals",
                RECONCILIATION_MESSAGE,
                "BR-CO-16",
            )],
        };
    }

    report
}

fn validate_header(h: &Header, errors: &mut Vec<ValidationError>) {
    if h.invoice_number.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "header.invoice_number",
            "Invoice number (BT-1) is required",
            "BT-1",
        ));
    }

    if !is_valid_iso_date(&h.issue_date) {
        errors.push(ValidationError::with_rule(
            "header.issue_date",
            "Invoice date (BT-2) must be a valid ISO date (YYYY-MM-DD)",
            "BT-2",
        ));
    }

    if h.type_code.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "header.type_code",
            "Invoice type code (BT-3) is required",
            "BT-3",
        ));
    }

    let currency = h.currency_code.trim();
    if currency.is_empty() {
        errors.push(ValidationError::with_rule(
            "header.currency_code",
            "Currency code (BT-5) is required",
            "BT-5",
        ));
    } else if !is_known_currency_code(currency) {
        errors.push(ValidationError::with_rule(
            "header.currency_code",
            format!("Currency code (BT-5) '{currency}' is not a known ISO 4217 code"),
            "BT-5",
        ));
    }

    if let Some(due) = h.due_date.as_deref().filter(|d| !d.trim().is_empty()) {
        if !is_valid_iso_date(due) {
            errors.push(ValidationError::with_rule(
                "header.due_date",
                "Due date (BT-9) must be a valid ISO date",
                "BT-9",
            ));
        }
    }

    if h.prepaid_amount.is_some_and(too_large) {
        errors.push(ValidationError::with_rule(
            "header.prepaid_amount",
            "Paid amount (BT-113) is too large",
            "BT-113",
        ));
    }
    if h.rounding_amount.is_some_and(too_large) {
        errors.push(ValidationError::with_rule(
            "header.rounding_amount",
            "Rounding amount (BT-114) is too large",
            "BT-114",
        ));
    }
}

#[derive(Clone, Copy)]
enum PartyRole {
    Seller,
    Buyer,
}

impl PartyRole {
    fn label(self) -> &'static str {
        match self {
            Self::Seller => "Seller",
            Self::Buyer => "Buyer",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Seller => "seller",
            Self::Buyer => "buyer",
        }
    }

    /// (name, registration id, VAT id, electronic address, country) terms.
    fn terms(self) -> [&'static str; 5] {
        match self {
            Self::Seller => ["BT-27", "BT-30", "BT-31", "BT-34", "BT-40"],
            Self::Buyer => ["BT-44", "BT-47", "BT-48", "BT-49", "BT-55"],
        }
    }
}

fn validate_party(
    party: &Party,
    role: PartyRole,
    options: &ValidationOptions,
    errors: &mut Vec<ValidationError>,
) {
    let label = role.label();
    let prefix = role.prefix();
    let [bt_name, bt_reg, bt_vat, bt_endpoint, bt_country] = role.terms();

    if party.name.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.name"),
            format!("{label} name ({bt_name}) is required"),
            bt_name,
        ));
    }

    if party.address.city.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.address.city"),
            format!("{label} city is required"),
        ));
    }

    let country = party.address.country_code.trim();
    if country.is_empty() {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.address.country_code"),
            format!("{label} country ({bt_country}) is required"),
            bt_country,
        ));
    }

    if !country.is_empty() {
        if let Some(reg) = non_blank(&party.legal_registration_id) {
            if !is_valid_registration_id(reg, country) {
                errors.push(ValidationError::with_rule(
                    format!("{prefix}.legal_registration_id"),
                    format!(
                        "{label} registration ID ({bt_reg}) is not valid for {}",
                        country_label(country)
                    ),
                    bt_reg,
                ));
            }
        }
        if let Some(vat) = non_blank(&party.vat_id) {
            if !is_valid_vat_id(vat, country) {
                errors.push(ValidationError::with_rule(
                    format!("{prefix}.vat_id"),
                    format!(
                        "{label} VAT ID ({bt_vat}) is not valid for {}",
                        country_label(country)
                    ),
                    bt_vat,
                ));
            }
        }
    }

    if let Some(endpoint) = &party.electronic_address {
        if endpoint.scheme.trim().is_empty() || endpoint.value.trim().is_empty() {
            errors.push(ValidationError::with_rule(
                format!("{prefix}.electronic_address"),
                format!("{label} electronic address ({bt_endpoint}) needs both a scheme and a value"),
                bt_endpoint,
            ));
        }
    }

    if let Some(email) = non_blank(&party.contact.email) {
        if !is_valid_email(email) {
            errors.push(ValidationError::new(
                format!("{prefix}.contact.email"),
                format!("{label} email must be a valid email address"),
            ));
        } else if options.reject_disposable_email
            && email_domain(email).is_some_and(|d| {
                is_disposable_domain_with(d, &options.extra_disposable_domains)
            })
        {
            errors.push(ValidationError::new(
                format!("{prefix}.contact.email"),
                format!("{label} email must not use a temporary email domain"),
            ));
        }
    }

    if let Some(phone) = non_blank(&party.contact.phone) {
        if !is_valid_phone(phone) {
            errors.push(ValidationError::new(
                format!("{prefix}.contact.phone"),
                format!("{label} phone must be a valid phone number"),
            ));
        }
    }
}

fn validate_payment(
    payment: &Payment,
    options: &ValidationOptions,
    errors: &mut Vec<ValidationError>,
) {
    if payment.means_type_code.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "payment.means_type_code",
            "Payment means code (BT-81) is required",
            "BT-81",
        ));
        return;
    }

    // BR-50: credit transfer needs a payee account
    if !payment.is_credit_transfer() {
        return;
    }

    let iban_ok = |s: &str| {
        is_valid_iban(s) && (!options.verify_iban_checksum || iban_checksum_ok(s))
    };

    if !payment.accounts.is_empty() {
        for (i, acc) in payment.accounts.iter().enumerate() {
            if !acc.account_id.trim().is_empty() && !iban_ok(&acc.account_id) {
                errors.push(ValidationError::with_rule(
                    format!("payment.accounts[{i}].account_id"),
                    format!("IBAN (BT-84) #{} must be a valid IBAN", i + 1),
                    "BT-84",
                ));
            }
        }
        if payment.accounts.iter().all(|a| a.account_id.trim().is_empty()) {
            errors.push(ValidationError::with_rule(
                "payment.accounts",
                "At least one bank account (IBAN) is required for credit transfer",
                "BR-50",
            ));
        }
        return;
    }

    match non_blank(&payment.account_id) {
        Some(iban) if !iban_ok(iban) => errors.push(ValidationError::with_rule(
            "payment.account_id",
            "IBAN (BT-84) must be a valid IBAN when payment is by credit transfer",
            "BT-84",
        )),
        Some(_) => {}
        None => errors.push(ValidationError::with_rule(
            "payment.accounts",
            "At least one bank account (IBAN) is required for credit transfer",
            "BR-50",
        )),
    }
}

fn validate_document_allowance_charge(
    ac: &AllowanceCharge,
    index: usize,
    is_charge: bool,
    errors: &mut Vec<ValidationError>,
) {
    let (label, field, bt_amount, bt_category, bt_reason) = if is_charge {
        ("Document charge", "document_charges", "BT-99", "BT-102", "BT-105")
    } else {
        ("Document allowance", "document_allowances", "BT-92", "BT-95", "BT-98")
    };
    let n = index + 1;
    let prefix = format!("{field}[{index}]");

    if ac.amount < Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.amount"),
            format!("{label} {n}: Amount ({bt_amount}) must not be negative"),
            bt_amount,
        ));
    } else if too_large(ac.amount) {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.amount"),
            format!("{label} {n}: Amount ({bt_amount}) is too large"),
            bt_amount,
        ));
    }

    if !is_known_vat_category(&ac.vat_category_code) {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.vat_category_code"),
            format!(
                "{label} {n}: VAT category code ({bt_category}) must be one of: {}",
                VAT_CATEGORY_CODES.join(", ")
            ),
            bt_category,
        ));
    }

    if let Some(code) = non_blank(&ac.reason_code) {
        let (known, list) = if is_charge {
            (is_known_charge_reason(code), "UNTDID 7161")
        } else {
            (is_known_allowance_reason(code), "UNTDID 5189")
        };
        if !known {
            errors.push(ValidationError::with_rule(
                format!("{prefix}.reason_code"),
                format!("{label} {n}: Reason code ({bt_reason}) '{code}' is not a known {list} code"),
                bt_reason,
            ));
        }
    }
}

fn validate_line<'a>(
    line: &'a InvoiceLine,
    index: usize,
    seen_ids: &mut HashSet<&'a str>,
    errors: &mut Vec<ValidationError>,
) {
    let n = index + 1;
    let prefix = format!("lines[{index}]");

    let id = line.id.trim();
    if id.is_empty() {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.id"),
            format!("Line {n}: Line ID (BT-126) is required"),
            "BT-126",
        ));
    } else if !seen_ids.insert(id) {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.id"),
            format!("Line {n}: Line ID (BT-126) '{id}' is used by more than one line"),
            "BT-126",
        ));
    }

    if line.item_name.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.item_name"),
            format!("Line {n}: Item name (BT-153) is required"),
            "BT-153",
        ));
    }

    if line.quantity <= Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.quantity"),
            format!("Line {n}: Quantity (BT-129) must be greater than 0"),
            "BT-129",
        ));
    } else if too_large(line.quantity) {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.quantity"),
            format!("Line {n}: Quantity (BT-129) is too large"),
            "BT-129",
        ));
    }

    if !is_known_unit_code(&line.unit_code) {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.unit_code"),
            format!("Line {n}: Unit code (BT-130) must be a valid UN/ECE code (e.g. C62, DAY)"),
            "BT-130",
        ));
    }

    if line.net_price < Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.net_price"),
            format!("Line {n}: Net price (BT-146) must be a non-negative number"),
            "BT-146",
        ));
    } else if too_large(line.net_price) {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.net_price"),
            format!("Line {n}: Net price (BT-146) is too large"),
            "BT-146",
        ));
    }

    if too_large(line.discount_amount) {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.discount_amount"),
            format!("Line {n}: Discount (BT-136) is too large"),
            "BT-136",
        ));
    }

    if !is_known_vat_category(&line.vat_category_code) {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.vat_category_code"),
            format!(
                "Line {n}: VAT category code (BT-151) is required and must be one of: {}",
                VAT_CATEGORY_CODES.join(", ")
            ),
            "BT-151",
        ));
    }

    if !line.line_allowances.is_empty() || !line.line_charges.is_empty() {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.line_allowances"),
            format!(
                "Line {n}: line-level allowances and charges (BG-27/BG-28) are not supported, use the line discount"
            ),
            "BG-27",
        ));
    }
}

fn too_large(value: Decimal) -> bool {
    value.abs() > MAX_AMOUNT_MAGNITUDE
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn email_domain(email: &str) -> Option<&str> {
    email.trim().rsplit_once('@').map(|(_, domain)| domain)
}

fn is_disposable_domain_with(domain: &str, extra: &[String]) -> bool {
    let d = domain.trim().to_ascii_lowercase();
    is_disposable_email_domain(&d) || extra.iter().any(|e| e.trim().eq_ignore_ascii_case(&d))
}

/// `YYYY-MM-DD` naming a real calendar day.
pub fn is_valid_iso_date(value: &str) -> bool {
    ISO_DATE_RE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// `local@domain.tld` shape. Blank input is accepted (the field is optional).
pub fn is_valid_email(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || EMAIL_RE.is_match(v)
}

/// Whether `domain` is on the built-in disposable-email denylist.
pub fn is_disposable_email_domain(domain: &str) -> bool {
    let d = domain.trim().to_ascii_lowercase();
    DISPOSABLE_EMAIL_DOMAINS.binary_search(&d.as_str()).is_ok()
}

/// Optional `+` then 6 to 15 digits, after removing spaces, dashes and
/// parentheses. Blank input is accepted.
pub fn is_valid_phone(value: &str) -> bool {
    let v = value.trim();
    if v.is_empty() {
        return true;
    }
    let compact: String = v
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();
    PHONE_RE.is_match(&compact)
}

fn normalize_iban(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Structural IBAN shape, ignoring whitespace and case. Blank input is
/// accepted; check digits are not verified here (see [`iban_checksum_ok`]).
pub fn is_valid_iban(value: &str) -> bool {
    let iban = normalize_iban(value);
    iban.is_empty() || IBAN_RE.is_match(&iban)
}

/// ISO 13616 mod-97 check: rotate the first four characters to the end,
/// map letters to 10..=35 and require the remainder 1.
pub fn iban_checksum_ok(value: &str) -> bool {
    let iban = normalize_iban(value);
    if iban.len() < 5 || !iban.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    let (head, tail) = iban.split_at(4);
    let mut remainder: u32 = 0;
    for c in tail.chars().chain(head.chars()) {
        let Some(v) = c.to_digit(36) else {
            return false;
        };
        remainder = if v >= 10 {
            (remainder * 100 + v) % 97
        } else {
            (remainder * 10 + v) % 97
        };
    }
    remainder == 1
}

/// Registration number shape for `country_code`. Countries without a
/// curated pattern accept 4 to 25 characters. Blank values are invalid.
pub fn is_valid_registration_id(value: &str, country_code: &str) -> bool {
    let v = value.trim();
    if v.is_empty() || country_code.trim().is_empty() {
        return false;
    }
    match patterns::registration_pattern(country_code) {
        Some(re) => re.is_match(v),
        None => (4..=25).contains(&v.chars().count()),
    }
}

/// VAT identifier shape for `country_code`, ignoring whitespace and case.
/// Countries without a curated pattern accept 10 to 20 characters. Blank
/// input is accepted.
pub fn is_valid_vat_id(value: &str, country_code: &str) -> bool {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return true;
    }
    match patterns::vat_pattern(country_code) {
        Some(re) => re.is_match(&compact),
        None => (10..=20).contains(&compact.chars().count()),
    }
}

/// Whether `code` is an accepted VAT category (case-insensitive).
pub fn is_known_vat_category(code: &str) -> bool {
    let c = code.trim().to_ascii_uppercase();
    VAT_CATEGORY_CODES.contains(&c.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_draft() -> InvoiceDraft {
        let mut draft = InvoiceDraft::default();
        draft.header.invoice_number = "INV-1".into();
        draft.header.issue_date = "2024-06-15".into();
        draft.seller.name = "Seller SIA".into();
        draft.seller.address.city = "Riga".into();
        draft.seller.address.country_code = "LV".into();
        draft.buyer.name = "Buyer AS".into();
        draft.buyer.address.city = "Tallinn".into();
        draft.buyer.address.country_code = "EE".into();
        draft.payment.accounts.push(BankAccount {
            account_id: "LV80BANK0000435195001".into(),
            bank_name: None,
        });
        draft.lines[0].item_name = "Consulting".into();
        draft.lines[0].net_price = dec!(100);
        draft
    }

    #[test]
    fn valid_draft_passes() {
        let report = validate_draft(&valid_draft());
        assert!(report.is_valid(), "{:?}", report.messages());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn collects_all_header_errors() {
        let mut draft = valid_draft();
        draft.header.invoice_number = " ".into();
        draft.header.issue_date = "2024-02-30".into();
        draft.header.type_code = String::new();
        draft.header.currency_code = String::new();
        draft.header.due_date = Some("15.06.2024".into());
        let msgs = validate_draft(&draft).messages();
        assert_eq!(
            msgs,
            [
                "Invoice number (BT-1) is required",
                "Invoice date (BT-2) must be a valid ISO date (YYYY-MM-DD)",
                "Invoice type code (BT-3) is required",
                "Currency code (BT-5) is required",
                "Due date (BT-9) must be a valid ISO date",
            ]
        );
    }

    #[test]
    fn unknown_currency_is_reported() {
        let mut draft = valid_draft();
        draft.header.currency_code = "EURO".into();
        let report = validate_draft(&draft);
        assert!(report.messages()[0].contains("not a known ISO 4217 code"));
    }

    #[test]
    fn iso_dates() {
        assert!(is_valid_iso_date("2024-02-29"));
        assert!(!is_valid_iso_date("2023-02-29"));
        assert!(!is_valid_iso_date("2024-2-1"));
        assert!(!is_valid_iso_date(""));
        assert!(!is_valid_iso_date("2024-01-01T00:00"));
    }

    #[test]
    fn iban_shape_and_checksum() {
        assert!(is_valid_iban("LV80BANK0000435195001"));
        assert!(is_valid_iban("de89 3704 0044 0532 0130 00"));
        assert!(!is_valid_iban("LV80"));
        assert!(iban_checksum_ok("LV80BANK0000435195001"));
        assert!(iban_checksum_ok("DE89 3704 0044 0532 0130 00"));
        assert!(is_valid_iban("DE88370400440532013000"));
        assert!(!iban_checksum_ok("DE88370400440532013000"));
        assert!(!iban_checksum_ok(""));
    }

    #[test]
    fn checksum_can_be_disabled() {
        let mut draft = valid_draft();
        draft.payment.accounts[0].account_id = "DE88370400440532013000".into();
        assert_eq!(
            validate_draft(&draft).messages(),
            ["IBAN (BT-84) #1 must be a valid IBAN"]
        );
        let lenient = ValidationOptions {
            verify_iban_checksum: false,
            ..ValidationOptions::default()
        };
        assert!(validate_draft_with(&draft, &lenient).is_valid());
    }

    #[test]
    fn credit_transfer_requires_account() {
        let mut draft = valid_draft();
        draft.payment.accounts.clear();
        assert_eq!(
            validate_draft(&draft).messages(),
            ["At least one bank account (IBAN) is required for credit transfer"]
        );

        draft.payment.accounts.push(BankAccount::default());
        assert_eq!(
            validate_draft(&draft).messages(),
            ["At least one bank account (IBAN) is required for credit transfer"]
        );

        draft.payment.means_type_code = means_code::CASH.into();
        assert!(validate_draft(&draft).is_valid());
    }

    #[test]
    fn legacy_account_pair_is_checked() {
        let mut draft = valid_draft();
        draft.payment.accounts.clear();
        draft.payment.account_id = Some("NOT AN IBAN".into());
        assert_eq!(
            validate_draft(&draft).messages(),
            ["IBAN (BT-84) must be a valid IBAN when payment is by credit transfer"]
        );
        draft.payment.account_id = Some("DE89370400440532013000".into());
        assert!(validate_draft(&draft).is_valid());
    }

    #[test]
    fn every_bad_account_is_reported() {
        let mut draft = valid_draft();
        draft.payment.accounts.push(BankAccount {
            account_id: "XX".into(),
            bank_name: None,
        });
        draft.payment.accounts.push(BankAccount {
            account_id: "YY".into(),
            bank_name: None,
        });
        assert_eq!(
            validate_draft(&draft).messages(),
            [
                "IBAN (BT-84) #2 must be a valid IBAN",
                "IBAN (BT-84) #3 must be a valid IBAN",
            ]
        );
    }

    #[test]
    fn emails() {
        assert!(is_valid_email("a@b.lv"));
        assert!(is_valid_email(""));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.lv"));
        assert!(is_disposable_email_domain("Mailinator.com"));
        assert!(!is_disposable_email_domain("example.lv"));
    }

    #[test]
    fn disposable_email_rejected_unless_disabled() {
        let mut draft = valid_draft();
        draft.buyer.contact.email = Some("x@yopmail.com".into());
        assert_eq!(
            validate_draft(&draft).messages(),
            ["Buyer email must not use a temporary email domain"]
        );
        let opts = ValidationOptions {
            reject_disposable_email: false,
            ..ValidationOptions::default()
        };
        assert!(validate_draft_with(&draft, &opts).is_valid());

        draft.buyer.contact.email = Some("x@burner.test".into());
        let opts = ValidationOptions {
            extra_disposable_domains: vec!["BURNER.test".into()],
            ..ValidationOptions::default()
        };
        assert!(!validate_draft_with(&draft, &opts).is_valid());
    }

    #[test]
    fn phones() {
        assert!(is_valid_phone("+371 2000-0000"));
        assert!(is_valid_phone("(0049) 30 123456"));
        assert!(is_valid_phone(""));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("+1234567890123456"));
        assert!(!is_valid_phone("call me"));
    }

    #[test]
    fn registration_ids() {
        assert!(is_valid_registration_id("40003245752", "LV"));
        assert!(!is_valid_registration_id("4000324575", "LV"));
        assert!(is_valid_registration_id("556677-8899", "se"));
        assert!(is_valid_registration_id("HRB 1234".replace(' ', "").as_str(), "DE"));
        assert!(is_valid_registration_id("ABCD", "NO"));
        assert!(!is_valid_registration_id("ABC", "NO"));
        assert!(!is_valid_registration_id("", "LV"));
    }

    #[test]
    fn vat_ids() {
        assert!(is_valid_vat_id("LV40003245752", "LV"));
        assert!(is_valid_vat_id("lv 4000 3245 752", "LV"));
        assert!(!is_valid_vat_id("LV4000324575", "LV"));
        assert!(is_valid_vat_id("ATU12345678", "AT"));
        assert!(is_valid_vat_id("", "LV"));
        assert!(is_valid_vat_id("CHE123456789", "CH"));
        assert!(!is_valid_vat_id("CHE1", "CH"));
    }

    #[test]
    fn party_identifier_messages_name_the_country() {
        let mut draft = valid_draft();
        draft.seller.vat_id = Some("LV123".into());
        draft.buyer.legal_registration_id = Some("1".into());
        assert_eq!(
            validate_draft(&draft).messages(),
            [
                "Seller VAT ID (BT-31) is not valid for Latvia",
                "Buyer registration ID (BT-47) is not valid for Estonia",
            ]
        );
    }

    #[test]
    fn missing_seller_country() {
        let mut draft = valid_draft();
        draft.seller.address.country_code = String::new();
        draft.seller.vat_id = Some("LV123".into());
        let report = validate_draft(&draft);
        assert_eq!(report.messages(), ["Seller country (BT-40) is required"]);
        assert_eq!(report.errors[0].rule.as_deref(), Some("BT-40"));
    }

    #[test]
    fn vat_categories() {
        for c in ["S", "z", "AE", "K", "g", "O", "L", "M", "B", "E"] {
            assert!(is_known_vat_category(c), "{c}");
        }
        assert!(!is_known_vat_category("X"));
        assert!(!is_known_vat_category(""));
    }

    #[test]
    fn line_errors_are_numbered() {
        let mut draft = valid_draft();
        let second = draft.add_line();
        second.quantity = dec!(0);
        second.unit_code = "PIECE".into();
        second.net_price = dec!(-1);
        second.vat_category_code = "X".into();
        let msgs = validate_draft(&draft).messages();
        assert_eq!(msgs.len(), 5);
        assert!(msgs.iter().all(|m| m.starts_with("Line 2: ")));
        assert_eq!(msgs[0], "Line 2: Item name (BT-153) is required");
        assert!(msgs[4].ends_with("S, Z, E, AE, K, G, O, L, M, B"));
    }

    #[test]
    fn duplicate_and_empty_line_ids() {
        let mut draft = valid_draft();
        let mut dup = draft.lines[0].clone();
        draft.lines.push(dup.clone());
        dup.id = " ".into();
        draft.lines.push(dup);
        assert_eq!(
            validate_draft(&draft).messages(),
            [
                "Line 2: Line ID (BT-126) '1' is used by more than one line",
                "Line 3: Line ID (BT-126) is required",
            ]
        );
    }

    #[test]
    fn empty_lines_rejected() {
        let mut draft = valid_draft();
        draft.lines.clear();
        assert_eq!(
            validate_draft(&draft).messages(),
            ["At least one invoice line (BG-25) is required"]
        );
    }

    #[test]
    fn line_allowances_are_rejected() {
        let mut draft = valid_draft();
        draft.lines[0].line_charges.push(AllowanceCharge {
            amount: dec!(1),
            base_amount: None,
            percent: None,
            reason_code: None,
            reason: None,
            vat_category_code: "S".into(),
            vat_rate: dec!(21),
        });
        let msgs = validate_draft(&draft).messages();
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("use the line discount"));
    }

    #[test]
    fn document_allowance_checks() {
        let mut draft = valid_draft();
        draft.document_allowances.push(AllowanceCharge {
            amount: dec!(-5),
            base_amount: None,
            percent: None,
            reason_code: Some("FC".into()),
            reason: None,
            vat_category_code: "Q".into(),
            vat_rate: dec!(21),
        });
        let msgs = validate_draft(&draft).messages();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[0], "Document allowance 1: Amount (BT-92) must not be negative");
        assert!(msgs[2].contains("'FC' is not a known UNTDID 5189 code"));
    }

    #[test]
    fn export_reports_structural_errors_first() {
        let mut draft = valid_draft();
        draft.seller.name.clear();
        let report = validate_for_export(&draft);
        assert_eq!(report.messages(), ["Seller name (BT-27) is required"]);
        assert!(validate_for_export(&valid_draft()).is_valid());
    }

    #[test]
    fn into_result_joins_messages() {
        let mut draft = valid_draft();
        draft.seller.name.clear();
        draft.buyer.name.clear();
        let err = validate_draft(&draft).into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation failed: Seller name (BT-27) is required; Buyer name (BT-44) is required"
        );
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: ValidationOptions =
            serde_json::from_str(r#"{"verify_iban_checksum": false}"#).unwrap();
        assert!(opts.reject_disposable_email);
        assert!(!opts.verify_iban_checksum);
    }

    #[test]
    fn denylist_is_sorted() {
        for w in DISPOSABLE_EMAIL_DOMAINS.windows(2) {
            assert!(w[0] < w[1], "{} >= {}", w[0], w[1]);
        }
    }

    #[test]
    fn unlisted_country_uses_generic_identifier_rules() {
        let mut draft = valid_draft();
        draft.buyer.address.country_code = "XK".into();
        draft.buyer.vat_id = Some("XK12345678".into());
        assert!(validate_draft(&draft).is_valid());

        draft.buyer.vat_id = Some("XK1".into());
        assert_eq!(
            validate_draft(&draft).messages(),
            ["Buyer VAT ID (BT-48) is not valid for XK"]
        );
    }

    #[test]
    fn vat_rate_sign_is_not_checked() {
        let mut draft = valid_draft();
        draft.lines[0].vat_rate = dec!(-5);
        assert!(validate_draft(&draft).is_valid());
    }

    #[test]
    fn magnitudes_are_bounded() {
        let mut draft = valid_draft();
        draft.lines[0].quantity = dec!(1000000000000000);
        draft.lines[0].net_price = dec!(1000000000000000);
        draft.header.prepaid_amount = Some(dec!(-1000000000001));
        assert_eq!(
            validate_for_export(&draft).messages(),
            [
                "Paid amount (BT-113) is too large",
                "Line 1: Quantity (BT-129) is too large",
                "Line 1: Net price (BT-146) is too large",
            ]
        );

        draft.header.prepaid_amount = None;
        draft.lines[0].quantity = MAX_AMOUNT_MAGNITUDE;
        draft.lines[0].net_price = MAX_AMOUNT_MAGNITUDE;
        assert!(validate_for_export(&draft).is_valid());
    }
}
