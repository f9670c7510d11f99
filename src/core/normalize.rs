//! Loose-to-strict boundary for drafts coming from a form or a saved file.
//!
//! [`RawInvoiceDraft`] accepts whatever shape an editor produced: every field
//! optional, numbers either as JSON numbers or as strings. [`normalize`]
//! turns it into a fully populated [`InvoiceDraft`] once, so nothing
//! downstream has to default or coerce.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;

use super::calc::{currency_decimals, round_amount};
use super::types::*;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawInvoiceDraft {
    pub header: Option<RawHeader>,
    pub seller: Option<RawParty>,
    pub buyer: Option<RawParty>,
    pub payment: Option<RawPayment>,
    pub document_allowances: Option<Vec<RawAllowanceCharge>>,
    pub document_charges: Option<Vec<RawAllowanceCharge>>,
    pub lines: Option<Vec<RawLine>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawHeader {
    #[serde(deserialize_with = "lenient_string")]
    pub invoice_number: Option<String>,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub type_code: Option<String>,
    pub currency_code: Option<String>,
    pub language_code: Option<String>,
    /// Older drafts store BT-24 under this name.
    pub specification_id: Option<String>,
    pub customization_id: Option<String>,
    pub profile_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub buyer_reference: Option<String>,
    pub note: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub prepaid_amount: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub rounding_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawParty {
    pub name: Option<String>,
    pub trade_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub legal_registration_id: Option<String>,
    pub vat_id: Option<String>,
    pub address: Option<RawAddress>,
    pub contact: Option<RawContact>,
    pub electronic_address: Option<RawElectronicAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAddress {
    pub line1: Option<String>,
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawContact {
    #[serde(deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawElectronicAddress {
    #[serde(deserialize_with = "lenient_string")]
    pub scheme: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPayment {
    #[serde(deserialize_with = "lenient_string")]
    pub means_type_code: Option<String>,
    pub accounts: Option<Vec<RawBankAccount>>,
    pub account_id: Option<String>,
    pub bank_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBankAccount {
    pub account_id: Option<String>,
    pub bank_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAllowanceCharge {
    #[serde(deserialize_with = "lenient_decimal")]
    pub amount: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub base_amount: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub percent: Option<Decimal>,
    #[serde(deserialize_with = "lenient_string")]
    pub reason_code: Option<String>,
    pub reason: Option<String>,
    pub vat_category_code: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub vat_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLine {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub quantity: Option<Decimal>,
    pub unit_code: Option<String>,
    pub item_name: Option<String>,
    pub item_description: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub net_price: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub discount_amount: Option<Decimal>,
    pub vat_category_code: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub vat_rate: Option<Decimal>,
    pub line_allowances: Option<Vec<RawAllowanceCharge>>,
    pub line_charges: Option<Vec<RawAllowanceCharge>>,
}

/// Parse a user-entered number. Anything unparseable is zero.
pub fn coerce_decimal(input: &str) -> Decimal {
    let s = input.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .unwrap_or(Decimal::ZERO)
}

struct LenientDecimal;

impl<'de> Visitor<'de> for LenientDecimal {
    type Value = Option<Decimal>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, a numeric string, or null")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(Some(Decimal::ZERO))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() {
            return Ok(Some(Decimal::ZERO));
        }
        // Display keeps the shortest round-trip form, so 0.1 stays 0.1.
        Ok(Some(coerce_decimal(&v.to_string())))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(coerce_decimal(v)))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Some(Decimal::ZERO))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Some(Decimal::ZERO))
    }
}

fn lenient_decimal<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
    d.deserialize_any(LenientDecimal)
}

struct LenientString;

impl<'de> Visitor<'de> for LenientString {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, a number, or null")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    d.deserialize_any(LenientString)
}

/// `None` for missing or blank input, otherwise the trimmed value.
fn opt(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Trimmed value, or an empty string.
fn req(value: Option<String>) -> String {
    opt(value).unwrap_or_default()
}

/// Trimmed value, or `default` when missing or blank.
fn or_default(value: Option<String>, default: String) -> String {
    opt(value).unwrap_or(default)
}

fn code(value: Option<String>) -> String {
    req(value).to_ascii_uppercase()
}

/// Build a complete draft from loosely shaped input.
pub fn normalize(raw: RawInvoiceDraft) -> InvoiceDraft {
    let header = normalize_header(raw.header.unwrap_or_default());
    let dp = currency_decimals(&header.currency_code);

    let allowances = raw
        .document_allowances
        .unwrap_or_default()
        .into_iter()
        .map(|a| normalize_allowance_charge(a, dp))
        .collect();
    let charges = raw
        .document_charges
        .unwrap_or_default()
        .into_iter()
        .map(|a| normalize_allowance_charge(a, dp))
        .collect();

    let lines: Vec<InvoiceLine> = raw
        .lines
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, l)| normalize_line(l, i, dp))
        .collect();

    InvoiceDraft {
        header,
        seller: normalize_party(raw.seller.unwrap_or_default()),
        buyer: normalize_party(raw.buyer.unwrap_or_default()),
        payment: normalize_payment(raw.payment.unwrap_or_default()),
        document_allowances: allowances,
        document_charges: charges,
        lines: if lines.is_empty() {
            vec![InvoiceLine::with_id("1")]
        } else {
            lines
        },
    }
}

impl From<RawInvoiceDraft> for InvoiceDraft {
    fn from(raw: RawInvoiceDraft) -> Self {
        normalize(raw)
    }
}

#[cfg(feature = "json")]
impl InvoiceDraft {
    /// Parse a saved or posted draft and normalize it.
    pub fn from_json(json: &str) -> Result<Self, super::error::InvoiceError> {
        let raw: RawInvoiceDraft = serde_json::from_str(json)
            .map_err(|e| super::error::InvoiceError::Json(e.to_string()))?;
        Ok(normalize(raw))
    }
}

fn normalize_header(h: RawHeader) -> Header {
    let d = Header::default();
    Header {
        invoice_number: req(h.invoice_number),
        issue_date: req(h.issue_date),
        due_date: opt(h.due_date),
        type_code: or_default(h.type_code, d.type_code),
        currency_code: opt(h.currency_code)
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or(d.currency_code),
        language_code: opt(h.language_code)
            .map(|c| c.to_ascii_lowercase())
            .unwrap_or(d.language_code),
        customization_id: opt(h.customization_id)
            .or_else(|| opt(h.specification_id))
            .unwrap_or(d.customization_id),
        profile_id: or_default(h.profile_id, d.profile_id),
        buyer_reference: opt(h.buyer_reference),
        note: opt(h.note),
        prepaid_amount: h.prepaid_amount,
        rounding_amount: h.rounding_amount,
    }
}

fn normalize_party(p: RawParty) -> Party {
    let address = p.address.unwrap_or_default();
    let contact = p.contact.unwrap_or_default();
    Party {
        name: req(p.name),
        trade_name: opt(p.trade_name),
        legal_registration_id: opt(p.legal_registration_id),
        vat_id: opt(p.vat_id),
        address: Address {
            line1: opt(address.line1),
            city: req(address.city),
            postal_code: opt(address.postal_code),
            country_code: code(address.country_code),
        },
        contact: Contact {
            phone: opt(contact.phone),
            email: opt(contact.email),
        },
        electronic_address: p.electronic_address.and_then(|e| {
            let value = opt(e.value)?;
            Some(ElectronicAddress {
                scheme: req(e.scheme),
                value,
            })
        }),
    }
}

fn normalize_payment(p: RawPayment) -> Payment {
    let legacy_id = opt(p.account_id);
    let legacy_bank = opt(p.bank_name);

    let mut accounts: Vec<BankAccount> = p
        .accounts
        .unwrap_or_default()
        .into_iter()
        .map(|a| BankAccount {
            account_id: req(a.account_id),
            bank_name: opt(a.bank_name),
        })
        .collect();
    if accounts.is_empty() {
        if let Some(id) = &legacy_id {
            accounts.push(BankAccount {
                account_id: id.clone(),
                bank_name: legacy_bank.clone(),
            });
        }
    }

    let mut payment = Payment {
        means_type_code: or_default(p.means_type_code, Payment::default().means_type_code),
        accounts,
        account_id: legacy_id,
        bank_name: legacy_bank,
    };
    payment.sync_primary_account();
    payment
}

fn normalize_allowance_charge(a: RawAllowanceCharge, dp: u32) -> AllowanceCharge {
    let mut amount = a.amount.unwrap_or(Decimal::ZERO);
    if amount.is_zero() {
        if let (Some(base), Some(pct)) = (a.base_amount, a.percent) {
            amount = base
                .checked_mul(pct)
                .map_or(Decimal::ZERO, |v| round_amount(v / dec!(100), dp));
        }
    }
    AllowanceCharge {
        amount,
        base_amount: a.base_amount,
        percent: a.percent,
        reason_code: opt(a.reason_code),
        reason: opt(a.reason),
        vat_category_code: opt(a.vat_category_code)
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or_else(|| "S".to_string()),
        vat_rate: a.vat_rate.unwrap_or(dec!(21)),
    }
}

fn normalize_line(l: RawLine, index: usize, dp: u32) -> InvoiceLine {
    let d = InvoiceLine::with_id((index + 1).to_string());
    InvoiceLine {
        id: or_default(l.id, d.id),
        quantity: l.quantity.unwrap_or(d.quantity),
        unit_code: or_default(l.unit_code, d.unit_code),
        item_name: req(l.item_name),
        item_description: opt(l.item_description),
        net_price: l.net_price.unwrap_or(d.net_price),
        discount_amount: l.discount_amount.unwrap_or(d.discount_amount),
        vat_category_code: opt(l.vat_category_code)
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or(d.vat_category_code),
        vat_rate: l.vat_rate.unwrap_or(d.vat_rate),
        line_allowances: l
            .line_allowances
            .unwrap_or_default()
            .into_iter()
            .map(|a| normalize_allowance_charge(a, dp))
            .collect(),
        line_charges: l
            .line_charges
            .unwrap_or_default()
            .into_iter()
            .map(|a| normalize_allowance_charge(a, dp))
            .collect(),
    }
}
