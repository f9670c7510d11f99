use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Peppol BIS Billing 3.0 specification identifier (BT-24).
pub const PEPPOL_CUSTOMIZATION_ID: &str =
    "urn:cen.eu:en16931:2017#compliant#urn:fdc:peppol.eu:2017:poacc:billing:3.0";

/// Peppol BIS Billing 3.0 business process identifier (BT-23).
pub const PEPPOL_PROFILE_ID: &str = "urn:fdc:peppol.eu:2017:poacc:billing:01:1.0";

/// UNTDID 1001 code 380, commercial invoice.
pub const TYPE_CODE_INVOICE: &str = "380";

/// UNTDID 4461 payment means codes used by the export rules.
pub mod means_code {
    /// 10: in cash.
    pub const CASH: &str = "10";
    /// 30: credit transfer.
    pub const CREDIT_TRANSFER: &str = "30";
    /// 48: bank card.
    pub const BANK_CARD: &str = "48";

    /// Payment status written as an invoice note when the invoice is
    /// already settled at issue (cash or card).
    pub fn settled_note(code: &str) -> Option<&'static str> {
        match code.trim() {
            CASH => Some("Paid by Cash"),
            BANK_CARD => Some("Paid by Credit Card"),
            _ => None,
        }
    }
}

/// Invoice draft, the user-edited root aggregate.
///
/// The draft is plain data. It is handed to the calculation engine, the
/// validation engine, and the serializer by reference and none of them
/// mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub header: Header,
    /// BG-4: Seller.
    pub seller: Party,
    /// BG-7: Buyer.
    pub buyer: Party,
    /// BG-16: Payment instructions.
    pub payment: Payment,
    /// BG-20: Document-level allowances.
    pub document_allowances: Vec<AllowanceCharge>,
    /// BG-21: Document-level charges.
    pub document_charges: Vec<AllowanceCharge>,
    /// BG-25: Invoice lines.
    pub lines: Vec<InvoiceLine>,
}

/// Document header terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// BT-1: Invoice number.
    pub invoice_number: String,
    /// BT-2: Issue date, ISO 8601 `YYYY-MM-DD`.
    pub issue_date: String,
    /// BT-9: Payment due date, ISO 8601 `YYYY-MM-DD`.
    pub due_date: Option<String>,
    /// BT-3: Invoice type code (UNTDID 1001).
    pub type_code: String,
    /// BT-5: Invoice currency code (ISO 4217).
    pub currency_code: String,
    /// Document language (ISO 639-1).
    pub language_code: String,
    /// BT-24: Specification identifier.
    pub customization_id: String,
    /// BT-23: Business process type.
    pub profile_id: String,
    /// BT-10: Buyer reference.
    pub buyer_reference: Option<String>,
    /// BT-22: Invoice note.
    pub note: Option<String>,
    /// BT-113: Paid amount.
    pub prepaid_amount: Option<Decimal>,
    /// BT-114: Rounding amount.
    pub rounding_amount: Option<Decimal>,
}

/// BG-4 / BG-7: Party (seller or buyer).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// BT-27 / BT-44: Legal name.
    pub name: String,
    /// BT-28 / BT-45: Trading name.
    pub trade_name: Option<String>,
    /// BT-30 / BT-47: Legal registration identifier.
    pub legal_registration_id: Option<String>,
    /// BT-31 / BT-48: VAT identifier.
    pub vat_id: Option<String>,
    /// BG-5 / BG-8: Postal address.
    pub address: Address,
    /// BG-6 / BG-9: Contact information.
    pub contact: Contact,
    /// BT-34 / BT-49: Electronic address.
    pub electronic_address: Option<ElectronicAddress>,
}

/// BG-5 / BG-8: Postal address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// BT-35 / BT-50: Address line 1.
    pub line1: Option<String>,
    /// BT-37 / BT-52: City.
    pub city: String,
    /// BT-38 / BT-53: Post code.
    pub postal_code: Option<String>,
    /// BT-40 / BT-55: Country code (ISO 3166-1 alpha-2).
    pub country_code: String,
}

/// BG-6 / BG-9: Contact information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// BT-42 / BT-57: Telephone.
    pub phone: Option<String>,
    /// BT-43 / BT-58: Email.
    pub email: Option<String>,
}

/// Electronic address with scheme identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectronicAddress {
    /// Scheme identifier (e.g. "EM" for email, "0088" for GLN).
    pub scheme: String,
    /// Address value.
    pub value: String,
}

/// BG-16: Payment instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// BT-81: Payment means type code (UNTDID 4461).
    pub means_type_code: String,
    /// BG-17: Payee accounts. Authoritative when non-empty.
    pub accounts: Vec<BankAccount>,
    /// First account IBAN, kept for readers of the flat shape.
    pub account_id: Option<String>,
    /// First account bank name, kept for readers of the flat shape.
    pub bank_name: Option<String>,
}

/// BG-17: Credit transfer account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    /// BT-84: Payment account identifier (IBAN).
    pub account_id: String,
    /// Bank name shown under the financial institution.
    pub bank_name: Option<String>,
}

impl Payment {
    /// Whether this is a credit transfer (UNTDID 4461 code 30).
    pub fn is_credit_transfer(&self) -> bool {
        self.means_type_code.trim() == means_code::CREDIT_TRANSFER
    }

    /// The account used for export: `accounts[0]`, or the flat pair when
    /// `accounts` is empty.
    pub fn primary_account(&self) -> Option<BankAccount> {
        if let Some(first) = self.accounts.first() {
            return Some(first.clone());
        }
        self.account_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .map(|id| BankAccount {
                account_id: id.to_string(),
                bank_name: self.bank_name.clone(),
            })
    }

    /// Restore `account_id`/`bank_name` from `accounts[0]` after a mutation.
    pub fn sync_primary_account(&mut self) {
        if let Some(first) = self.accounts.first() {
            self.account_id = Some(first.account_id.clone());
            self.bank_name = first.bank_name.clone();
        }
    }
}

impl Default for Payment {
    fn default() -> Self {
        Self {
            means_type_code: means_code::CREDIT_TRANSFER.to_string(),
            accounts: Vec::new(),
            account_id: None,
            bank_name: None,
        }
    }
}

/// Document-level allowance or charge (BG-20 / BG-21).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowanceCharge {
    /// BT-92 / BT-99: Amount.
    pub amount: Decimal,
    /// BT-93 / BT-100: Base amount.
    pub base_amount: Option<Decimal>,
    /// BT-94 / BT-101: Percentage.
    pub percent: Option<Decimal>,
    /// BT-98 / BT-105: Reason code (UNTDID 5189 / 7161).
    pub reason_code: Option<String>,
    /// BT-97 / BT-104: Reason text.
    pub reason: Option<String>,
    /// BT-95 / BT-102: VAT category code.
    pub vat_category_code: String,
    /// BT-96 / BT-103: VAT rate.
    pub vat_rate: Decimal,
}

/// BG-25: Invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// BT-126: Line identifier, unique within the draft.
    pub id: String,
    /// BT-129: Invoiced quantity.
    pub quantity: Decimal,
    /// BT-130: Unit of measure (UN/ECE Rec 20).
    pub unit_code: String,
    /// BT-153: Item name.
    pub item_name: String,
    /// BT-154: Item description.
    pub item_description: Option<String>,
    /// BT-146: Item net price.
    pub net_price: Decimal,
    /// Fixed-amount line discount (BT-136), clamped to the line subtotal.
    pub discount_amount: Decimal,
    /// BT-151: VAT category code.
    pub vat_category_code: String,
    /// BT-152: VAT rate.
    pub vat_rate: Decimal,
    /// BG-27: Line allowances (not priced by this engine, must stay empty).
    pub line_allowances: Vec<AllowanceCharge>,
    /// BG-28: Line charges (not priced by this engine, must stay empty).
    pub line_charges: Vec<AllowanceCharge>,
}

impl InvoiceLine {
    /// Default line: one piece, zero price, standard rate 21%.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            quantity: Decimal::ONE,
            unit_code: "C62".to_string(),
            item_name: String::new(),
            item_description: None,
            net_price: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            vat_category_code: "S".to_string(),
            vat_rate: Decimal::new(21, 0),
            line_allowances: Vec::new(),
            line_charges: Vec::new(),
        }
    }
}

impl Default for Header {
    fn default() -> Self {
        Self {
            invoice_number: String::new(),
            issue_date: String::new(),
            due_date: None,
            type_code: TYPE_CODE_INVOICE.to_string(),
            currency_code: "EUR".to_string(),
            language_code: "en".to_string(),
            customization_id: PEPPOL_CUSTOMIZATION_ID.to_string(),
            profile_id: PEPPOL_PROFILE_ID.to_string(),
            buyer_reference: None,
            note: None,
            prepaid_amount: None,
            rounding_amount: None,
        }
    }
}

impl Default for InvoiceDraft {
    fn default() -> Self {
        Self {
            header: Header::default(),
            seller: Party::default(),
            buyer: Party::default(),
            payment: Payment::default(),
            document_allowances: Vec::new(),
            document_charges: Vec::new(),
            lines: vec![InvoiceLine::with_id("1")],
        }
    }
}

impl InvoiceDraft {
    /// Append a default line whose id is one past the highest numeric id.
    pub fn add_line(&mut self) -> &mut InvoiceLine {
        let next = self
            .lines
            .iter()
            .filter_map(|l| l.id.trim().parse::<u64>().ok())
            .max()
            .map_or(1, |n| n + 1);
        self.lines.push(InvoiceLine::with_id(next.to_string()));
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    /// Remove the line at `index`. The last remaining line is never removed.
    /// Returns whether a line was removed.
    pub fn remove_line(&mut self, index: usize) -> bool {
        if self.lines.len() <= 1 || index >= self.lines.len() {
            return false;
        }
        self.lines.remove(index);
        true
    }
}

/// Per-line computed amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTotals {
    /// BT-126 of the source line.
    pub id: String,
    /// Quantity × net price.
    pub line_subtotal: Decimal,
    /// Clamped fixed-amount discount.
    pub line_discount_amount: Decimal,
    /// BT-131: Line net amount.
    pub line_net_amount: Decimal,
    /// Line VAT at the line's rate.
    pub line_tax_amount: Decimal,
    /// Line net plus line VAT.
    pub line_gross_amount: Decimal,
}

/// Rounded amounts of one document allowance or charge (BG-20 / BG-21).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceChargeTotals {
    /// BT-92 / BT-99: Amount.
    pub amount: Decimal,
    /// BT-93 / BT-100: Base amount, present only for percentage entries.
    pub base_amount: Option<Decimal>,
}

/// BG-23: VAT breakdown bucket per (category, rate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatBucket {
    /// BT-118: VAT category code.
    pub category_code: String,
    /// BT-119: VAT rate.
    pub rate: Decimal,
    /// BT-116: Taxable amount.
    pub taxable_amount: Decimal,
    /// BT-117: Tax amount.
    pub tax_amount: Decimal,
}

/// BG-22: Document totals derived from a draft.
///
/// Recomputed from scratch on every call to [`calc_invoice`](super::calc_invoice);
/// the serializer consumes it without recomputing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedTotals {
    /// BT-5: Currency of every amount.
    pub currency_code: String,
    /// Per-line amounts, in draft line order.
    pub lines: Vec<LineTotals>,
    /// BT-106: Sum of line net amounts.
    pub subtotal: Decimal,
    /// BG-20: Per-allowance amounts, in draft order.
    pub document_allowances: Vec<AllowanceChargeTotals>,
    /// BG-21: Per-charge amounts, in draft order.
    pub document_charges: Vec<AllowanceChargeTotals>,
    /// BT-107: Sum of document allowances.
    pub document_discount: Decimal,
    /// BT-108: Sum of document charges.
    pub document_charge: Decimal,
    /// BT-109: Total without VAT.
    pub tax_exclusive_amount: Decimal,
    /// BG-23: VAT breakdown.
    pub tax_breakdown: Vec<VatBucket>,
    /// BT-110: Total VAT.
    pub total_vat: Decimal,
    /// BT-112: Total with VAT.
    pub tax_inclusive_amount: Decimal,
    /// BT-113: Paid amount.
    pub prepaid_amount: Decimal,
    /// BT-114: Rounding amount.
    pub rounding_amount: Decimal,
    /// BT-115: Amount due for payment.
    pub payable_amount: Decimal,
}
