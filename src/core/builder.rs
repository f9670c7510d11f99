use rust_decimal::Decimal;

use super::types::*;

/// Builder for constructing invoice drafts.
///
/// Building never fails: a draft is editable state, and whether it may be
/// exported is decided by [`validate_for_export`](super::validate_for_export).
///
/// ```
/// use einvoice::core::*;
/// use rust_decimal_macros::dec;
///
/// let draft = InvoiceDraftBuilder::new("INV-001", "2024-01-15")
///     .due_date("2024-01-29")
///     .seller(PartyBuilder::new("Seller SIA", AddressBuilder::new("Riga", "LV").build())
///         .vat_id("LV40003245752")
///         .build())
///     .buyer(PartyBuilder::new("Buyer AS", AddressBuilder::new("Tallinn", "EE").build())
///         .build())
///     .add_line(InvoiceLineBuilder::new("1", "Consulting", dec!(10), "HUR", dec!(150.00))
///         .vat("S", dec!(21))
///         .build())
///     .build();
/// assert_eq!(draft.lines.len(), 1);
/// ```
pub struct InvoiceDraftBuilder {
    header: Header,
    seller: Party,
    buyer: Party,
    payment: Payment,
    document_allowances: Vec<AllowanceCharge>,
    document_charges: Vec<AllowanceCharge>,
    lines: Vec<InvoiceLine>,
}

impl InvoiceDraftBuilder {
    pub fn new(invoice_number: impl Into<String>, issue_date: impl Into<String>) -> Self {
        Self {
            header: Header {
                invoice_number: invoice_number.into(),
                issue_date: issue_date.into(),
                ..Header::default()
            },
            seller: Party::default(),
            buyer: Party::default(),
            payment: Payment::default(),
            document_allowances: Vec::new(),
            document_charges: Vec::new(),
            lines: Vec::new(),
        }
    }

    pub fn due_date(mut self, date: impl Into<String>) -> Self {
        self.header.due_date = Some(date.into());
        self
    }

    pub fn type_code(mut self, code: impl Into<String>) -> Self {
        self.header.type_code = code.into();
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.header.currency_code = code.into();
        self
    }

    pub fn language(mut self, code: impl Into<String>) -> Self {
        self.header.language_code = code.into();
        self
    }

    pub fn customization_id(mut self, id: impl Into<String>) -> Self {
        self.header.customization_id = id.into();
        self
    }

    pub fn profile_id(mut self, id: impl Into<String>) -> Self {
        self.header.profile_id = id.into();
        self
    }

    pub fn buyer_reference(mut self, reference: impl Into<String>) -> Self {
        self.header.buyer_reference = Some(reference.into());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.header.note = Some(note.into());
        self
    }

    pub fn prepaid(mut self, amount: Decimal) -> Self {
        self.header.prepaid_amount = Some(amount);
        self
    }

    pub fn rounding(mut self, amount: Decimal) -> Self {
        self.header.rounding_amount = Some(amount);
        self
    }

    pub fn seller(mut self, party: Party) -> Self {
        self.seller = party;
        self
    }

    pub fn buyer(mut self, party: Party) -> Self {
        self.buyer = party;
        self
    }

    pub fn payment_means(mut self, code: impl Into<String>) -> Self {
        self.payment.means_type_code = code.into();
        self
    }

    /// Add a payee account. The first account is mirrored into the flat
    /// `account_id`/`bank_name` pair.
    pub fn payment_account(mut self, iban: impl Into<String>, bank_name: Option<String>) -> Self {
        self.payment.accounts.push(BankAccount {
            account_id: iban.into(),
            bank_name,
        });
        self.payment.sync_primary_account();
        self
    }

    pub fn add_allowance(mut self, allowance: AllowanceCharge) -> Self {
        self.document_allowances.push(allowance);
        self
    }

    pub fn add_charge(mut self, charge: AllowanceCharge) -> Self {
        self.document_charges.push(charge);
        self
    }

    pub fn add_line(mut self, line: InvoiceLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn build(self) -> InvoiceDraft {
        InvoiceDraft {
            header: self.header,
            seller: self.seller,
            buyer: self.buyer,
            payment: self.payment,
            document_allowances: self.document_allowances,
            document_charges: self.document_charges,
            lines: self.lines,
        }
    }
}

/// Builder for Party (seller/buyer).
pub struct PartyBuilder {
    name: String,
    trade_name: Option<String>,
    legal_registration_id: Option<String>,
    vat_id: Option<String>,
    address: Address,
    contact: Contact,
    electronic_address: Option<ElectronicAddress>,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            trade_name: None,
            legal_registration_id: None,
            vat_id: None,
            address,
            contact: Contact::default(),
            electronic_address: None,
        }
    }

    pub fn trade_name(mut self, name: impl Into<String>) -> Self {
        self.trade_name = Some(name.into());
        self
    }

    pub fn registration_id(mut self, id: impl Into<String>) -> Self {
        self.legal_registration_id = Some(id.into());
        self
    }

    pub fn vat_id(mut self, id: impl Into<String>) -> Self {
        self.vat_id = Some(id.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.contact.phone = Some(phone.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.contact.email = Some(email.into());
        self
    }

    pub fn electronic_address(
        mut self,
        scheme: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.electronic_address = Some(ElectronicAddress {
            scheme: scheme.into(),
            value: value.into(),
        });
        self
    }

    pub fn build(self) -> Party {
        Party {
            name: self.name,
            trade_name: self.trade_name,
            legal_registration_id: self.legal_registration_id,
            vat_id: self.vat_id,
            address: self.address,
            contact: self.contact,
            electronic_address: self.electronic_address,
        }
    }
}

/// Builder for Address.
pub struct AddressBuilder {
    line1: Option<String>,
    city: String,
    postal_code: Option<String>,
    country_code: String,
}

impl AddressBuilder {
    pub fn new(city: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            line1: None,
            city: city.into(),
            postal_code: None,
            country_code: country_code.into(),
        }
    }

    pub fn line1(mut self, line1: impl Into<String>) -> Self {
        self.line1 = Some(line1.into());
        self
    }

    pub fn postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    pub fn build(self) -> Address {
        Address {
            line1: self.line1,
            city: self.city,
            postal_code: self.postal_code,
            country_code: self.country_code,
        }
    }
}

/// Builder for InvoiceLine.
pub struct InvoiceLineBuilder {
    line: InvoiceLine,
}

impl InvoiceLineBuilder {
    pub fn new(
        id: impl Into<String>,
        item_name: impl Into<String>,
        quantity: Decimal,
        unit_code: impl Into<String>,
        net_price: Decimal,
    ) -> Self {
        Self {
            line: InvoiceLine {
                item_name: item_name.into(),
                quantity,
                unit_code: unit_code.into(),
                net_price,
                ..InvoiceLine::with_id(id)
            },
        }
    }

    pub fn vat(mut self, category_code: impl Into<String>, rate: Decimal) -> Self {
        self.line.vat_category_code = category_code.into();
        self.line.vat_rate = rate;
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.line.item_description = Some(desc.into());
        self
    }

    pub fn discount(mut self, amount: Decimal) -> Self {
        self.line.discount_amount = amount;
        self
    }

    pub fn build(self) -> InvoiceLine {
        self.line
    }
}

/// Builder for document-level allowances and charges.
pub struct AllowanceChargeBuilder {
    inner: AllowanceCharge,
}

impl AllowanceChargeBuilder {
    pub fn new(amount: Decimal, vat_category_code: impl Into<String>, vat_rate: Decimal) -> Self {
        Self {
            inner: AllowanceCharge {
                amount,
                base_amount: None,
                percent: None,
                reason_code: None,
                reason: None,
                vat_category_code: vat_category_code.into(),
                vat_rate,
            },
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.inner.reason = Some(reason.into());
        self
    }

    pub fn reason_code(mut self, code: impl Into<String>) -> Self {
        self.inner.reason_code = Some(code.into());
        self
    }

    /// Percentage-based allowance/charge. The amount stays as given.
    pub fn percentage(mut self, base_amount: Decimal, percent: Decimal) -> Self {
        self.inner.base_amount = Some(base_amount);
        self.inner.percent = Some(percent);
        self
    }

    pub fn build(self) -> AllowanceCharge {
        self.inner
    }
}
