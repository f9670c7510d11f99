use rust_decimal::Decimal;

use super::xml_utils::{XmlResult, XmlWriter, format_decimal};
use super::{UBL_VERSION_ID, ubl_ns};
use crate::core::*;
use crate::core::reason_codes::{
    LINE_DISCOUNT_REASON_CODE, allowance_reason, charge_reason,
};

/// Generate a Peppol BIS Billing 3.0 UBL 2.1 Invoice from a draft and its
/// computed totals.
///
/// Siblings are written directly in UBL schema order. Every amount comes
/// from `computed`; the draft supplies only identities, codes and texts.
/// Fails with [`InvoiceError::Xml`] when the writer fails or when `computed`
/// was not produced from `draft` (line, allowance or charge count mismatch).
pub fn to_ubl_xml(draft: &InvoiceDraft, computed: &ComputedTotals) -> XmlResult {
    for (what, computed_len, draft_len) in [
        ("lines", computed.lines.len(), draft.lines.len()),
        (
            "allowances",
            computed.document_allowances.len(),
            draft.document_allowances.len(),
        ),
        (
            "charges",
            computed.document_charges.len(),
            draft.document_charges.len(),
        ),
    ] {
        if computed_len != draft_len {
            return Err(InvoiceError::Xml(format!(
                "computed totals cover {computed_len} {what} but the draft has {draft_len}"
            )));
        }
    }

    let h = &draft.header;
    let currency = computed.currency_code.as_str();
    let dp = currency_decimals(currency);
    let mut w = XmlWriter::new()?;

    w.start_element_with_attrs(
        "Invoice",
        &[
            ("xmlns", ubl_ns::INVOICE),
            ("xmlns:cac", ubl_ns::CAC),
            ("xmlns:cbc", ubl_ns::CBC),
        ],
    )?;

    w.text_element("cbc:UBLVersionID", UBL_VERSION_ID)?;
    // BT-24
    w.text_element("cbc:CustomizationID", &h.customization_id)?;
    // BT-23
    w.text_element("cbc:ProfileID", &h.profile_id)?;
    // BT-1
    w.text_element("cbc:ID", &h.invoice_number)?;
    // BT-2
    w.text_element("cbc:IssueDate", &h.issue_date)?;
    // BT-9
    if let Some(due) = non_empty(&h.due_date) {
        w.text_element("cbc:DueDate", due)?;
    }
    // BT-3
    w.text_element("cbc:InvoiceTypeCode", &h.type_code)?;
    // BT-22
    if let Some(note) = non_empty(&h.note) {
        w.text_element("cbc:Note", note)?;
    }
    if !h.language_code.trim().is_empty() {
        w.text_element(
            "cbc:Note",
            &format!("Document language: {}", h.language_code.trim().to_uppercase()),
        )?;
    }
    if let Some(status) = means_code::settled_note(&draft.payment.means_type_code) {
        w.text_element("cbc:Note", status)?;
    }
    // BT-5
    w.text_element("cbc:DocumentCurrencyCode", currency)?;
    // BT-10
    if let Some(reference) = non_empty(&h.buyer_reference) {
        w.text_element("cbc:BuyerReference", reference)?;
    }

    // BG-4 / BG-7
    write_ubl_party(&mut w, &draft.seller, "cac:AccountingSupplierParty")?;
    write_ubl_party(&mut w, &draft.buyer, "cac:AccountingCustomerParty")?;

    // BG-16
    write_payment_means(&mut w, &draft.payment)?;

    // BG-20 / BG-21
    for (allowance, totals) in draft
        .document_allowances
        .iter()
        .zip(&computed.document_allowances)
    {
        write_ubl_allowance_charge(&mut w, allowance, totals, false, currency, dp)?;
    }
    for (charge, totals) in draft
        .document_charges
        .iter()
        .zip(&computed.document_charges)
    {
        write_ubl_allowance_charge(&mut w, charge, totals, true, currency, dp)?;
    }

    // BG-23
    w.start_element("cac:TaxTotal")?;
    w.amount_element("cbc:TaxAmount", computed.total_vat, currency, TAX_DECIMALS)?;
    for bucket in &computed.tax_breakdown {
        w.start_element("cac:TaxSubtotal")?;
        w.amount_element("cbc:TaxableAmount", bucket.taxable_amount, currency, dp)?;
        w.amount_element("cbc:TaxAmount", bucket.tax_amount, currency, TAX_DECIMALS)?;
        write_tax_category(&mut w, "cac:TaxCategory", &bucket.category_code, bucket.rate)?;
        w.end_element("cac:TaxSubtotal")?;
    }
    w.end_element("cac:TaxTotal")?;

    // BG-22
    w.start_element("cac:LegalMonetaryTotal")?;
    w.amount_element("cbc:LineExtensionAmount", computed.subtotal, currency, dp)?;
    w.amount_element(
        "cbc:TaxExclusiveAmount",
        computed.tax_exclusive_amount,
        currency,
        dp,
    )?;
    w.amount_element(
        "cbc:TaxInclusiveAmount",
        computed.tax_inclusive_amount,
        currency,
        dp,
    )?;
    if !computed.document_discount.is_zero() {
        w.amount_element(
            "cbc:AllowanceTotalAmount",
            computed.document_discount,
            currency,
            dp,
        )?;
    }
    if !computed.document_charge.is_zero() {
        w.amount_element("cbc:ChargeTotalAmount", computed.document_charge, currency, dp)?;
    }
    if !computed.prepaid_amount.is_zero() {
        w.amount_element("cbc:PrepaidAmount", computed.prepaid_amount, currency, dp)?;
    }
    if !computed.rounding_amount.is_zero() {
        w.amount_element(
            "cbc:PayableRoundingAmount",
            computed.rounding_amount,
            currency,
            dp,
        )?;
    }
    w.amount_element("cbc:PayableAmount", computed.payable_amount, currency, dp)?;
    w.end_element("cac:LegalMonetaryTotal")?;

    // BG-25
    for (line, totals) in draft.lines.iter().zip(&computed.lines) {
        write_ubl_line(&mut w, line, totals, currency, dp)?;
    }

    w.end_element("Invoice")?;
    w.into_string()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn write_ubl_party(w: &mut XmlWriter, party: &Party, wrapper: &str) -> Result<(), InvoiceError> {
    w.start_element(wrapper)?;
    w.start_element("cac:Party")?;

    // BT-34 / BT-49
    if let Some(ea) = &party.electronic_address {
        w.text_element_with_attrs("cbc:EndpointID", &ea.value, &[("schemeID", &ea.scheme)])?;
    }

    // BT-28 / BT-45, else the legal name
    let display_name = non_empty(&party.trade_name).unwrap_or(party.name.trim());
    if !display_name.is_empty() {
        w.start_element("cac:PartyName")?;
        w.text_element("cbc:Name", display_name)?;
        w.end_element("cac:PartyName")?;
    }

    // BG-5 / BG-8
    w.start_element("cac:PostalAddress")?;
    if let Some(street) = non_empty(&party.address.line1) {
        w.text_element("cbc:StreetName", street)?;
    }
    if !party.address.city.trim().is_empty() {
        w.text_element("cbc:CityName", &party.address.city)?;
    }
    if let Some(zip) = non_empty(&party.address.postal_code) {
        w.text_element("cbc:PostalZone", zip)?;
    }
    w.start_element("cac:Country")?;
    w.text_element("cbc:IdentificationCode", &party.address.country_code)?;
    w.end_element("cac:Country")?;
    w.end_element("cac:PostalAddress")?;

    // BT-31 / BT-48
    if let Some(vat_id) = non_empty(&party.vat_id) {
        w.start_element("cac:PartyTaxScheme")?;
        w.text_element("cbc:CompanyID", vat_id)?;
        w.start_element("cac:TaxScheme")?;
        w.text_element("cbc:ID", "VAT")?;
        w.end_element("cac:TaxScheme")?;
        w.end_element("cac:PartyTaxScheme")?;
    }

    // BT-27 / BT-44, BT-30 / BT-47
    w.start_element("cac:PartyLegalEntity")?;
    w.text_element("cbc:RegistrationName", &party.name)?;
    if let Some(reg_id) = non_empty(&party.legal_registration_id) {
        w.text_element("cbc:CompanyID", reg_id)?;
    }
    w.end_element("cac:PartyLegalEntity")?;

    // BG-6 / BG-9
    let phone = non_empty(&party.contact.phone);
    let email = non_empty(&party.contact.email);
    if phone.is_some() || email.is_some() {
        w.start_element("cac:Contact")?;
        if let Some(phone) = phone {
            w.text_element("cbc:Telephone", phone)?;
        }
        if let Some(email) = email {
            w.text_element("cbc:ElectronicMail", email)?;
        }
        w.end_element("cac:Contact")?;
    }

    w.end_element("cac:Party")?;
    w.end_element(wrapper)?;
    Ok(())
}

fn write_payment_means(w: &mut XmlWriter, payment: &Payment) -> Result<(), InvoiceError> {
    w.start_element("cac:PaymentMeans")?;
    // BT-81
    let code = payment.means_type_code.trim();
    w.text_element(
        "cbc:PaymentMeansCode",
        if code.is_empty() { means_code::CREDIT_TRANSFER } else { code },
    )?;

    // BG-17
    if payment.is_credit_transfer() {
        if let Some(account) = payment
            .primary_account()
            .filter(|a| !a.account_id.trim().is_empty())
        {
            let iban: String = account
                .account_id
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_uppercase();
            w.start_element("cac:PayeeFinancialAccount")?;
            w.text_element("cbc:ID", &iban)?;
            if let Some(bank) = non_empty(&account.bank_name) {
                w.start_element("cac:FinancialInstitutionBranch")?;
                w.start_element("cac:FinancialInstitution")?;
                w.text_element("cbc:Name", bank)?;
                w.end_element("cac:FinancialInstitution")?;
                w.end_element("cac:FinancialInstitutionBranch")?;
            }
            w.end_element("cac:PayeeFinancialAccount")?;
        }
    }

    w.end_element("cac:PaymentMeans")?;
    Ok(())
}

fn write_ubl_allowance_charge(
    w: &mut XmlWriter,
    ac: &AllowanceCharge,
    totals: &AllowanceChargeTotals,
    is_charge: bool,
    currency: &str,
    dp: u32,
) -> Result<(), InvoiceError> {
    w.start_element("cac:AllowanceCharge")?;
    w.text_element("cbc:ChargeIndicator", if is_charge { "true" } else { "false" })?;

    // BT-98 / BT-105, BT-97 / BT-104 (code description when no text given)
    let code = non_empty(&ac.reason_code);
    if let Some(code) = code {
        w.text_element("cbc:AllowanceChargeReasonCode", code)?;
    }
    let reason = non_empty(&ac.reason).or_else(|| {
        code.and_then(|c| if is_charge { charge_reason(c) } else { allowance_reason(c) })
    });
    if let Some(reason) = reason {
        w.text_element("cbc:AllowanceChargeReason", reason)?;
    }

    // BT-94 / BT-101
    if let Some(pct) = ac.percent.filter(|p| !p.is_zero()) {
        w.text_element("cbc:MultiplierFactorNumeric", &format_decimal(pct))?;
    }
    // BT-92 / BT-99
    w.amount_element("cbc:Amount", totals.amount, currency, dp)?;
    // BT-93 / BT-100
    if let Some(base) = totals.base_amount {
        w.amount_element("cbc:BaseAmount", base, currency, dp)?;
    }
    // BT-95 / BT-102, BT-96 / BT-103
    write_tax_category(w, "cac:TaxCategory", &ac.vat_category_code, ac.vat_rate)?;

    w.end_element("cac:AllowanceCharge")?;
    Ok(())
}

/// Category code, percent and the VAT scheme. Category O (not subject to
/// VAT) carries no percent.
fn write_tax_category(
    w: &mut XmlWriter,
    wrapper: &str,
    category: &str,
    rate: Decimal,
) -> Result<(), InvoiceError> {
    let category = category.trim().to_ascii_uppercase();
    w.start_element(wrapper)?;
    w.text_element("cbc:ID", &category)?;
    if category != "O" {
        w.text_element("cbc:Percent", &format_decimal(rate))?;
    }
    w.start_element("cac:TaxScheme")?;
    w.text_element("cbc:ID", "VAT")?;
    w.end_element("cac:TaxScheme")?;
    w.end_element(wrapper)?;
    Ok(())
}

fn write_ubl_line(
    w: &mut XmlWriter,
    line: &InvoiceLine,
    totals: &LineTotals,
    currency: &str,
    dp: u32,
) -> Result<(), InvoiceError> {
    w.start_element("cac:InvoiceLine")?;
    // BT-126
    w.text_element("cbc:ID", &line.id)?;
    // BT-129 / BT-130
    w.quantity_element("cbc:InvoicedQuantity", line.quantity, &line.unit_code)?;
    // BT-131
    w.amount_element("cbc:LineExtensionAmount", totals.line_net_amount, currency, dp)?;

    // BG-27: the fixed line discount
    if totals.line_discount_amount > Decimal::ZERO {
        w.start_element("cac:AllowanceCharge")?;
        w.text_element("cbc:ChargeIndicator", "false")?;
        w.text_element("cbc:AllowanceChargeReasonCode", LINE_DISCOUNT_REASON_CODE)?;
        w.amount_element("cbc:Amount", totals.line_discount_amount, currency, dp)?;
        w.end_element("cac:AllowanceCharge")?;
    }

    // BG-31
    w.start_element("cac:Item")?;
    if let Some(desc) = non_empty(&line.item_description) {
        w.text_element("cbc:Description", desc)?;
    }
    w.text_element("cbc:Name", &line.item_name)?;
    write_tax_category(w, "cac:ClassifiedTaxCategory", &line.vat_category_code, line.vat_rate)?;
    w.end_element("cac:Item")?;

    // BG-29
    w.start_element("cac:Price")?;
    w.price_element("cbc:PriceAmount", line.net_price, currency)?;
    w.end_element("cac:Price")?;

    w.end_element("cac:InvoiceLine")?;
    Ok(())
}
