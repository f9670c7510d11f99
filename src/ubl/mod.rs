//! UBL 2.1 Invoice serialization (Peppol BIS Billing 3.0).
//!
//! The serializer is a formatting layer: it reads a draft and the
//! [`ComputedTotals`](crate::core::ComputedTotals) produced from it, and never
//! recomputes an amount. Callers validate and reconcile first.
//!
//! # Example
//!
//! ```no_run
//! use einvoice::core::*;
//! use einvoice::ubl;
//!
//! let draft: InvoiceDraft = todo!(); // build via InvoiceDraftBuilder
//! let computed = calc_invoice(&draft);
//! assert_reconciliation(&computed).unwrap();
//! let xml = ubl::to_ubl_xml(&draft, &computed).unwrap();
//! std::fs::write(ubl::xml_filename(&draft.header.invoice_number), xml).unwrap();
//! ```

mod invoice;
pub(crate) mod xml_utils;

pub use invoice::to_ubl_xml;

/// UBL schema version written as `cbc:UBLVersionID`.
pub const UBL_VERSION_ID: &str = "2.1";

/// Maximum length of the sanitized invoice number inside a filename.
pub const FILENAME_MAX_LEN: usize = 50;

/// UBL 2.1 namespace URIs.
pub mod ubl_ns {
    pub const INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
}

/// Export filename stem for an invoice number.
///
/// Keeps only ASCII letters, digits and `-`, caps the result at
/// [`FILENAME_MAX_LEN`] characters and prefixes `invoice-`. Falls back to
/// `invoice` when nothing survives.
///
/// ```
/// assert_eq!(einvoice::ubl::export_filename_base("2024/INV #007"), "invoice-2024INV007");
/// assert_eq!(einvoice::ubl::export_filename_base("///"), "invoice");
/// ```
pub fn export_filename_base(invoice_number: &str) -> String {
    let sanitized: String = invoice_number
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .take(FILENAME_MAX_LEN)
        .collect();
    if sanitized.is_empty() {
        "invoice".to_string()
    } else {
        format!("invoice-{sanitized}")
    }
}

/// `{base}.xml`
pub fn xml_filename(invoice_number: &str) -> String {
    format!("{}.xml", export_filename_base(invoice_number))
}

/// `{base}.pdf`
pub fn pdf_filename(invoice_number: &str) -> String {
    format!("{}.pdf", export_filename_base(invoice_number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_sanitization() {
        assert_eq!(export_filename_base("2024/INV #007"), "invoice-2024INV007");
        assert_eq!(export_filename_base("  A-1  "), "invoice-A-1");
        assert_eq!(export_filename_base(""), "invoice");
        assert_eq!(export_filename_base("Nr. ÄÖ"), "invoice-Nr");
        assert_eq!(export_filename_base("rēķins_1"), "invoice-rins1");
    }

    #[test]
    fn filename_is_capped() {
        let long = "x".repeat(80);
        let base = export_filename_base(&long);
        assert_eq!(base.len(), "invoice-".len() + FILENAME_MAX_LEN);
    }

    #[test]
    fn filename_extensions() {
        assert_eq!(xml_filename("INV-1"), "invoice-INV-1.xml");
        assert_eq!(pdf_filename(""), "invoice.pdf");
    }
}
