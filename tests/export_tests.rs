#![cfg(feature = "export")]

use std::sync::{Arc, Mutex};

use einvoice::core::*;
use einvoice::export::*;
use rust_decimal_macros::dec;

fn draft() -> InvoiceDraft {
    InvoiceDraftBuilder::new("2024/INV #007", "2024-06-15")
        .seller(
            PartyBuilder::new("Seller SIA", AddressBuilder::new("Riga", "LV").build())
                .vat_id("LV40003245752")
                .build(),
        )
        .buyer(PartyBuilder::new("Buyer AS", AddressBuilder::new("Tallinn", "EE").build()).build())
        .payment_account("LV80BANK0000435195001", None)
        .add_line(
            InvoiceLineBuilder::new("1", "Consulting", dec!(2), "HUR", dec!(100))
                .vat("S", dec!(21))
                .build(),
        )
        .build()
}

/// Records what it was asked to render.
#[derive(Clone, Default)]
struct RecordingRenderer {
    seen: Arc<Mutex<Vec<(String, String)>>>,
}

impl DocumentRenderer for RecordingRenderer {
    fn render(
        &self,
        draft: &InvoiceDraft,
        computed: &ComputedTotals,
    ) -> Result<Vec<u8>, InvoiceError> {
        self.seen.lock().unwrap().push((
            draft.header.invoice_number.clone(),
            computed.payable_amount.to_string(),
        ));
        Ok(b"%PDF-1.7 stub".to_vec())
    }
}

struct FailingRenderer;

impl DocumentRenderer for FailingRenderer {
    fn render(&self, _: &InvoiceDraft, _: &ComputedTotals) -> Result<Vec<u8>, InvoiceError> {
        Err(InvoiceError::Render("font missing".into()))
    }
}

#[test]
fn export_without_renderer() {
    let bundle = Exporter::default().export(&draft()).unwrap();
    assert_eq!(bundle.computed.payable_amount, dec!(242.00));
    assert_eq!(bundle.filename_base, "invoice-2024INV007");
    assert_eq!(bundle.xml_filename(), "invoice-2024INV007.xml");
    assert_eq!(bundle.pdf_filename(), "invoice-2024INV007.pdf");
    assert!(bundle.xml.contains(r#"<cbc:PayableAmount currencyID="EUR">242.00</cbc:PayableAmount>"#));
    assert!(bundle.rendition.is_none());
}

#[test]
fn renderer_sees_the_same_totals() {
    let renderer = RecordingRenderer::default();
    let exporter = Exporter::default().with_renderer(renderer.clone());
    let bundle = exporter.export(&draft()).unwrap();

    assert_eq!(bundle.rendition.as_deref(), Some(&b"%PDF-1.7 stub"[..]));
    let seen = renderer.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "2024/INV #007");
    assert_eq!(seen[0].1, bundle.computed.payable_amount.to_string());
}

#[test]
fn rendition_can_be_switched_off() {
    let renderer = RecordingRenderer::default();
    let exporter = Exporter::new(ExportOptions {
        render_pdf: false,
        ..ExportOptions::default()
    })
    .with_renderer(renderer.clone());
    let bundle = exporter.export(&draft()).unwrap();
    assert!(bundle.rendition.is_none());
    assert!(renderer.seen.lock().unwrap().is_empty());
}

#[test]
fn validation_failure_blocks_everything() {
    let renderer = RecordingRenderer::default();
    let exporter = Exporter::default().with_renderer(renderer.clone());
    let mut d = draft();
    d.header.invoice_number.clear();
    d.payment.accounts.clear();
    d.payment.account_id = None;

    let err = exporter.export(&d).unwrap_err();
    assert_eq!(err.stage, ExportStage::Validation);
    assert_eq!(
        err.messages,
        vec![
            "Invoice number (BT-1) is required".to_string(),
            "At least one bank account (IBAN) is required for credit transfer".to_string(),
        ]
    );
    assert!(renderer.seen.lock().unwrap().is_empty());
}

#[test]
fn renderer_failure_is_reported() {
    let exporter = Exporter::default().with_renderer(FailingRenderer);
    let err = exporter.export(&draft()).unwrap_err();
    assert_eq!(err.stage, ExportStage::Render);
    assert_eq!(err.messages, vec![MSG_RENDER_FAILED.to_string()]);
    assert!(err.to_string().starts_with("export blocked at render:"));
}

#[test]
fn export_options_apply_to_validation() {
    let mut d = draft();
    d.seller.contact.email = Some("me@yopmail.com".into());
    assert_eq!(
        Exporter::default().export(&d).unwrap_err().stage,
        ExportStage::Validation
    );

    let exporter = Exporter::new(ExportOptions {
        validation: ValidationOptions {
            reject_disposable_email: false,
            ..ValidationOptions::default()
        },
        ..ExportOptions::default()
    });
    assert!(exporter.export(&d).is_ok());
    assert!(!exporter.options().validation.reject_disposable_email);
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn capture_logs(f: impl FnOnce()) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    buffer.contents()
}

#[test]
fn export_logs_each_stage_inside_its_span() {
    let logs = capture_logs(|| {
        assert!(Exporter::default().export(&draft()).is_ok());
    });
    let lines: Vec<&str> = logs.lines().collect();
    assert!(!lines.is_empty());
    assert!(
        lines
            .iter()
            .all(|l| l.contains("export{invoice_number=2024/INV #007}")),
        "{logs}"
    );
    assert!(logs.contains("DEBUG"), "{logs}");
    assert!(logs.contains("export: totals reconciled"), "{logs}");
    assert!(logs.contains("payable=242"), "{logs}");
    assert!(logs.contains("currency=EUR"), "{logs}");
    let done = lines
        .iter()
        .find(|l| l.contains("invoice exported"))
        .expect("success event");
    assert!(done.contains("INFO"));
    assert!(done.contains("filename=invoice-2024INV007"));
    assert!(done.contains("rendered=false"));
}

#[test]
fn blocked_export_logs_a_warning() {
    let mut d = draft();
    d.header.invoice_number = "INV-9".into();
    d.seller.name.clear();
    let logs = capture_logs(|| {
        assert!(Exporter::default().export(&d).is_err());
    });
    let warning = logs
        .lines()
        .find(|l| l.contains("export blocked by validation"))
        .expect("warning event");
    assert!(warning.contains("WARN"));
    assert!(warning.contains("export{invoice_number=INV-9}"));
    assert!(warning.contains("error_count=1"));
    assert!(!logs.contains("invoice exported"));
}
