//! Export pipeline: validate → compute → reconcile → serialize → render.
//!
//! [`Exporter`] sequences the core in a fixed order and converts every
//! failure into user-facing messages, so nothing below it has to know how
//! errors are shown. A PDF (or any other rendition) is produced by a
//! [`DocumentRenderer`] from the same draft and totals the XML was built
//! from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::*;
use crate::ubl::{export_filename_base, to_ubl_xml};

/// Shown when computed totals fail reconciliation.
pub const MSG_RECONCILIATION: &str = "Calculations do not reconcile. Review your data.";
/// Shown when the XML document could not be built.
pub const MSG_XML_FAILED: &str = "Invoice wasn't created. Try again.";
/// Shown when the rendition could not be produced.
pub const MSG_RENDER_FAILED: &str = "PDF could not be created. Try again.";

/// Produces a human-readable rendition (typically PDF bytes) of an invoice.
///
/// Receives exactly the draft and totals the XML was generated from.
pub trait DocumentRenderer: Send + Sync {
    fn render(
        &self,
        draft: &InvoiceDraft,
        computed: &ComputedTotals,
    ) -> Result<Vec<u8>, InvoiceError>;
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub validation: ValidationOptions,
    /// Run the renderer after the XML is built. Ignored without a renderer.
    pub render_pdf: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            validation: ValidationOptions::default(),
            render_pdf: true,
        }
    }
}

/// Pipeline stage at which an export stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStage {
    Validation,
    Reconciliation,
    Xml,
    Render,
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validation => "validation",
            Self::Reconciliation => "reconciliation",
            Self::Xml => "xml",
            Self::Render => "render",
        })
    }
}

/// A blocked export. `messages` are ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFailure {
    pub stage: ExportStage,
    pub messages: Vec<String>,
}

impl fmt::Display for ExportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "export blocked at {}: {}", self.stage, self.messages.join("; "))
    }
}

impl std::error::Error for ExportFailure {}

/// Everything a successful export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    pub computed: ComputedTotals,
    /// Serialized UBL document.
    pub xml: String,
    /// Filename stem shared by the XML and the rendition.
    pub filename_base: String,
    /// Rendition bytes, when a renderer ran.
    pub rendition: Option<Vec<u8>>,
}

impl ExportBundle {
    pub fn xml_filename(&self) -> String {
        format!("{}.xml", self.filename_base)
    }

    pub fn pdf_filename(&self) -> String {
        format!("{}.pdf", self.filename_base)
    }
}

/// Runs the export pipeline for one draft at a time. Holds no state between
/// calls.
pub struct Exporter {
    options: ExportOptions,
    renderer: Option<Box<dyn DocumentRenderer>>,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            renderer: None,
        }
    }

    pub fn with_renderer(mut self, renderer: impl DocumentRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export `draft`. No partial output is returned on failure.
    #[tracing::instrument(
        name = "export",
        skip_all,
        fields(invoice_number = %draft.header.invoice_number)
    )]
    pub fn export(&self, draft: &InvoiceDraft) -> Result<ExportBundle, ExportFailure> {
        tracing::debug!("export: validating draft");

        let report = validate_for_export_with(draft, &self.options.validation);
        if !report.is_valid() {
            let messages = report.messages();
            tracing::warn!(error_count = messages.len(), "export blocked by validation");
            return Err(ExportFailure {
                stage: ExportStage::Validation,
                messages,
            });
        }

        let computed = calc_invoice(draft);
        if let Err(e) = assert_reconciliation(&computed) {
            tracing::warn!(error = %e, "export blocked by reconciliation");
            return Err(ExportFailure {
                stage: ExportStage::Reconciliation,
                messages: vec![MSG_RECONCILIATION.to_string()],
            });
        }
        tracing::debug!(
            payable = %computed.payable_amount,
            currency = %computed.currency_code,
            "export: totals reconciled"
        );

        let xml = to_ubl_xml(draft, &computed).map_err(|e| {
            tracing::error!(error = %e, "export: XML generation failed");
            ExportFailure {
                stage: ExportStage::Xml,
                messages: vec![MSG_XML_FAILED.to_string()],
            }
        })?;
        tracing::debug!(bytes = xml.len(), "export: XML written");

        let rendition = match (&self.renderer, self.options.render_pdf) {
            (Some(renderer), true) => {
                let bytes = renderer.render(draft, &computed).map_err(|e| {
                    tracing::error!(error = %e, "export: rendition failed");
                    ExportFailure {
                        stage: ExportStage::Render,
                        messages: vec![MSG_RENDER_FAILED.to_string()],
                    }
                })?;
                Some(bytes)
            }
            _ => None,
        };

        let filename_base = export_filename_base(&draft.header.invoice_number);
        tracing::info!(
            filename = %filename_base,
            rendered = rendition.is_some(),
            "invoice exported"
        );

        Ok(ExportBundle {
            computed,
            xml,
            filename_base,
            rendition,
        })
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(ExportOptions::default())
    }
}
