use thiserror::Error;

/// Errors raised while reconciling or exporting an invoice.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvoiceError {
    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Computed aggregates failed an internal identity.
    #[error("reconciliation failed: {0}")]
    Reconciliation(String),

    /// XML generation error.
    #[error("XML error: {0}")]
    Xml(String),

    /// Draft JSON could not be parsed.
    #[error("JSON error: {0}")]
    Json(String),

    /// A rendition (e.g. PDF) could not be produced.
    #[error("render error: {0}")]
    Render(String),
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "seller.address.country_code").
    pub field: String,
    /// Human-readable error description, suitable for display as-is.
    pub message: String,
    /// EN 16931 business term or rule ID if applicable (e.g. "BT-40").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule ID.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error tied to an EN 16931 term or rule.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}
