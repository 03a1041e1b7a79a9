use thiserror::Error;

/// Errors raised while assembling, signing or verifying a document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    /// A required business field is absent or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The keystore could not be opened, the alias is missing or a password was rejected.
    #[error("credential error: {0}")]
    Credential(String),

    /// The XML could not be written, parsed or navigated.
    #[error("XML processing error: {0}")]
    XmlProcessing(String),

    /// The cryptographic operation itself failed.
    #[error("signing error: {0}")]
    Signing(String),
}

impl DocumentError {
    /// Collapse a list of validation findings into a single error.
    pub fn from_findings(findings: &[ValidationError]) -> Self {
        let joined = findings
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        DocumentError::Validation(joined)
    }
}

/// A single validation finding with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the offending field (e.g. "supplier.doi").
    pub field: String,
    /// Human-readable description.
    pub message: String,
    /// SUNAT observation or catalog reference, if any.
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
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

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

/// Turn collected findings into a `Result`.
pub(crate) fn findings_to_result(findings: Vec<ValidationError>) -> Result<(), DocumentError> {
    if findings.is_empty() {
        Ok(())
    } else {
        Err(DocumentError::from_findings(&findings))
    }
}
