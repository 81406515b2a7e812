use std::collections::BTreeMap;

use thiserror::Error;

/// Errors that can occur while deriving, encoding or decoding a tax block.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImpostoError {
    /// A mandatory tag is absent from the fragment being decoded.
    #[error("required field <{field}> missing in <{tag}>")]
    MissingField { tag: String, field: String },

    /// One or more fields are invalid, or a value cannot be derived.
    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// A numeric tag does not hold a decimal number.
    #[error("invalid number in <{field}>: '{value}'")]
    InvalidNumber { field: String, value: String },

    /// XML generation or parsing error.
    #[error("XML error: {0}")]
    Xml(String),
}

impl ImpostoError {
    /// Single-field validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![ValidationError::new(field, message)])
    }

    pub(crate) fn missing(tag: &str, field: &str) -> Self {
        Self::MissingField {
            tag: tag.to_string(),
            field: field.to_string(),
        }
    }

    /// Field → message map of a validation failure; empty for other kinds.
    pub fn fields(&self) -> BTreeMap<String, String> {
        match self {
            Self::Validation(errors) => errors
                .iter()
                .map(|e| (e.field.clone(), e.message.clone()))
                .collect(),
            Self::MissingField { field, tag } => {
                BTreeMap::from([(field.clone(), format!("missing in <{tag}>"))])
            }
            _ => BTreeMap::new(),
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "icms.substituicao.aliquota").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// NFe layout tag the rule refers to, if any (e.g. "pICMS").
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
    /// Create a validation error without a layout tag.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error tied to an NFe layout tag.
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
