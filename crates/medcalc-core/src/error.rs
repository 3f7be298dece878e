use thiserror::Error;

use crate::condition::ConditionError;

/// A malformed or inconsistent calculator schema. Detected once at load time
/// and never retried; it blocks only the calculator it belongs to.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("schema declares no form sections")]
    NoSections,

    #[error("section '{section}' has no fields")]
    EmptySection { section: String },

    #[error("duplicate field id '{0}'")]
    DuplicateFieldId(String),

    #[error("field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("field '{field}' references unknown field '{reference}'")]
    UnknownFieldReference { field: String, reference: String },

    #[error("audit step {index} ('{label}'): {reason}")]
    InvalidAuditStep {
        index: usize,
        label: String,
        reason: String,
    },

    #[error("interpretation band {index}: {reason}")]
    InvalidBand { index: usize, reason: String },

    #[error("alert rule {index} has an invalid condition: {source}")]
    InvalidCondition {
        index: usize,
        #[source]
        source: ConditionError,
    },

    #[error("checklist '{list}': {reason}")]
    InvalidChecklist { list: String, reason: String },

    #[error("action '{0}' is declared more than once")]
    DuplicateAction(String),

    #[error("unknown calculator variant '{0}'")]
    UnknownVariant(String),

    #[error("schema selects variant '{declared}' but was bound to '{bound}'")]
    VariantMismatch { declared: String, bound: String },

    #[error("variant '{variant}' requires field '{field}', which the schema does not declare")]
    VariantFieldMissing { variant: String, field: String },
}

impl SchemaError {
    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// A variant-specific domain violation. Recoverable: reported to the user,
/// no result is produced and the entered values are kept.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error("missing input '{0}'")]
    MissingInput(String),

    #[error("input '{field}' is not numeric")]
    NotNumeric { field: String },

    #[error("{0}")]
    Domain(String),

    #[error("calculation produced a non-finite result")]
    NonFinite,
}

impl CalculationError {
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }
}
