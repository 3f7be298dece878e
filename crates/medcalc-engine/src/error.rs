use medcalc_core::{CalculationError, SchemaError};
use thiserror::Error;

use crate::validate::FieldIssue;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{} field(s) failed validation", .0.len())]
    Validation(Vec<FieldIssue>),

    #[error("calculation failed: {0}")]
    Calculation(#[from] CalculationError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    /// A schema that passed load-time checks still could not be applied
    /// (e.g. no interpretation band matched). Not the user's fault.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unknown field '{0}'")]
    UnknownField(String),
}

/// Failure of an export, copy or reference collaborator. Reported to the
/// user; the displayed result is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("no result to export; run a calculation first")]
    NoResult,

    #[error("export failed: {0}")]
    Sink(String),

    #[error("copy to clipboard failed: {0}")]
    Clipboard(String),
}
