use medcalc_core::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("no calculator variant named '{0}'")]
    UnknownVariant(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
