//! medcalc-core
//!
//! Pure domain types for the calculator engine: the declarative schema a
//! calculator page is built from, typed field values, computed results, the
//! restricted alert-condition grammar and the export payload. No rendering,
//! no I/O beyond loading a schema file.

pub mod condition;
pub mod error;
pub mod report;
pub mod result;
pub mod schema;
pub mod values;
pub mod variant;

pub use condition::Condition;
pub use error::{CalculationError, SchemaError};
pub use result::{Advisory, CalcResult, Computation, Severity};
pub use schema::Schema;
pub use values::{FieldValues, Inputs, Value};
pub use variant::{Variant, bind};
