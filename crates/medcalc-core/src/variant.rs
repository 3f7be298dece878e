use crate::error::{CalculationError, SchemaError};
use crate::result::Computation;
use crate::schema::Schema;
use crate::values::Inputs;

/// A calculator-specific formula: a pure function from validated inputs to
/// a [`Computation`]. Two calls with identical inputs must return identical
/// computations.
pub trait Variant: Send + Sync {
    /// Identifier schemas use to select this variant (e.g. "insulin").
    fn id(&self) -> &str;

    /// Field ids the formula reads. Checked against the schema at load time.
    fn required_fields(&self) -> Vec<String>;

    /// Compute the result. Domain violations (a zero denominator, an
    /// impossible combination) are reported as [`CalculationError`], never
    /// replaced by a default.
    fn calculate(&self, inputs: &Inputs) -> Result<Computation, CalculationError>;
}

/// Check that `variant` is the one `schema` selects and that every field it
/// reads is declared.
pub fn bind<V: Variant + ?Sized>(schema: &Schema, variant: &V) -> Result<(), SchemaError> {
    if schema.variant != variant.id() {
        return Err(SchemaError::VariantMismatch {
            declared: schema.variant.clone(),
            bound: variant.id().to_string(),
        });
    }
    for field in variant.required_fields() {
        if schema.field(&field).is_none() {
            return Err(SchemaError::VariantFieldMissing {
                variant: variant.id().to_string(),
                field,
            });
        }
    }
    Ok(())
}
