use medcalc_core::{CalculationError, Computation, Inputs, Variant};

use crate::Instrument;

/// Heights above this are taken to be in centimetres.
const CENTIMETRE_CUTOFF: f64 = 3.0;

/// Body mass index: weight (kg) over height squared (m).
pub struct Bmi;

impl Variant for Bmi {
    fn id(&self) -> &str {
        "bmi"
    }

    fn required_fields(&self) -> Vec<String> {
        vec!["peso".to_string(), "altura".to_string()]
    }

    fn calculate(&self, inputs: &Inputs) -> Result<Computation, CalculationError> {
        let weight = inputs.number("peso")?;
        let raw_height = inputs.number("altura")?;
        if raw_height <= 0.0 {
            return Err(CalculationError::domain("A altura deve ser maior que zero"));
        }
        let height = if raw_height > CENTIMETRE_CUTOFF {
            raw_height / 100.0
        } else {
            raw_height
        };

        Ok(Computation::new(weight / (height * height), "kg/m²")
            .with_item("peso", weight)
            .with_item("alturaMetros", height))
    }
}

impl Instrument for Bmi {
    fn name(&self) -> &str {
        "Índice de Massa Corporal"
    }

    fn schema_json(&self) -> &'static str {
        include_str!("../../schemas/bmi.json")
    }
}
