use medcalc_core::{CalculationError, Computation, Inputs, Severity, Variant};

use crate::Instrument;
use crate::scoring::ItemSum;

const SCALE: ItemSum = ItemSum::of("glasgow", &["ocular", "verbal", "motora"], "pontos");

/// At or below this score the airway is considered unprotected.
const AIRWAY_THRESHOLD: f64 = 8.0;

/// Glasgow Coma Scale (3-15).
pub struct Glasgow;

impl Variant for Glasgow {
    fn id(&self) -> &str {
        "glasgow"
    }

    fn required_fields(&self) -> Vec<String> {
        SCALE.required_fields()
    }

    fn calculate(&self, inputs: &Inputs) -> Result<Computation, CalculationError> {
        let computation = SCALE.score(inputs)?;
        if computation.total <= AIRWAY_THRESHOLD {
            return Ok(computation.with_advisory(
                Severity::Error,
                "Glasgow ≤ 8: considerar proteção de via aérea (intubação orotraqueal)",
            ));
        }
        Ok(computation)
    }
}

impl Instrument for Glasgow {
    fn name(&self) -> &str {
        "Escala de Coma de Glasgow"
    }

    fn schema_json(&self) -> &'static str {
        include_str!("../../schemas/glasgow.json")
    }
}
