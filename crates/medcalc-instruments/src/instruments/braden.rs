use medcalc_core::{CalculationError, Computation, Inputs, Variant};

use crate::Instrument;
use crate::scoring::ItemSum;

const SCALE: ItemSum = ItemSum::of(
    "braden",
    &[
        "percepcao",
        "umidade",
        "atividade",
        "mobilidade",
        "nutricao",
        "friccao",
    ],
    "pontos",
);

/// Braden scale for pressure injury risk (6-23). Lower is riskier.
pub struct Braden;

impl Variant for Braden {
    fn id(&self) -> &str {
        "braden"
    }

    fn required_fields(&self) -> Vec<String> {
        SCALE.required_fields()
    }

    fn calculate(&self, inputs: &Inputs) -> Result<Computation, CalculationError> {
        SCALE.score(inputs)
    }
}

impl Instrument for Braden {
    fn name(&self) -> &str {
        "Escala de Braden"
    }

    fn schema_json(&self) -> &'static str {
        include_str!("../../schemas/braden.json")
    }
}
