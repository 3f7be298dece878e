use medcalc_core::{CalculationError, Computation, Inputs, Variant};

use crate::Instrument;
use crate::scoring::ItemSum;

const SCALE: ItemSum = ItemSum::of(
    "barthel",
    &[
        "alimentacao",
        "banho",
        "higiene",
        "vestir",
        "intestino",
        "bexiga",
        "toalete",
        "transferencia",
        "mobilidade",
        "escadas",
    ],
    "pontos",
);

/// Barthel index of independence in activities of daily living (0-100).
pub struct Barthel;

impl Variant for Barthel {
    fn id(&self) -> &str {
        "barthel"
    }

    fn required_fields(&self) -> Vec<String> {
        SCALE.required_fields()
    }

    fn calculate(&self, inputs: &Inputs) -> Result<Computation, CalculationError> {
        SCALE.score(inputs)
    }
}

impl Instrument for Barthel {
    fn name(&self) -> &str {
        "Índice de Barthel"
    }

    fn schema_json(&self) -> &'static str {
        include_str!("../../schemas/barthel.json")
    }
}
