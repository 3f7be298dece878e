use medcalc_core::{CalculationError, Computation, Inputs, Severity, Variant};

use crate::Instrument;
use crate::scoring::ItemSum;

/// Discharge from post-anesthesia care requires at least this score.
pub const DISCHARGE_THRESHOLD: f64 = 9.0;

const SCALE: ItemSum = ItemSum::of(
    "aldrete",
    &[
        "activity",
        "respiration",
        "circulation",
        "consciousness",
        "oxygenation",
    ],
    "pontos",
);

/// Aldrete-Kroulik post-anesthesia recovery score: five items, 0-2 each.
pub struct Aldrete;

impl Variant for Aldrete {
    fn id(&self) -> &str {
        "aldrete"
    }

    fn required_fields(&self) -> Vec<String> {
        SCALE.required_fields()
    }

    fn calculate(&self, inputs: &Inputs) -> Result<Computation, CalculationError> {
        let computation = SCALE.score(inputs)?;
        let advisory = if computation.total >= DISCHARGE_THRESHOLD {
            (Severity::Success, "Paciente apto para alta da SRPA (pontuação ≥ 9)")
        } else {
            (Severity::Info, "Manter na SRPA até pontuação ≥ 9")
        };
        Ok(computation.with_advisory(advisory.0, advisory.1))
    }
}

impl Instrument for Aldrete {
    fn name(&self) -> &str {
        "Escala de Aldrete e Kroulik"
    }

    fn schema_json(&self) -> &'static str {
        include_str!("../../schemas/aldrete.json")
    }
}
