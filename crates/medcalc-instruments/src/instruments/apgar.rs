use medcalc_core::{CalculationError, Computation, Inputs, Severity, Variant};

use crate::Instrument;

const SIGNS: [&str; 5] = ["frequencia", "respiracao", "tonus", "reflexo", "cor"];

/// Apgar score at the first and fifth minute. The fifth-minute score is
/// the result; both are kept in the breakdown.
pub struct Apgar;

fn minute_fields(minute: u8) -> impl Iterator<Item = String> {
    SIGNS.iter().map(move |sign| format!("{sign}{minute}"))
}

fn score_at(inputs: &Inputs, minute: u8) -> Result<f64, CalculationError> {
    minute_fields(minute).try_fold(0.0, |acc, field| Ok(acc + inputs.number(&field)?))
}

impl Variant for Apgar {
    fn id(&self) -> &str {
        "apgar"
    }

    fn required_fields(&self) -> Vec<String> {
        minute_fields(1).chain(minute_fields(5)).collect()
    }

    fn calculate(&self, inputs: &Inputs) -> Result<Computation, CalculationError> {
        let first = score_at(inputs, 1)?;
        let fifth = score_at(inputs, 5)?;

        let mut computation = Computation::new(fifth, "pontos")
            .with_item("apgar1", first)
            .with_item("apgar5", fifth);
        if fifth < 7.0 {
            computation = computation.with_advisory(
                Severity::Warning,
                "Apgar < 7 no 5º minuto: repetir a avaliação a cada 5 minutos até 20 minutos de vida",
            );
        }
        Ok(computation)
    }
}

impl Instrument for Apgar {
    fn name(&self) -> &str {
        "Escala de Apgar"
    }

    fn schema_json(&self) -> &'static str {
        include_str!("../../schemas/apgar.json")
    }
}
