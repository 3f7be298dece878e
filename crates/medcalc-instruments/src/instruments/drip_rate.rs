use medcalc_core::{CalculationError, Computation, Inputs, Variant};

use crate::Instrument;

/// Microdrip sets deliver 60 drops per mL.
const MICRODRIP_FACTOR: f64 = 60.0;

/// Infusion drip rate: volume times the set's drop factor over minutes.
pub struct DripRate;

impl Variant for DripRate {
    fn id(&self) -> &str {
        "drip_rate"
    }

    fn required_fields(&self) -> Vec<String> {
        ["volume", "tempo", "tempoUnidade", "equipo"]
            .map(String::from)
            .to_vec()
    }

    fn calculate(&self, inputs: &Inputs) -> Result<Computation, CalculationError> {
        let volume = inputs.number("volume")?;
        let time = inputs.number("tempo")?;
        let factor = inputs.number("equipo")?;

        let minutes = match inputs.choice("tempoUnidade")? {
            "min" => time,
            _ => time * 60.0,
        };
        if minutes <= 0.0 {
            return Err(CalculationError::domain(
                "O tempo de infusão deve ser maior que zero",
            ));
        }

        let unit = if factor == MICRODRIP_FACTOR {
            "microgotas/min"
        } else {
            "gotas/min"
        };
        Ok(Computation::new((volume * factor / minutes).round(), unit)
            .with_item("volume", volume)
            .with_item("minutos", minutes)
            .with_item("equipo", factor))
    }
}

impl Instrument for DripRate {
    fn name(&self) -> &str {
        "Gotejamento de Soluções"
    }

    fn schema_json(&self) -> &'static str {
        include_str!("../../schemas/drip_rate.json")
    }
}
