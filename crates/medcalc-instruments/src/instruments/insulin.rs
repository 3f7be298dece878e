use medcalc_core::values::format_number;
use medcalc_core::{CalculationError, Computation, Inputs, Severity, Variant};

use crate::Instrument;
use crate::scoring::Ratio;

const AMOUNT: &str = "prescribedAmount";
const CONCENTRATION: &str = "concentration";
const FORMULA: Ratio = Ratio::new("insulin", AMOUNT, CONCENTRATION, "mL");

/// Insulin volume to draw: prescribed dose (UI) over concentration (UI/mL).
/// Insulin is a high-alert medication; concentrated formulations and large
/// doses carry a double-check advisory.
pub struct Insulin;

impl Variant for Insulin {
    fn id(&self) -> &str {
        "insulin"
    }

    fn required_fields(&self) -> Vec<String> {
        FORMULA.required_fields()
    }

    fn calculate(&self, inputs: &Inputs) -> Result<Computation, CalculationError> {
        if inputs.number(AMOUNT)? <= 0.0 {
            return Err(CalculationError::domain(
                "A prescrição deve ser um número positivo",
            ));
        }
        if inputs.number(CONCENTRATION)? <= 0.0 {
            return Err(CalculationError::domain(
                "A concentração da insulina deve ser maior que zero",
            ));
        }
        let (dose, concentration, volume) = FORMULA.divide(inputs)?;

        let mut computation = Computation::new(volume, "mL")
            .with_item(AMOUNT, dose)
            .with_item(CONCENTRATION, concentration)
            .with_label("concentrationType", format!("U{}", format_number(concentration)));

        if concentration >= 200.0 {
            computation = computation.with_advisory(
                Severity::Warning,
                format!(
                    "Insulina U{} de alta concentração: medicamento de alta vigilância, \
                     exige dupla checagem",
                    format_number(concentration)
                ),
            );
        }
        if dose > 100.0 {
            computation = computation.with_advisory(
                Severity::Warning,
                "Dose superior a 100 UI: confirme a prescrição antes de aspirar",
            );
        }
        Ok(computation)
    }
}

impl Instrument for Insulin {
    fn name(&self) -> &str {
        "Cálculo de Dose de Insulina"
    }

    fn schema_json(&self) -> &'static str {
        include_str!("../../schemas/insulin.json")
    }
}
