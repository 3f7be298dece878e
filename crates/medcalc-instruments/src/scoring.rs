//! Formula building blocks shared by the bundled instruments.

use medcalc_core::{CalculationError, Computation, Inputs, Value, Variant};

/// `numerator / denominator`. The reference dosage formula: volume to
/// draw equals the prescribed amount divided by the concentration.
#[derive(Debug, Clone, Copy)]
pub struct Ratio {
    id: &'static str,
    numerator: &'static str,
    denominator: &'static str,
    unit: &'static str,
}

impl Ratio {
    pub const fn new(
        id: &'static str,
        numerator: &'static str,
        denominator: &'static str,
        unit: &'static str,
    ) -> Self {
        Self {
            id,
            numerator,
            denominator,
            unit,
        }
    }

    /// `prescribedAmount / concentration`, in mL.
    pub const fn reference() -> Self {
        Self::new("ratio", "prescribedAmount", "concentration", "mL")
    }

    /// Read both operands and divide. A zero denominator is a domain error.
    pub fn divide(&self, inputs: &Inputs) -> Result<(f64, f64, f64), CalculationError> {
        let numerator = inputs.number(self.numerator)?;
        let denominator = inputs.number(self.denominator)?;
        if denominator == 0.0 {
            return Err(CalculationError::domain(format!(
                "O divisor ({}) não pode ser zero",
                self.denominator
            )));
        }
        Ok((numerator, denominator, numerator / denominator))
    }
}

impl Variant for Ratio {
    fn id(&self) -> &str {
        self.id
    }

    fn required_fields(&self) -> Vec<String> {
        vec![self.numerator.to_string(), self.denominator.to_string()]
    }

    fn calculate(&self, inputs: &Inputs) -> Result<Computation, CalculationError> {
        let (numerator, denominator, quotient) = self.divide(inputs)?;
        Ok(Computation::new(quotient, self.unit)
            .with_item(self.numerator, numerator)
            .with_item(self.denominator, denominator))
    }
}

#[derive(Debug, Clone, Copy)]
enum Items {
    /// Every select input, whatever its id.
    AllSelects,
    Fixed(&'static [&'static str]),
}

/// Sum of scored items. Each item's score is recorded in the breakdown.
#[derive(Debug, Clone, Copy)]
pub struct ItemSum {
    id: &'static str,
    items: Items,
    unit: &'static str,
}

impl ItemSum {
    pub const fn of(id: &'static str, items: &'static [&'static str], unit: &'static str) -> Self {
        Self {
            id,
            items: Items::Fixed(items),
            unit,
        }
    }

    pub const fn all_selects(id: &'static str, unit: &'static str) -> Self {
        Self {
            id,
            items: Items::AllSelects,
            unit,
        }
    }

    pub fn score(&self, inputs: &Inputs) -> Result<Computation, CalculationError> {
        let mut computation = Computation::new(0.0, self.unit);
        match self.items {
            Items::Fixed(items) => {
                for item in items {
                    computation = computation.with_item(*item, inputs.number(item)?);
                }
            }
            Items::AllSelects => {
                for (id, value) in inputs.iter() {
                    if matches!(value, Value::Choice { .. }) {
                        computation = computation.with_item(id, inputs.number(id)?);
                    }
                }
            }
        }
        computation.total = computation.per_item.values().sum();
        Ok(computation)
    }
}

impl Variant for ItemSum {
    fn id(&self) -> &str {
        self.id
    }

    fn required_fields(&self) -> Vec<String> {
        match self.items {
            Items::Fixed(items) => items.iter().map(ToString::to_string).collect(),
            Items::AllSelects => Vec::new(),
        }
    }

    fn calculate(&self, inputs: &Inputs) -> Result<Computation, CalculationError> {
        self.score(inputs)
    }
}
