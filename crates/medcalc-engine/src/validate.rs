//! Field validation. Rules apply in a fixed order and the first failing
//! rule wins: required, numeric format and bounds, soft ceiling, date
//! checks, select membership.

use jiff::civil::{Date, DateTime};
use medcalc_core::schema::{FieldDescriptor, FieldKind};
use medcalc_core::values::{format_number, parse_number};
use medcalc_core::{FieldValues, Inputs, Schema, Value};
use serde::Serialize;

use crate::error::EngineError;

/// Earliest accepted year for dates of birth and event dates.
pub const MIN_YEAR: i16 = 1900;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Ok,
    Warning(String),
    Error(String),
}

impl ValidationOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// A field-level problem, carrying the label shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub label: String,
    pub message: String,
}

impl FieldIssue {
    /// `"<label>: <message>"`, as notified.
    pub fn notification(&self) -> String {
        format!("{}: {}", self.label, self.message)
    }
}

/// Aggregated outcome of validating a whole form.
#[derive(Debug, Clone, Default)]
pub struct FormReport {
    pub errors: Vec<FieldIssue>,
    pub warnings: Vec<FieldIssue>,
    inputs: Inputs,
}

impl FormReport {
    /// The form may calculate only when no field has an error, whatever the
    /// number of warnings.
    pub fn can_calculate(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    pub fn into_inputs(self) -> Result<Inputs, EngineError> {
        if self.errors.is_empty() {
            Ok(self.inputs)
        } else {
            Err(EngineError::Validation(self.errors))
        }
    }
}

/// Validates raw field values against their descriptors. Dates are checked
/// against the clock the validator was built with.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    now: DateTime,
}

impl Validator {
    pub fn at(now: DateTime) -> Self {
        Self { now }
    }

    /// A validator using the local wall clock.
    pub fn now() -> Self {
        Self::at(jiff::Zoned::now().datetime())
    }

    /// Validate one value, honouring the field's own `required` flag.
    pub fn validate(&self, field: &FieldDescriptor, raw: &str) -> ValidationOutcome {
        outcome(self.check(field, raw, field.required))
    }

    /// Validate every field of `schema` in render order and collect the
    /// typed inputs of those that passed.
    pub fn validate_form(&self, schema: &Schema, values: &FieldValues) -> FormReport {
        let mut report = FormReport::default();
        for field in schema.fields() {
            let required = field.required
                || field
                    .required_if
                    .as_deref()
                    .is_some_and(|other| !values.is_blank(other));

            let issue = |message: String| FieldIssue {
                field: field.id.clone(),
                label: field.label.clone(),
                message,
            };
            match self.check(field, values.get(&field.id), required) {
                Ok((value, warning)) => {
                    if let Some(message) = warning {
                        report.warnings.push(issue(message));
                    }
                    report.inputs.insert(field.id.clone(), value);
                }
                Err(message) => report.errors.push(issue(message)),
            }
        }
        report
    }

    fn check(
        &self,
        field: &FieldDescriptor,
        raw: &str,
        required: bool,
    ) -> Result<(Value, Option<String>), String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return if required {
                Err("Campo obrigatório".to_string())
            } else {
                Ok((Value::Empty, None))
            };
        }

        match &field.kind {
            FieldKind::Number {
                min, max, soft_max, ..
            } => {
                let value = parse_number(raw).ok_or("Informe um valor numérico válido")?;
                if value < 0.0 {
                    return Err("O valor não pode ser negativo".to_string());
                }
                if let Some(min) = min
                    && value < *min
                {
                    return Err(format!("Valor mínimo: {}", format_number(*min)));
                }
                if let Some(max) = max
                    && value > *max
                {
                    return Err(format!("Valor máximo: {}", format_number(*max)));
                }
                let warning = soft_max.filter(|soft| value > *soft).map(|soft| {
                    format!(
                        "Valor acima do habitual ({}); confirme antes de prosseguir",
                        format_number(soft)
                    )
                });
                Ok((Value::Number(value), warning))
            }
            FieldKind::Date => {
                let date = parse_date(raw).ok_or("Data inválida")?;
                check_year(date.year())?;
                if date > self.now.date() {
                    return Err("A data não pode ser futura".to_string());
                }
                Ok((Value::Date(date), None))
            }
            FieldKind::DateTime => {
                let datetime = parse_datetime(raw).ok_or("Data e hora inválidas")?;
                check_year(datetime.year())?;
                if datetime > self.now {
                    return Err("A data e hora não podem ser futuras".to_string());
                }
                Ok((Value::DateTime(datetime), None))
            }
            FieldKind::Select { options, .. } => options
                .iter()
                .find(|option| option.value.to_string() == raw)
                .map(|option| {
                    let value = Value::Choice {
                        value: raw.to_string(),
                        label: option.label.clone(),
                    };
                    (value, None)
                })
                .ok_or_else(|| "Selecione uma opção válida".to_string()),
            FieldKind::Text { .. } => Ok((Value::Text(raw.to_string()), None)),
        }
    }
}

fn outcome(checked: Result<(Value, Option<String>), String>) -> ValidationOutcome {
    match checked {
        Ok((_, Some(warning))) => ValidationOutcome::Warning(warning),
        Ok((_, None)) => ValidationOutcome::Ok,
        Err(message) => ValidationOutcome::Error(message),
    }
}

fn check_year(year: i16) -> Result<(), String> {
    if year < MIN_YEAR {
        return Err(format!("O ano deve ser {MIN_YEAR} ou posterior"));
    }
    Ok(())
}

/// ISO `2024-03-15` or pt-BR `15/03/2024`.
fn parse_date(raw: &str) -> Option<Date> {
    raw.parse::<Date>()
        .ok()
        .or_else(|| Date::strptime("%d/%m/%Y", raw).ok())
}

/// ISO `2024-03-15T10:30` or pt-BR `15/03/2024 10:30`.
fn parse_datetime(raw: &str) -> Option<DateTime> {
    raw.parse::<DateTime>()
        .ok()
        .or_else(|| DateTime::strptime("%d/%m/%Y %H:%M", raw).ok())
}
