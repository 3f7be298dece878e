use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CalculationError;
use crate::schema::{FieldKind, Schema};

/// Raw field values as entered, keyed by field id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues(BTreeMap<String, String>);

impl FieldValues {
    /// The initial state of a form: each field's declared default, the
    /// first option for selects without one, empty otherwise.
    pub fn defaults(schema: &Schema) -> Self {
        let values = schema
            .fields()
            .map(|field| {
                let value = match &field.kind {
                    FieldKind::Select { options, default } => default
                        .as_ref()
                        .or_else(|| options.first().map(|o| &o.value))
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    FieldKind::Number { default, .. } => {
                        default.as_ref().map(ToString::to_string).unwrap_or_default()
                    }
                    FieldKind::Text { default, .. } => default.clone().unwrap_or_default(),
                    FieldKind::Date | FieldKind::DateTime => String::new(),
                };
                (field.id.clone(), value)
            })
            .collect();
        Self(values)
    }

    /// Raw value for a field; empty when never set.
    pub fn get(&self, id: &str) -> &str {
        self.0.get(id).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, id: impl Into<String>, raw: impl Into<String>) {
        self.0.insert(id.into(), raw.into());
    }

    pub fn is_blank(&self, id: &str) -> bool {
        self.get(id).trim().is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A validated, typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Empty,
    Number(f64),
    Choice { value: String, label: String },
    Text(String),
    Date(jiff::civil::Date),
    DateTime(jiff::civil::DateTime),
}

impl Value {
    /// Human-readable form used in reports: option labels for selects,
    /// ISO dates, trimmed numbers.
    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(n) => format_number(*n),
            Self::Choice { label, .. } => label.clone(),
            Self::Text(text) => text.clone(),
            Self::Date(date) => date.to_string(),
            Self::DateTime(dt) => dt.strftime("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Typed inputs handed to a variant. Only ever built from values that
/// passed validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    values: BTreeMap<String, Value>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, value: Value) -> Self {
        self.insert(id, value);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, value: Value) {
        self.values.insert(id.into(), value);
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Numeric value of a number field, or the numeric value of the chosen
    /// option of a scored select.
    pub fn number(&self, id: &str) -> Result<f64, CalculationError> {
        self.optional_number(id)?
            .ok_or_else(|| CalculationError::MissingInput(id.to_string()))
    }

    pub fn optional_number(&self, id: &str) -> Result<Option<f64>, CalculationError> {
        match self.values.get(id) {
            None | Some(Value::Empty) => Ok(None),
            Some(Value::Number(n)) => Ok(Some(*n)),
            Some(Value::Choice { value, .. }) => parse_number(value)
                .map(Some)
                .ok_or_else(|| CalculationError::NotNumeric {
                    field: id.to_string(),
                }),
            Some(_) => Err(CalculationError::NotNumeric {
                field: id.to_string(),
            }),
        }
    }

    /// Raw option value of a select.
    pub fn choice(&self, id: &str) -> Result<&str, CalculationError> {
        match self.values.get(id) {
            Some(Value::Choice { value, .. }) => Ok(value),
            _ => Err(CalculationError::MissingInput(id.to_string())),
        }
    }

    pub fn text(&self, id: &str) -> Result<&str, CalculationError> {
        match self.values.get(id) {
            Some(Value::Text(text)) => Ok(text),
            _ => Err(CalculationError::MissingInput(id.to_string())),
        }
    }

    /// Sum the numeric values of several fields, in the given order.
    pub fn sum(&self, ids: &[&str]) -> Result<f64, CalculationError> {
        ids.iter().try_fold(0.0, |acc, id| Ok(acc + self.number(id)?))
    }
}

/// Parse a user-entered number. Accepts the pt-BR decimal comma.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };
    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a number without a trailing `.0` for whole values.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Format a number with a fixed number of decimals.
pub fn format_fixed(value: f64, decimals: u8) -> String {
    format!("{value:.prec$}", prec = usize::from(decimals))
}

/// The value exactly as [`format_fixed`] displays it.
pub fn round_fixed(value: f64, decimals: u8) -> f64 {
    format_fixed(value, decimals).parse().unwrap_or(value)
}
