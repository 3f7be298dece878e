//! The declarative description of a calculator page.
//!
//! The JSON shape follows the site's page configuration (`form.sections`,
//! `calculation.audit.steps`, `calculation.interpretation`, ...). A schema
//! is only usable after [`Schema::validate`] succeeds; the loaders call it.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::condition::{Condition, ConditionError};
use crate::error::SchemaError;
use crate::values::format_number;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Schema {
    /// Stable identifier (e.g. "insulina", "aldrete").
    pub id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Registered variant that computes the result (e.g. "insulin", "aldrete").
    pub variant: String,

    pub form: Form,

    /// Fields carrying patient identification for the exported report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientFields>,

    pub calculation: CalculationSpec,

    /// Safety checklists shown with the result and printed in the report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklists: Option<Checklists>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Form {
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Section {
    pub title: String,
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FieldDescriptor {
    /// Unique across every section of the schema.
    pub id: String,

    pub label: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Makes this field required whenever the named field has a value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_if: Option<String>,

    #[serde(flatten)]
    pub kind: FieldKind,
}

/// Per-type field attributes, tagged by the JSON `type` key.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "lowercase")]
#[ts(export)]
pub enum FieldKind {
    Select {
        options: Vec<SelectOption>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Scalar>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        /// Values above this ceiling raise a warning, not an error.
        #[serde(default, rename = "softMax", skip_serializing_if = "Option::is_none")]
        soft_max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Scalar>,
    },
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
    Date,
    #[serde(rename = "datetime")]
    DateTime,
}

impl FieldKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Select { .. } => "select",
            Self::Number { .. } => "number",
            Self::Text { .. } => "text",
            Self::Date => "date",
            Self::DateTime => "datetime",
        }
    }
}

/// A literal that page configurations write either as a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SelectOption {
    pub value: Scalar,
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PatientFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
}

/// Medication safety checklists. A list the schema leaves out falls back
/// to the standard one, so `"checklists": {}` yields both standard lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Checklists {
    /// "Nove certos da medicação".
    #[serde(default = "standard_nine_rights")]
    pub nine_rights: Vec<String>,

    /// International patient safety goals.
    #[serde(default = "standard_safety_goals")]
    pub safety_goals: Vec<SafetyGoal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SafetyGoal {
    pub id: u32,
    pub text: String,
    #[serde(default, alias = "class")]
    pub severity_class: String,
}

impl Default for Checklists {
    fn default() -> Self {
        Self {
            nine_rights: standard_nine_rights(),
            safety_goals: standard_safety_goals(),
        }
    }
}

fn standard_nine_rights() -> Vec<String> {
    [
        "Paciente Certo",
        "Medicação Certa",
        "Dose Certa",
        "Via Certa",
        "Hora Certa",
        "Registro Certo",
        "Validade Certa",
        "Resposta Certa",
        "Forma Farmacêutica Certa",
    ]
    .map(String::from)
    .to_vec()
}

fn standard_safety_goals() -> Vec<SafetyGoal> {
    [
        (1, "Identificar o paciente corretamente", "glass-meta-blue"),
        (2, "Comunicação efetiva na passagem de plantão", "glass-meta-blue"),
        (3, "Segurança de medicamentos de alta vigilância", "glass-meta-orange"),
        (6, "Reduzir o risco de quedas do paciente", "glass-meta-blue"),
    ]
    .into_iter()
    .map(|(id, text, class)| SafetyGoal {
        id,
        text: text.to_string(),
        severity_class: class.to_string(),
    })
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CalculationSpec {
    pub result: ResultSpec,

    #[serde(default)]
    pub audit: AuditSpec,

    /// Ordered ascending by upper bound; the last band is unbounded.
    #[serde(default)]
    pub interpretation: Vec<Band>,

    #[serde(default)]
    pub alerts: Vec<AlertRule>,

    #[serde(default)]
    pub action_buttons: Vec<ActionButtonSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResultSpec {
    pub label: String,
    pub unit: String,
    /// Decimal places used when the total is displayed.
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    2
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuditSpec {
    #[serde(default)]
    pub steps: Vec<AuditStepSpec>,
}

/// One line of the audit trail. Exactly one of `source_field`,
/// `fixed_value` and `template` is set.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuditStepSpec {
    pub label: String,

    #[serde(default)]
    pub icon: String,

    /// Key into the computed result (`total`, `unit`, an item or label key).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_value: Option<String>,

    /// Text with `{{key}}` placeholders resolved from the result.
    #[serde(
        default,
        alias = "dynamicExpression",
        skip_serializing_if = "Option::is_none"
    )]
    pub template: Option<String>,

    /// Appended after a looked-up value, separated by a space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

/// Borrowed view of the single value source of an audit step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditSource<'a> {
    Field {
        key: &'a str,
        suffix: Option<&'a str>,
    },
    Fixed(&'a str),
    Template(&'a str),
}

impl AuditStepSpec {
    pub fn source(&self) -> Option<AuditSource<'_>> {
        match (&self.source_field, &self.fixed_value, &self.template) {
            (Some(key), None, None) => Some(AuditSource::Field {
                key,
                suffix: self.suffix.as_deref(),
            }),
            (None, Some(value), None) => Some(AuditSource::Fixed(value)),
            (None, None, Some(template)) => Some(AuditSource::Template(template)),
            _ => None,
        }
    }
}

/// An interpretation bucket. `max` is the inclusive upper bound; `None`
/// stands for +infinity and is only valid on the last band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Band {
    #[serde(default)]
    pub max: Option<f64>,

    pub label: String,

    #[serde(default, alias = "color")]
    pub severity_class: String,

    #[serde(default, alias = "conduct")]
    pub recommendation: String,
}

impl Band {
    pub fn contains(&self, total: f64) -> bool {
        self.max.is_none_or(|max| max >= total)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AlertRule {
    /// Expression over the result total, e.g. `result > 30`.
    pub condition: String,
    pub message: String,
    #[serde(default)]
    pub severity: AlertSeverity,
}

impl AlertRule {
    pub fn compile(&self) -> Result<Condition, ConditionError> {
        Condition::parse(&self.condition)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AlertSeverity {
    Info,
    #[default]
    Warning,
    #[serde(alias = "danger")]
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ActionButtonSpec {
    pub label: String,

    #[serde(default)]
    pub icon: String,

    #[serde(default, rename = "type")]
    pub style: ButtonStyle,

    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ButtonStyle {
    Primary,
    #[default]
    Secondary,
}

/// What an action button does once a result is displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action")]
#[ts(export)]
pub enum Action {
    #[serde(rename = "generatePDF")]
    GenerateReport,
    #[serde(rename = "copyResult")]
    CopyResult,
    #[serde(rename = "openReference", alias = "searchNursingDiagnosis")]
    OpenReference {
        #[serde(default = "default_reference_topic")]
        topic: String,
    },
}

fn default_reference_topic() -> String {
    "nanda".to_string()
}

impl Action {
    /// Key used for the button binding id (`btn-action-<key>`).
    pub fn key(&self) -> &'static str {
        match self {
            Self::GenerateReport => "generatePDF",
            Self::CopyResult => "copyResult",
            Self::OpenReference { .. } => "openReference",
        }
    }
}

impl Schema {
    /// Parse a schema from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let schema: Schema = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Parse a schema from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// All fields in render order: section order, then field order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.form.sections.iter().flat_map(|s| s.fields.iter())
    }

    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields().find(|f| f.id == id)
    }

    /// Check every structural invariant of the schema.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.id.trim().is_empty() {
            return Err(SchemaError::MissingField("id".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(SchemaError::MissingField("title".to_string()));
        }
        if self.variant.trim().is_empty() {
            return Err(SchemaError::MissingField("variant".to_string()));
        }
        if self.calculation.result.label.trim().is_empty() {
            return Err(SchemaError::MissingField(
                "calculation.result.label".to_string(),
            ));
        }

        self.validate_fields()?;
        self.validate_patient()?;
        self.validate_audit_steps()?;
        self.validate_checklists()?;
        validate_bands(&self.calculation.interpretation)?;

        for (index, rule) in self.calculation.alerts.iter().enumerate() {
            rule.compile()
                .map_err(|source| SchemaError::InvalidCondition { index, source })?;
        }

        let mut actions = HashSet::new();
        for button in &self.calculation.action_buttons {
            if !actions.insert(button.action.key()) {
                return Err(SchemaError::DuplicateAction(
                    button.action.key().to_string(),
                ));
            }
        }

        Ok(())
    }

    fn validate_fields(&self) -> Result<(), SchemaError> {
        if self.form.sections.is_empty() {
            return Err(SchemaError::NoSections);
        }

        let mut seen = HashSet::new();
        for section in &self.form.sections {
            if section.fields.is_empty() {
                return Err(SchemaError::EmptySection {
                    section: section.title.clone(),
                });
            }
            for field in &section.fields {
                if field.id.trim().is_empty() {
                    return Err(SchemaError::MissingField(format!(
                        "field id in section '{}'",
                        section.title
                    )));
                }
                if !seen.insert(field.id.as_str()) {
                    return Err(SchemaError::DuplicateFieldId(field.id.clone()));
                }
                validate_kind(field)?;
            }
        }

        for field in self.fields() {
            if let Some(reference) = &field.required_if
                && (reference == &field.id || !seen.contains(reference.as_str()))
            {
                return Err(SchemaError::UnknownFieldReference {
                    field: field.id.clone(),
                    reference: reference.clone(),
                });
            }
        }

        Ok(())
    }

    fn validate_patient(&self) -> Result<(), SchemaError> {
        let Some(patient) = &self.patient else {
            return Ok(());
        };
        for reference in [&patient.name, &patient.birthdate].into_iter().flatten() {
            if self.field(reference).is_none() {
                return Err(SchemaError::UnknownFieldReference {
                    field: "patient".to_string(),
                    reference: reference.clone(),
                });
            }
        }
        Ok(())
    }

    fn validate_checklists(&self) -> Result<(), SchemaError> {
        let Some(checklists) = &self.checklists else {
            return Ok(());
        };
        if let Some(index) = checklists
            .nine_rights
            .iter()
            .position(|item| item.trim().is_empty())
        {
            return Err(SchemaError::InvalidChecklist {
                list: "nineRights".to_string(),
                reason: format!("item {index} is empty"),
            });
        }
        let mut ids = HashSet::new();
        for goal in &checklists.safety_goals {
            if goal.text.trim().is_empty() {
                return Err(SchemaError::InvalidChecklist {
                    list: "safetyGoals".to_string(),
                    reason: format!("goal {} has no text", goal.id),
                });
            }
            if !ids.insert(goal.id) {
                return Err(SchemaError::InvalidChecklist {
                    list: "safetyGoals".to_string(),
                    reason: format!("goal {} is declared more than once", goal.id),
                });
            }
        }
        Ok(())
    }

    fn validate_audit_steps(&self) -> Result<(), SchemaError> {
        for (index, step) in self.calculation.audit.steps.iter().enumerate() {
            let populated = [
                step.source_field.is_some(),
                step.fixed_value.is_some(),
                step.template.is_some(),
            ]
            .into_iter()
            .filter(|set| *set)
            .count();

            if populated != 1 {
                return Err(SchemaError::InvalidAuditStep {
                    index,
                    label: step.label.clone(),
                    reason: format!(
                        "exactly one of sourceField, fixedValue or template must be set ({populated} found)"
                    ),
                });
            }
            if step.suffix.is_some() && step.source_field.is_none() {
                return Err(SchemaError::InvalidAuditStep {
                    index,
                    label: step.label.clone(),
                    reason: "suffix only applies to sourceField steps".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn validate_kind(field: &FieldDescriptor) -> Result<(), SchemaError> {
    match &field.kind {
        FieldKind::Select { options, default } => {
            if options.is_empty() {
                return Err(SchemaError::invalid_field(
                    &field.id,
                    "select field has no options",
                ));
            }
            let mut values = HashSet::new();
            for option in options {
                if !values.insert(option.value.to_string()) {
                    return Err(SchemaError::invalid_field(
                        &field.id,
                        format!("duplicate option value '{}'", option.value),
                    ));
                }
            }
            if let Some(default) = default
                && !values.contains(&default.to_string())
            {
                return Err(SchemaError::invalid_field(
                    &field.id,
                    format!("default '{default}' is not one of the options"),
                ));
            }
        }
        FieldKind::Number {
            min,
            max,
            soft_max,
            step,
            default,
            ..
        } => {
            let bounds = [
                ("min", min),
                ("max", max),
                ("softMax", soft_max),
                ("step", step),
            ];
            for (name, bound) in bounds {
                if let Some(value) = bound
                    && !value.is_finite()
                {
                    return Err(SchemaError::invalid_field(
                        &field.id,
                        format!("{name} must be finite"),
                    ));
                }
            }
            if let (Some(min), Some(max)) = (min, max)
                && min > max
            {
                return Err(SchemaError::invalid_field(&field.id, "min exceeds max"));
            }
            if let Some(soft) = soft_max
                && (min.is_some_and(|min| *soft < min) || max.is_some_and(|max| *soft > max))
            {
                return Err(SchemaError::invalid_field(
                    &field.id,
                    "softMax lies outside min..max",
                ));
            }
            if let Some(step) = step
                && *step <= 0.0
            {
                return Err(SchemaError::invalid_field(&field.id, "step must be positive"));
            }
            if let Some(default) = default {
                let value = match default {
                    Scalar::Number(n) => Some(*n),
                    Scalar::Text(text) => crate::values::parse_number(text),
                };
                let Some(value) = value.filter(|v| v.is_finite()) else {
                    return Err(SchemaError::invalid_field(
                        &field.id,
                        format!("default '{default}' is not numeric"),
                    ));
                };
                if value < 0.0 {
                    return Err(SchemaError::invalid_field(
                        &field.id,
                        format!("default {default} is negative"),
                    ));
                }
                if let Some(min) = min
                    && value < *min
                {
                    return Err(SchemaError::invalid_field(
                        &field.id,
                        format!("default {default} is below min {min}"),
                    ));
                }
                if let Some(max) = max
                    && value > *max
                {
                    return Err(SchemaError::invalid_field(
                        &field.id,
                        format!("default {default} exceeds max {max}"),
                    ));
                }
            }
        }
        FieldKind::Text { .. } | FieldKind::Date | FieldKind::DateTime => {}
    }
    Ok(())
}

/// Bands must partition the real line: finite, strictly ascending upper
/// bounds with exactly the last band left unbounded.
pub fn validate_bands(bands: &[Band]) -> Result<(), SchemaError> {
    let Some(last) = bands.len().checked_sub(1) else {
        return Ok(());
    };

    let mut previous: Option<f64> = None;
    for (index, band) in bands.iter().enumerate() {
        match (band.max, index == last) {
            (None, true) => {}
            (None, false) => {
                return Err(SchemaError::InvalidBand {
                    index,
                    reason: "only the last band may be unbounded".to_string(),
                });
            }
            (Some(_), true) => {
                return Err(SchemaError::InvalidBand {
                    index,
                    reason: "the last band must be unbounded (omit max)".to_string(),
                });
            }
            (Some(max), false) => {
                if !max.is_finite() {
                    return Err(SchemaError::InvalidBand {
                        index,
                        reason: "upper bound must be finite".to_string(),
                    });
                }
                if let Some(prev) = previous
                    && max <= prev
                {
                    return Err(SchemaError::InvalidBand {
                        index,
                        reason: format!(
                            "upper bound {} does not exceed the previous bound {}",
                            format_number(max),
                            format_number(prev)
                        ),
                    });
                }
                previous = Some(max);
            }
        }
    }
    Ok(())
}
