//! Field renderer. Turns a schema and the current values into a tree of
//! controls and mounts it on a [`RenderTarget`], replacing whatever the
//! target showed before.

use medcalc_core::schema::{Action, ButtonStyle, Checklists, FieldKind, SelectOption};
use medcalc_core::{FieldValues, Schema, SchemaError};
use serde::Serialize;

pub const CALCULATE_BINDING: &str = "btn-calculate";
pub const RESET_BINDING: &str = "btn-reset";

/// Binding id of an action button, e.g. `btn-action-generatePDF`.
pub fn action_binding(action: &Action) -> String {
    format!("btn-action-{}", action.key())
}

/// Keystroke filter attached to a control. Cosmetic only; the validator
/// is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFilter {
    Numeric,
}

impl InputFilter {
    pub fn accepts(&self, ch: char) -> bool {
        match self {
            Self::Numeric => ch.is_ascii_digit() || matches!(ch, '.' | ','),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Control {
    Select {
        options: Vec<SelectOption>,
        selected: String,
    },
    Number {
        value: String,
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
        placeholder: Option<String>,
        filter: InputFilter,
    },
    Text {
        value: String,
        placeholder: Option<String>,
    },
    Date {
        value: String,
    },
    #[serde(rename = "datetime")]
    DateTime {
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedField {
    pub id: String,
    pub label: String,
    pub required: bool,
    pub tooltip: Option<String>,
    pub unit: Option<String>,
    pub control: Control,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSection {
    pub title: String,
    pub fields: Vec<RenderedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedAction {
    pub binding: String,
    pub label: String,
    pub icon: String,
    pub style: ButtonStyle,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedForm {
    pub calculator_id: String,
    pub title: String,
    pub description: Option<String>,
    pub sections: Vec<RenderedSection>,
    pub actions: Vec<RenderedAction>,
    pub checklists: Option<Checklists>,
}

impl RenderedForm {
    pub fn fields(&self) -> impl Iterator<Item = &RenderedField> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    /// Every event binding the form needs, calculate and reset first.
    pub fn bindings(&self) -> Vec<String> {
        [CALCULATE_BINDING.to_string(), RESET_BINDING.to_string()]
            .into_iter()
            .chain(self.actions.iter().map(|a| a.binding.clone()))
            .collect()
    }
}

/// The surface a form is mounted on.
pub trait RenderTarget: Send + Sync {
    /// Remove every binding attached by a previous render.
    fn detach_all(&mut self);

    /// Replace the displayed content with `form`.
    fn mount(&mut self, form: &RenderedForm);

    fn attach(&mut self, binding: &str);
}

/// In-memory render target. Hosts that print or serialize the form read it
/// back from here.
#[derive(Debug, Default)]
pub struct FormSurface {
    form: Option<RenderedForm>,
    bindings: Vec<String>,
    generation: u64,
}

impl FormSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> Option<&RenderedForm> {
        self.form.as_ref()
    }

    pub fn bindings(&self) -> &[String] {
        &self.bindings
    }

    /// Number of renders mounted so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl RenderTarget for FormSurface {
    fn detach_all(&mut self) {
        self.bindings.clear();
    }

    fn mount(&mut self, form: &RenderedForm) {
        self.form = Some(form.clone());
        self.generation += 1;
    }

    fn attach(&mut self, binding: &str) {
        self.bindings.push(binding.to_string());
    }
}

/// Build the control tree for `schema` showing `values`. The schema is
/// re-validated first; a malformed schema is never rendered.
pub fn render(schema: &Schema, values: &FieldValues) -> Result<RenderedForm, SchemaError> {
    schema.validate()?;

    let sections = schema
        .form
        .sections
        .iter()
        .map(|section| RenderedSection {
            title: section.title.clone(),
            fields: section
                .fields
                .iter()
                .map(|field| RenderedField {
                    id: field.id.clone(),
                    label: field.label.clone(),
                    required: field.required,
                    tooltip: field.tooltip.clone(),
                    unit: field.unit.clone(),
                    control: control(&field.kind, values.get(&field.id)),
                })
                .collect(),
        })
        .collect();

    let actions = schema
        .calculation
        .action_buttons
        .iter()
        .map(|button| RenderedAction {
            binding: action_binding(&button.action),
            label: button.label.clone(),
            icon: button.icon.clone(),
            style: button.style,
            action: button.action.clone(),
        })
        .collect();

    Ok(RenderedForm {
        calculator_id: schema.id.clone(),
        title: schema.title.clone(),
        description: schema.description.clone(),
        sections,
        actions,
        checklists: schema.checklists.clone(),
    })
}

/// Render and mount on `target`, detaching the previous bindings first.
pub fn render_into(
    target: &mut dyn RenderTarget,
    schema: &Schema,
    values: &FieldValues,
) -> Result<RenderedForm, SchemaError> {
    let form = render(schema, values)?;
    target.detach_all();
    target.mount(&form);
    let bindings = form.bindings();
    for binding in &bindings {
        target.attach(binding);
    }
    tracing::debug!(calculator = %schema.id, bindings = bindings.len(), "form rendered");
    Ok(form)
}

fn control(kind: &FieldKind, raw: &str) -> Control {
    match kind {
        FieldKind::Select { options, .. } => {
            let selected = options
                .iter()
                .map(|o| o.value.to_string())
                .find(|value| value == raw)
                .or_else(|| options.first().map(|o| o.value.to_string()))
                .unwrap_or_default();
            Control::Select {
                options: options.clone(),
                selected,
            }
        }
        FieldKind::Number {
            min,
            max,
            step,
            placeholder,
            ..
        } => Control::Number {
            value: raw.to_string(),
            min: *min,
            max: *max,
            step: *step,
            placeholder: placeholder.clone(),
            filter: InputFilter::Numeric,
        },
        FieldKind::Text { placeholder, .. } => Control::Text {
            value: raw.to_string(),
            placeholder: placeholder.clone(),
        },
        FieldKind::Date => Control::Date {
            value: raw.to_string(),
        },
        FieldKind::DateTime => Control::DateTime {
            value: raw.to_string(),
        },
    }
}
