//! Terminal collaborators and plain-text rendering of forms and results.

use std::fmt::Write as _;
use std::io::Write as _;

use medcalc_core::Severity;
use medcalc_core::schema::Schema;
use medcalc_core::values::format_fixed;
use medcalc_engine::ExportError;
use medcalc_engine::collaborators::{Clipboard, Feedback, Notifier, ReferenceModal};
use medcalc_engine::instance::ResultPanel;
use medcalc_engine::render::{Control, RenderedForm};

fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "i",
        Severity::Success => "✓",
        Severity::Warning => "!",
        Severity::Error => "✗",
    }
}

/// Prints notifications to stderr.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        tracing::debug!(%message, ?severity, "notification");
        eprintln!("[{}] {message}", marker(severity));
    }
}

/// The CLI has no system clipboard; copied text goes to stdout.
#[derive(Debug, Default)]
pub struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn copy_text(&self, text: &str) -> Result<(), ExportError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{text}").map_err(|e| ExportError::Clipboard(e.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct PrintReference;

impl ReferenceModal for PrintReference {
    fn open(&self, topic: &str) {
        println!("Referência: {topic}");
    }
}

/// Terminal bell for warnings and errors.
#[derive(Debug, Default)]
pub struct Bell {
    enabled: bool,
}

impl Bell {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Feedback for Bell {
    fn play_cue(&self, cue: Severity) {
        if self.enabled && matches!(cue, Severity::Warning | Severity::Error) {
            eprint!("\x07");
        }
    }

    fn announce(&self, text: &str) {
        tracing::debug!(%text, "announce");
    }
}

pub fn format_form(form: &RenderedForm) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", form.title, form.calculator_id);
    if let Some(description) = &form.description {
        let _ = writeln!(out, "{description}");
    }

    for section in &form.sections {
        let _ = writeln!(out, "\n## {}", section.title);
        for field in &section.fields {
            let required = if field.required { "*" } else { "" };
            let unit = field
                .unit
                .as_deref()
                .map(|u| format!(" [{u}]"))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  {}{required} {}{unit} = {}",
                field.id,
                field.label,
                control_summary(&field.control)
            );
            if let Control::Select { options, .. } = &field.control {
                for option in options {
                    let _ = writeln!(out, "      {} = {}", option.value, option.label);
                }
            }
        }
    }

    if let Some(checklists) = &form.checklists {
        let _ = writeln!(out, "\n## 9 Certos da Medicação");
        for item in &checklists.nine_rights {
            let _ = writeln!(out, "  [ ] {item}");
        }
        if !checklists.safety_goals.is_empty() {
            let _ = writeln!(out, "\n## Metas Internacionais de Segurança");
            for goal in &checklists.safety_goals {
                let _ = writeln!(out, "  [ ] Meta {}: {}", goal.id, goal.text);
            }
        }
    }

    if !form.actions.is_empty() {
        let labels: Vec<&str> = form.actions.iter().map(|a| a.label.as_str()).collect();
        let _ = writeln!(out, "\nAções: {}", labels.join(", "));
    }
    out
}

fn control_summary(control: &Control) -> String {
    match control {
        Control::Select { selected, .. } => format!("{selected} (seleção)"),
        Control::Number { value, min, max, .. } => {
            let range = match (min, max) {
                (Some(min), Some(max)) => format!(" ({min}..{max})"),
                (Some(min), None) => format!(" (≥ {min})"),
                (None, Some(max)) => format!(" (≤ {max})"),
                (None, None) => String::new(),
            };
            format!("{}{range}", display_raw(value))
        }
        Control::Text { value, .. } => display_raw(value),
        Control::Date { value } => format!("{} (dd/mm/aaaa)", display_raw(value)),
        Control::DateTime { value } => format!("{} (dd/mm/aaaa hh:mm)", display_raw(value)),
    }
}

fn display_raw(value: &str) -> String {
    if value.is_empty() {
        "—".to_string()
    } else {
        value.to_string()
    }
}

/// Result panel: headline, interpretation, audit trail and fired alerts.
pub fn format_panel(schema: &Schema, panel: &ResultPanel) -> String {
    let spec = &schema.calculation.result;
    let mut out = String::new();

    let _ = write!(
        out,
        "{}: {}",
        spec.label,
        format_fixed(panel.result.total, spec.decimals)
    );
    if !panel.result.unit.is_empty() {
        let _ = write!(out, " {}", panel.result.unit);
    }
    out.push('\n');

    if let Some(band) = &panel.band {
        let _ = writeln!(out, "Interpretação: {}", band.label);
        if !band.recommendation.is_empty() {
            let _ = writeln!(out, "Conduta: {}", band.recommendation);
        }
    }

    if !panel.audit.is_empty() {
        let _ = writeln!(out, "\nMemória de cálculo:");
        for (index, line) in panel.audit.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}: {}", index + 1, line.label, line.value);
        }
    }

    if !panel.alerts.is_empty() {
        let _ = writeln!(out, "\nAlertas:");
        for alert in &panel.alerts {
            let _ = writeln!(out, "  [{}] {}", marker(alert.severity), alert.message);
        }
    }
    out
}
