use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::schema::Checklists;

/// Everything the export sink needs to document one calculation. Inputs
/// follow the schema's render order and audit steps follow their declared
/// order; both are carried verbatim into printed reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExportPayload {
    pub report_id: Uuid,
    pub calculator_id: String,
    pub calculator_title: String,
    pub patient: Option<PatientContext>,
    pub inputs: Vec<InputLine>,
    pub result: ResultSummary,
    pub audit_steps: Vec<AuditEntry>,
    /// Safety checklists declared by the schema, in declared order.
    #[serde(default)]
    pub checklists: Option<Checklists>,
    pub generated_at: jiff::Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PatientContext {
    pub name: Option<String>,
    pub birthdate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InputLine {
    pub label: String,
    pub value: String,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResultSummary {
    pub label: String,
    pub value: String,
    pub unit: String,
    pub interpretation: Option<String>,
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuditEntry {
    pub label: String,
    pub value: String,
}

impl ExportPayload {
    /// One-line plain-text summary for the clipboard:
    /// `<label>: <value> <unit> — <interpretation>`.
    pub fn summary(&self) -> String {
        let result = &self.result;
        let mut line = format!("{}: {}", result.label, result.value);
        if !result.unit.is_empty() {
            line.push(' ');
            line.push_str(&result.unit);
        }
        if let Some(interpretation) = &result.interpretation {
            line.push_str(" — ");
            line.push_str(interpretation);
        }
        line
    }
}
