use medcalc_core::report::{AuditEntry, ExportPayload, InputLine, PatientContext, ResultSummary};
use medcalc_core::values::format_fixed;
use medcalc_core::{Schema, Value};
use uuid::Uuid;

use crate::instance::ResultPanel;

/// Assemble the export payload for a displayed result. Inputs follow
/// render order; audit lines keep their computed order.
pub fn build_payload(schema: &Schema, panel: &ResultPanel) -> ExportPayload {
    let patient_ids: Vec<&str> = schema
        .patient
        .iter()
        .flat_map(|p| [p.name.as_deref(), p.birthdate.as_deref()])
        .flatten()
        .collect();

    let display = |id: &str| {
        panel
            .inputs
            .get(id)
            .filter(|value| **value != Value::Empty)
            .map(Value::display)
    };

    let patient = schema.patient.as_ref().and_then(|fields| {
        let context = PatientContext {
            name: fields.name.as_deref().and_then(display),
            birthdate: fields.birthdate.as_deref().and_then(display),
        };
        (context.name.is_some() || context.birthdate.is_some()).then_some(context)
    });

    let inputs = schema
        .fields()
        .filter(|field| !patient_ids.contains(&field.id.as_str()))
        .filter_map(|field| {
            display(&field.id).map(|value| InputLine {
                label: field.label.clone(),
                value,
                unit: field.unit.clone().unwrap_or_default(),
            })
        })
        .collect();

    let result = ResultSummary {
        label: schema.calculation.result.label.clone(),
        value: format_fixed(panel.result.total, schema.calculation.result.decimals),
        unit: panel.result.unit.clone(),
        interpretation: panel.band.as_ref().map(|b| b.label.clone()),
        recommendation: panel
            .band
            .as_ref()
            .map(|b| b.recommendation.clone())
            .filter(|r| !r.is_empty()),
    };

    ExportPayload {
        report_id: Uuid::new_v4(),
        calculator_id: schema.id.clone(),
        calculator_title: schema.title.clone(),
        patient,
        inputs,
        result,
        audit_steps: panel
            .audit
            .iter()
            .map(|line| AuditEntry {
                label: line.label.clone(),
                value: line.value.clone(),
            })
            .collect(),
        checklists: schema.checklists.clone(),
        generated_at: panel.result.timestamp,
    }
}
