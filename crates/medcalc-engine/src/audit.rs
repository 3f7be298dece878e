use medcalc_core::CalcResult;
use medcalc_core::schema::{AuditSource, AuditStepSpec};
use serde::Serialize;

/// Shown in place of a value the result does not carry.
pub const MISSING_VALUE: &str = "—";

/// One resolved line of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditLine {
    pub label: String,
    pub icon: String,
    pub value: String,
}

/// Resolve every audit step against `result`, in declaration order.
/// `decimals` governs how `total` is printed.
pub fn build_audit(result: &CalcResult, steps: &[AuditStepSpec], decimals: u8) -> Vec<AuditLine> {
    steps
        .iter()
        .map(|step| AuditLine {
            label: step.label.clone(),
            icon: step.icon.clone(),
            value: resolve(result, step, decimals),
        })
        .collect()
}

fn resolve(result: &CalcResult, step: &AuditStepSpec, decimals: u8) -> String {
    match step.source() {
        Some(AuditSource::Field { key, suffix }) => match result.display_value(key, decimals) {
            Some(value) => match suffix {
                Some(suffix) => format!("{value} {suffix}"),
                None => value,
            },
            None => MISSING_VALUE.to_string(),
        },
        Some(AuditSource::Fixed(value)) => value.to_string(),
        Some(AuditSource::Template(template)) => substitute(template, result, decimals),
        None => MISSING_VALUE.to_string(),
    }
}

/// Replace each `{{key}}` with the result's display value. Unknown keys
/// become the missing-value marker; an unterminated `{{` is kept verbatim.
pub fn substitute(template: &str, result: &CalcResult, decimals: u8) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        out.push_str(&rest[..start]);
        let key = rest[start + 2..start + 2 + len].trim();
        match result.display_value(key, decimals) {
            Some(value) => out.push_str(&value),
            None => out.push_str(MISSING_VALUE),
        }
        rest = &rest[start + 2 + len + 2..];
    }
    out.push_str(rest);
    out
}
