use medcalc_core::report::ExportPayload;
use tera::{Context, Tera};

use crate::error::ReportError;

/// Built-in report layout.
pub const REPORT_TEMPLATE: &str = include_str!("../templates/report.md");

/// Render the built-in report for `payload`.
pub fn render_report(payload: &ExportPayload) -> Result<String, ReportError> {
    render_template("report.md", REPORT_TEMPLATE, payload)
}

/// Render `template_content` (Tera syntax) with the payload's fields as the
/// context. `inputs` and `audit_steps` iterate in payload order.
pub fn render_template(
    template_name: &str,
    template_content: &str,
    payload: &ExportPayload,
) -> Result<String, ReportError> {
    let mut tera = Tera::default();
    tera.add_raw_template(template_name, template_content)
        .map_err(|e| ReportError::TemplateParse(e.to_string()))?;

    let value = serde_json::to_value(payload)?;
    let context =
        Context::from_value(value).map_err(|e| ReportError::TemplateRender(e.to_string()))?;

    let rendered = tera.render(template_name, &context)?;
    Ok(rendered)
}
