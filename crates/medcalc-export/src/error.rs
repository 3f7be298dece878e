use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report template is invalid: {0}")]
    TemplateParse(String),

    #[error("report template failed to render: {0}")]
    TemplateRender(String),

    #[error("DOCX report generation failed: {0}")]
    Docx(String),

    #[error("export payload could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tera::Error> for ReportError {
    fn from(e: tera::Error) -> Self {
        ReportError::TemplateRender(e.to_string())
    }
}
