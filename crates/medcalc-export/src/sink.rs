use std::path::{Path, PathBuf};

use medcalc_core::report::ExportPayload;
use medcalc_engine::ExportError;
use medcalc_engine::collaborators::{BoxFuture, ExportSink};
use serde::{Deserialize, Serialize};

use crate::docx::generate_docx;
use crate::error::ReportError;
use crate::render::{REPORT_TEMPLATE, render_template};
use crate::styles::DocumentStyles;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Markdown,
    #[default]
    Docx,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Docx => "docx",
        }
    }
}

/// Export sink that writes one report file per calculation into a
/// directory.
#[derive(Debug, Clone)]
pub struct FileExporter {
    dir: PathBuf,
    format: ReportFormat,
    styles: DocumentStyles,
    template: Option<String>,
}

impl FileExporter {
    pub fn new(dir: impl Into<PathBuf>, format: ReportFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
            styles: DocumentStyles::default(),
            template: None,
        }
    }

    pub fn with_styles(mut self, styles: DocumentStyles) -> Self {
        self.styles = styles;
        self
    }

    /// Replace the built-in report layout with a custom Tera template.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<calculator>-<YYYYmmdd-HHMMSS>.<ext>`, stamped with the result time
    /// in UTC.
    pub fn file_name(&self, payload: &ExportPayload) -> String {
        format!(
            "{}-{}.{}",
            payload.calculator_id,
            payload.generated_at.strftime("%Y%m%d-%H%M%S"),
            self.format.extension()
        )
    }

    /// Render the report and write it, returning the written path.
    pub async fn export(&self, payload: &ExportPayload) -> Result<PathBuf, ReportError> {
        let template = self.template.as_deref().unwrap_or(REPORT_TEMPLATE);
        let markdown = render_template("report.md", template, payload)?;

        let bytes = match self.format {
            ReportFormat::Markdown => markdown.into_bytes(),
            ReportFormat::Docx => generate_docx(&markdown, &self.styles)?,
        };

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(self.file_name(payload));
        tokio::fs::write(&path, bytes).await?;

        tracing::info!(
            path = %path.display(),
            calculator = %payload.calculator_id,
            report_id = %payload.report_id,
            "report written"
        );
        Ok(path)
    }
}

impl ExportSink for FileExporter {
    fn export_report(&self, payload: ExportPayload) -> BoxFuture<'_, Result<(), ExportError>> {
        Box::pin(async move {
            self.export(&payload)
                .await
                .map(|_| ())
                .map_err(|e| ExportError::Sink(e.to_string()))
        })
    }
}
