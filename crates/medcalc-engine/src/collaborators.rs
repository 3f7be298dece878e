//! Narrow contracts to everything outside the engine: notifications,
//! report export, clipboard, the reference modal and optional audio
//! feedback. Injected at construction; the engine holds no globals.

use std::future::Future;
use std::pin::Pin;

use medcalc_core::Severity;
use medcalc_core::report::ExportPayload;

use crate::error::ExportError;
use crate::render::{FormSurface, RenderTarget};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Produces the printable report. The only collaborator the engine awaits.
pub trait ExportSink: Send + Sync {
    fn export_report(&self, payload: ExportPayload) -> BoxFuture<'_, Result<(), ExportError>>;
}

pub trait Clipboard: Send + Sync {
    fn copy_text(&self, text: &str) -> Result<(), ExportError>;
}

/// Fire-and-forget request to show reference material (e.g. NANDA
/// nursing diagnoses) for a topic.
pub trait ReferenceModal: Send + Sync {
    fn open(&self, topic: &str);
}

/// Audio cues and screen-reader announcements. Advisory only.
pub trait Feedback: Send + Sync {
    fn play_cue(&self, cue: Severity);
    fn announce(&self, text: &str);
}

/// Notifier that writes to the tracing subscriber.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => tracing::error!(%message, "notification"),
            Severity::Warning => tracing::warn!(%message, "notification"),
            Severity::Info | Severity::Success => {
                tracing::info!(%message, ?severity, "notification")
            }
        }
    }
}

/// Accepts every request and does nothing with it.
#[derive(Debug, Default)]
pub struct Discard;

impl ExportSink for Discard {
    fn export_report(&self, payload: ExportPayload) -> BoxFuture<'_, Result<(), ExportError>> {
        Box::pin(async move {
            tracing::debug!(
                report_id = %payload.report_id,
                "no export sink configured; report discarded"
            );
            Ok(())
        })
    }
}

impl Clipboard for Discard {
    fn copy_text(&self, _text: &str) -> Result<(), ExportError> {
        tracing::debug!("no clipboard configured; text discarded");
        Ok(())
    }
}

impl ReferenceModal for Discard {
    fn open(&self, topic: &str) {
        tracing::debug!(topic, "no reference modal configured");
    }
}

pub struct Collaborators {
    pub notifier: Box<dyn Notifier>,
    pub export: Box<dyn ExportSink>,
    pub clipboard: Box<dyn Clipboard>,
    pub reference: Box<dyn ReferenceModal>,
    pub feedback: Option<Box<dyn Feedback>>,
    pub target: Box<dyn RenderTarget>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            notifier: Box::new(TracingNotifier),
            export: Box::new(Discard),
            clipboard: Box::new(Discard),
            reference: Box::new(Discard),
            feedback: None,
            target: Box::new(FormSurface::new()),
        }
    }
}

impl Collaborators {
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_export(mut self, export: impl ExportSink + 'static) -> Self {
        self.export = Box::new(export);
        self
    }

    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    pub fn with_reference(mut self, reference: impl ReferenceModal + 'static) -> Self {
        self.reference = Box::new(reference);
        self
    }

    pub fn with_feedback(mut self, feedback: impl Feedback + 'static) -> Self {
        self.feedback = Some(Box::new(feedback));
        self
    }

    pub fn with_target(mut self, target: impl RenderTarget + 'static) -> Self {
        self.target = Box::new(target);
        self
    }

    pub(crate) fn notify(&self, message: &str, severity: Severity) {
        self.notifier.notify(message, severity);
    }

    pub(crate) fn cue(&self, cue: Severity) {
        if let Some(feedback) = &self.feedback {
            feedback.play_cue(cue);
        }
    }

    pub(crate) fn announce(&self, text: &str) {
        if let Some(feedback) = &self.feedback {
            feedback.announce(text);
        }
    }
}
