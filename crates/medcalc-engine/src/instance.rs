//! Lifecycle controller: one calculator page bound to a schema, a variant
//! and its collaborators.

use std::sync::Arc;

use jiff::civil::DateTime;
use medcalc_core::schema::{Action, Band};
use medcalc_core::values::{format_fixed, round_fixed};
use medcalc_core::{CalcResult, CalculationError, FieldValues, Inputs, Schema, Severity, Variant};
use tokio::sync::Mutex;

use crate::alerts::{AlertSet, TriggeredAlert};
use crate::audit::{AuditLine, build_audit};
use crate::collaborators::Collaborators;
use crate::error::{EngineError, ExportError};
use crate::interpret::interpret;
use crate::payload::build_payload;
use crate::render::{RenderedForm, render_into};
use crate::validate::{FieldIssue, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    Calculating,
    Displaying,
}

/// Everything shown once a calculation succeeds.
#[derive(Debug, Clone)]
pub struct ResultPanel {
    pub result: CalcResult,
    pub band: Option<Band>,
    pub audit: Vec<AuditLine>,
    pub alerts: Vec<TriggeredAlert>,
    /// The validated inputs the result was computed from.
    pub inputs: Inputs,
}

#[derive(Debug)]
pub enum CalculateOutcome {
    /// A result is displayed.
    Displayed,
    /// Validation blocked the calculation; nothing was computed.
    Invalid(Vec<FieldIssue>),
    /// The variant rejected its inputs or the schema could not be applied.
    Failed(EngineError),
}

pub struct CalculatorInstance {
    schema: Schema,
    variant: Box<dyn Variant>,
    collaborators: Collaborators,
    alerts: AlertSet,
    values: FieldValues,
    phase: Phase,
    panel: Option<ResultPanel>,
    clock: Option<DateTime>,
}

impl CalculatorInstance {
    /// Bind a schema to its variant. Fails if the schema is malformed, its
    /// alert rules fall outside the condition grammar or it does not declare
    /// the fields the variant reads.
    pub fn new(
        schema: Schema,
        variant: Box<dyn Variant>,
        collaborators: Collaborators,
    ) -> Result<Self, EngineError> {
        schema.validate()?;
        medcalc_core::bind(&schema, variant.as_ref())?;
        let alerts = AlertSet::compile(&schema.calculation.alerts)?;
        let values = FieldValues::defaults(&schema);

        tracing::debug!(
            calculator = %schema.id,
            variant = variant.id(),
            alerts = alerts.len(),
            "calculator created"
        );
        Ok(Self {
            schema,
            variant,
            collaborators,
            alerts,
            values,
            phase: Phase::Idle,
            panel: None,
            clock: None,
        })
    }

    /// Validate dates against a fixed instant instead of the wall clock.
    pub fn with_clock(mut self, now: DateTime) -> Self {
        self.clock = Some(now);
        self
    }

    pub fn set_clock(&mut self, now: DateTime) {
        self.clock = Some(now);
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn results_visible(&self) -> bool {
        self.phase == Phase::Displaying
    }

    pub fn last_result(&self) -> Option<&CalcResult> {
        self.panel.as_ref().map(|panel| &panel.result)
    }

    pub fn panel(&self) -> Option<&ResultPanel> {
        self.panel.as_ref()
    }

    /// Render the current values onto the injected target.
    pub fn render(&mut self) -> Result<RenderedForm, EngineError> {
        Ok(render_into(
            self.collaborators.target.as_mut(),
            &self.schema,
            &self.values,
        )?)
    }

    pub fn set_value(&mut self, id: &str, raw: impl Into<String>) -> Result<(), EngineError> {
        if self.schema.field(id).is_none() {
            return Err(EngineError::UnknownField(id.to_string()));
        }
        self.values.set(id, raw);
        Ok(())
    }

    pub fn validator(&self) -> Validator {
        self.clock.map_or_else(Validator::now, Validator::at)
    }

    /// Validate every field, run the variant and display the result.
    /// Failures are notified and leave the entered values in place.
    pub fn calculate(&mut self) -> CalculateOutcome {
        let span = tracing::info_span!("calculate", calculator = %self.schema.id);
        let _guard = span.enter();

        self.transition(Phase::Validating);
        let report = self.validator().validate_form(&self.schema, &self.values);
        for warning in &report.warnings {
            self.collaborators
                .notify(&warning.notification(), Severity::Warning);
        }

        let inputs = match report.into_inputs() {
            Ok(inputs) => inputs,
            Err(EngineError::Validation(errors)) => {
                for issue in &errors {
                    self.collaborators.notify(&issue.notification(), Severity::Error);
                }
                self.collaborators.cue(Severity::Error);
                self.panel = None;
                self.transition(Phase::Idle);
                return CalculateOutcome::Invalid(errors);
            }
            Err(other) => return self.fail(other),
        };

        self.transition(Phase::Calculating);
        match self.compute(inputs) {
            Ok(panel) => {
                self.announce(&panel);
                self.panel = Some(panel);
                self.transition(Phase::Displaying);
                CalculateOutcome::Displayed
            }
            Err(error) => self.fail(error),
        }
    }

    /// Restore schema defaults and discard any result.
    pub fn reset(&mut self) {
        self.values = FieldValues::defaults(&self.schema);
        self.panel = None;
        self.transition(Phase::Idle);
        self.collaborators.notify("Campos redefinidos", Severity::Info);
        self.collaborators.cue(Severity::Info);
    }

    /// Run an action button against the displayed result.
    pub async fn dispatch(&mut self, action: &Action) -> Result<(), EngineError> {
        let outcome = match action {
            Action::GenerateReport => self.export().await,
            Action::CopyResult => self.copy(),
            Action::OpenReference { topic } => {
                self.collaborators.reference.open(topic);
                Ok(())
            }
        };

        if let Err(error) = &outcome {
            tracing::warn!(
                calculator = %self.schema.id,
                action = action.key(),
                %error,
                "action failed"
            );
            self.collaborators.notify(&error.to_string(), Severity::Error);
            self.collaborators.cue(Severity::Error);
        }
        outcome.map_err(EngineError::from)
    }

    /// Payload for the displayed result, if any.
    pub fn export_payload(&self) -> Option<medcalc_core::report::ExportPayload> {
        self.panel
            .as_ref()
            .map(|panel| build_payload(&self.schema, panel))
    }

    async fn export(&self) -> Result<(), ExportError> {
        let payload = self.export_payload().ok_or(ExportError::NoResult)?;
        let report_id = payload.report_id;
        self.collaborators.export.export_report(payload).await?;
        tracing::info!(calculator = %self.schema.id, %report_id, "report exported");
        self.collaborators
            .notify("Relatório gerado com sucesso", Severity::Success);
        Ok(())
    }

    fn copy(&self) -> Result<(), ExportError> {
        let payload = self.export_payload().ok_or(ExportError::NoResult)?;
        self.collaborators.clipboard.copy_text(&payload.summary())?;
        self.collaborators
            .notify("Resultado copiado", Severity::Success);
        Ok(())
    }

    fn compute(&self, inputs: Inputs) -> Result<ResultPanel, EngineError> {
        let computation = self.variant.calculate(&inputs)?;
        if !computation.total.is_finite() {
            return Err(CalculationError::NonFinite.into());
        }
        let result = CalcResult::stamp(computation, jiff::Timestamp::now());

        let spec = &self.schema.calculation;
        // Bands and alerts see the displayed value, not the raw total.
        let shown = round_fixed(result.total, spec.result.decimals);
        let band = interpret(shown, &spec.interpretation)?.cloned();
        let audit = build_audit(&result, &spec.audit.steps, spec.result.decimals);
        let alerts = self.alerts.evaluate(shown);

        tracing::info!(
            total = result.total,
            band = band.as_ref().map(|b| b.label.as_str()),
            alerts = alerts.len(),
            "calculation complete"
        );
        Ok(ResultPanel {
            result,
            band,
            audit,
            alerts,
            inputs,
        })
    }

    fn announce(&self, panel: &ResultPanel) {
        let spec = &self.schema.calculation.result;
        let mut summary = format!(
            "{}: {} {}",
            spec.label,
            format_fixed(panel.result.total, spec.decimals),
            panel.result.unit
        );
        if let Some(band) = &panel.band {
            summary.push_str(&format!(" ({})", band.label));
        }

        self.collaborators.notify(&summary, Severity::Success);
        for alert in &panel.alerts {
            self.collaborators.notify(&alert.message, alert.severity);
        }
        for advisory in &panel.result.advisories {
            self.collaborators.notify(&advisory.message, advisory.severity);
        }
        self.collaborators.cue(Severity::Success);
        self.collaborators.announce(&summary);
    }

    fn fail(&mut self, error: EngineError) -> CalculateOutcome {
        match &error {
            EngineError::Configuration(_) => {
                tracing::error!(calculator = %self.schema.id, %error, "calculator misconfigured");
                self.collaborators.notify(
                    "Não foi possível interpretar o resultado; verifique a configuração da calculadora",
                    Severity::Error,
                );
            }
            _ => {
                tracing::warn!(calculator = %self.schema.id, %error, "calculation failed");
                let message = match &error {
                    EngineError::Calculation(inner) => inner.to_string(),
                    other => other.to_string(),
                };
                self.collaborators.notify(&message, Severity::Error);
            }
        }
        self.collaborators.cue(Severity::Error);
        self.panel = None;
        self.transition(Phase::Idle);
        CalculateOutcome::Failed(error)
    }

    fn transition(&mut self, to: Phase) {
        if self.phase != to {
            tracing::debug!(
                calculator = %self.schema.id,
                from = ?self.phase,
                to = ?to,
                "phase transition"
            );
            self.phase = to;
        }
    }
}

/// Result of a trigger on a [`SharedCalculator`].
#[derive(Debug)]
pub enum Trigger<T> {
    Completed(T),
    /// Another operation held the calculator; the trigger was dropped.
    Ignored,
}

impl<T> Trigger<T> {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}

/// A calculator shared between several event sources. Calculate, reset and
/// action triggers that arrive while another operation is in flight are
/// ignored, never queued.
#[derive(Clone)]
pub struct SharedCalculator(Arc<Mutex<CalculatorInstance>>);

impl SharedCalculator {
    pub fn new(instance: CalculatorInstance) -> Self {
        Self(Arc::new(Mutex::new(instance)))
    }

    pub fn calculate(&self) -> Trigger<CalculateOutcome> {
        match self.0.try_lock() {
            Ok(mut instance) => Trigger::Completed(instance.calculate()),
            Err(_) => ignored("calculate"),
        }
    }

    pub fn reset(&self) -> Trigger<()> {
        match self.0.try_lock() {
            Ok(mut instance) => {
                instance.reset();
                Trigger::Completed(())
            }
            Err(_) => ignored("reset"),
        }
    }

    pub async fn dispatch(&self, action: &Action) -> Trigger<Result<(), EngineError>> {
        let Ok(mut instance) = self.0.try_lock() else {
            return ignored(action.key());
        };
        Trigger::Completed(instance.dispatch(action).await)
    }

    /// Field edits wait for the in-flight operation instead of being
    /// dropped.
    pub async fn set_value(&self, id: &str, raw: impl Into<String>) -> Result<(), EngineError> {
        self.0.lock().await.set_value(id, raw)
    }

    pub async fn with<R>(&self, f: impl FnOnce(&mut CalculatorInstance) -> R) -> R {
        f(&mut *self.0.lock().await)
    }
}

fn ignored<T>(trigger: &str) -> Trigger<T> {
    tracing::debug!(trigger, "calculator busy; trigger ignored");
    Trigger::Ignored
}
