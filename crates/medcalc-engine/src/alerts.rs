use medcalc_core::schema::AlertRule;
use medcalc_core::{Condition, SchemaError, Severity};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggeredAlert {
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    condition: Condition,
    message: String,
    severity: Severity,
}

/// Alert rules of one schema, parsed once when the calculator is created.
#[derive(Debug, Clone, Default)]
pub struct AlertSet {
    rules: Vec<CompiledRule>,
}

impl AlertSet {
    pub fn compile(rules: &[AlertRule]) -> Result<Self, SchemaError> {
        let rules = rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                let condition = rule
                    .compile()
                    .map_err(|source| SchemaError::InvalidCondition { index, source })?;
                Ok(CompiledRule {
                    condition,
                    message: rule.message.clone(),
                    severity: rule.severity.into(),
                })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules whose condition holds for `total`, in declaration order. Each
    /// rule is evaluated once; equal messages are not merged.
    pub fn evaluate(&self, total: f64) -> Vec<TriggeredAlert> {
        self.rules
            .iter()
            .filter(|rule| rule.condition.evaluate(total))
            .map(|rule| {
                tracing::info!(
                    condition = %rule.condition,
                    severity = ?rule.severity,
                    "alert fired"
                );
                TriggeredAlert {
                    message: rule.message.clone(),
                    severity: rule.severity,
                }
            })
            .collect()
    }
}

/// Compile and evaluate in one step.
pub fn evaluate_alerts(
    total: f64,
    rules: &[AlertRule],
) -> Result<Vec<TriggeredAlert>, SchemaError> {
    Ok(AlertSet::compile(rules)?.evaluate(total))
}
