use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::AlertSeverity;
use crate::values::{format_fixed, format_number};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl From<AlertSeverity> for Severity {
    fn from(severity: AlertSeverity) -> Self {
        match severity {
            AlertSeverity::Info => Self::Info,
            AlertSeverity::Warning => Self::Warning,
            AlertSeverity::Error => Self::Error,
        }
    }
}

/// A note a variant attaches to its computation (e.g. a high-alert
/// medication warning).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Advisory {
    pub severity: Severity,
    pub message: String,
}

/// The pure output of a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Computation {
    pub total: f64,
    pub unit: String,
    /// Numeric breakdown, keyed by item id.
    #[serde(default)]
    pub per_item: BTreeMap<String, f64>,
    /// Derived textual facts, keyed by name (e.g. `concentrationType`).
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub advisories: Vec<Advisory>,
}

impl Computation {
    pub fn new(total: f64, unit: impl Into<String>) -> Self {
        Self {
            total,
            unit: unit.into(),
            per_item: BTreeMap::new(),
            labels: BTreeMap::new(),
            advisories: Vec::new(),
        }
    }

    pub fn with_item(mut self, id: impl Into<String>, value: f64) -> Self {
        self.per_item.insert(id.into(), value);
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_advisory(mut self, severity: Severity, message: impl Into<String>) -> Self {
        self.advisories.push(Advisory {
            severity,
            message: message.into(),
        });
        self
    }
}

/// The result of one successful calculation. Immutable; replaced wholesale
/// by the next calculation and cleared on reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalcResult {
    pub total: f64,
    pub unit: String,
    pub per_item: BTreeMap<String, f64>,
    pub labels: BTreeMap<String, String>,
    pub advisories: Vec<Advisory>,
    pub timestamp: jiff::Timestamp,
}

impl CalcResult {
    pub fn stamp(computation: Computation, timestamp: jiff::Timestamp) -> Self {
        Self {
            total: computation.total,
            unit: computation.unit,
            per_item: computation.per_item,
            labels: computation.labels,
            advisories: computation.advisories,
            timestamp,
        }
    }

    /// Resolve a result key for display. `total` uses the schema's decimal
    /// places; item values print without trailing zeros.
    pub fn display_value(&self, key: &str, decimals: u8) -> Option<String> {
        match key {
            "total" => Some(format_fixed(self.total, decimals)),
            "unit" => Some(self.unit.clone()),
            _ => self
                .per_item
                .get(key)
                .map(|v| format_number(*v))
                .or_else(|| self.labels.get(key).cloned()),
        }
    }
}
