#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use jiff::civil::{DateTime, date};
use medcalc_core::Severity;
use medcalc_engine::collaborators::{Clipboard, Notifier, ReferenceModal};
use medcalc_engine::{CalculatorInstance, Collaborators, ExportError};
use medcalc_instruments::{Instrument, get_instrument, variant_for};

/// Fixed "now" for date validation: 2026-03-10 12:00.
pub fn clock() -> DateTime {
    date(2026, 3, 10).at(12, 0, 0, 0)
}

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<(String, Severity)>>>);

impl Recorder {
    pub fn all(&self) -> Vec<(String, Severity)> {
        self.0.lock().unwrap().clone()
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|(_, s)| *s == severity)
            .map(|(m, _)| m)
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

impl Notifier for Recorder {
    fn notify(&self, message: &str, severity: Severity) {
        self.0.lock().unwrap().push((message.to_string(), severity));
    }
}

#[derive(Clone, Default)]
pub struct TextSink(Arc<Mutex<Vec<String>>>);

impl TextSink {
    pub fn texts(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl Clipboard for TextSink {
    fn copy_text(&self, text: &str) -> Result<(), ExportError> {
        self.0.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

impl ReferenceModal for TextSink {
    fn open(&self, topic: &str) {
        self.0.lock().unwrap().push(topic.to_string());
    }
}

/// A bundled calculator wired to `collaborators`, validating against
/// [`clock`].
pub fn instance_with(id: &str, collaborators: Collaborators) -> CalculatorInstance {
    let schema = get_instrument(id).unwrap().schema().unwrap();
    let variant = variant_for(id).unwrap();
    CalculatorInstance::new(schema, variant, collaborators)
        .unwrap()
        .with_clock(clock())
}

pub fn instance(id: &str, recorder: &Recorder) -> CalculatorInstance {
    instance_with(id, Collaborators::default().with_notifier(recorder.clone()))
}
