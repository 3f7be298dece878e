//! medcalc-engine
//!
//! The generic calculator engine: renders a schema into an input surface,
//! validates entered values, runs the bound variant, interprets and audits
//! the result, evaluates alert rules and drives the page lifecycle.
//! Everything outside the engine is reached through the traits in
//! [`collaborators`].

pub mod alerts;
pub mod audit;
pub mod collaborators;
pub mod error;
pub mod instance;
pub mod interpret;
pub mod payload;
pub mod render;
pub mod validate;

pub use collaborators::Collaborators;
pub use error::{EngineError, ExportError};
pub use instance::{CalculateOutcome, CalculatorInstance, Phase, SharedCalculator, Trigger};
pub use render::{FormSurface, RenderTarget, RenderedForm};
pub use validate::{FormReport, ValidationOutcome, Validator};
