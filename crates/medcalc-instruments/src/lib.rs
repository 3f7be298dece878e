//! medcalc-instruments
//!
//! Bundled calculators. Each pairs a formula ([`Variant`]) with the
//! declarative schema its page is built from. Pure data and arithmetic; no
//! rendering, no I/O.

pub mod error;
pub mod instruments;
pub mod scoring;

use medcalc_core::{Schema, Variant};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use error::InstrumentError;

/// A calculator shipped with the engine.
pub trait Instrument: Variant {
    /// Human-readable name (e.g., "Escala de Aldrete e Kroulik").
    fn name(&self) -> &str;

    /// The bundled page schema, as JSON.
    fn schema_json(&self) -> &'static str;

    /// Parse and validate the bundled schema, then check it is bound to
    /// this instrument's formula.
    fn schema(&self) -> Result<Schema, InstrumentError> {
        let schema = Schema::from_json(self.schema_json())?;
        medcalc_core::bind(&schema, self)?;
        Ok(schema)
    }
}

/// Catalog entry for listing calculators.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InstrumentSummary {
    pub id: String,
    pub name: String,
}

/// Return all registered instruments.
pub fn all_instruments() -> Vec<Box<dyn Instrument>> {
    vec![
        Box::new(instruments::insulin::Insulin),
        Box::new(instruments::aldrete::Aldrete),
        Box::new(instruments::apgar::Apgar),
        Box::new(instruments::barthel::Barthel),
        Box::new(instruments::glasgow::Glasgow),
        Box::new(instruments::braden::Braden),
        Box::new(instruments::bmi::Bmi),
        Box::new(instruments::drip_rate::DripRate),
    ]
}

/// Look up an instrument by ID.
pub fn get_instrument(id: &str) -> Option<Box<dyn Instrument>> {
    all_instruments().into_iter().find(|i| i.id() == id)
}

pub fn catalog() -> Vec<InstrumentSummary> {
    all_instruments()
        .iter()
        .map(|i| InstrumentSummary {
            id: i.id().to_string(),
            name: i.name().to_string(),
        })
        .collect()
}

/// Resolve the formula a schema selects. Covers every bundled instrument
/// plus the generic variants external schemas can use: `ratio`
/// (`prescribedAmount / concentration`) and `sum` (sum of all scored
/// selects).
pub fn variant_for(id: &str) -> Result<Box<dyn Variant>, InstrumentError> {
    match id {
        "ratio" => Ok(Box::new(scoring::Ratio::reference())),
        "sum" => Ok(Box::new(scoring::ItemSum::all_selects("sum", "pontos"))),
        _ => {
            let instrument =
                get_instrument(id).ok_or_else(|| InstrumentError::UnknownVariant(id.to_string()))?;
            Ok(instrument)
        }
    }
}

/// Load an external schema and bind it to its variant.
pub fn load_schema(json: &str) -> Result<(Schema, Box<dyn Variant>), InstrumentError> {
    let schema = Schema::from_json(json)?;
    let variant = variant_for(&schema.variant)?;
    medcalc_core::bind(&schema, variant.as_ref())?;
    Ok((schema, variant))
}
