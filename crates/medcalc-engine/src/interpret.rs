use medcalc_core::schema::Band;
use medcalc_core::values::format_number;

use crate::error::EngineError;

/// Find the band a total falls in: the first, scanning in ascending order,
/// whose inclusive upper bound is at least `total`. A schema without bands
/// has no interpretation.
///
/// Load-time checks make every real total land in exactly one band, so a
/// miss (a NaN total, bands that bypassed validation) is a configuration
/// fault rather than something the user can correct.
pub fn interpret(total: f64, bands: &[Band]) -> Result<Option<&Band>, EngineError> {
    if bands.is_empty() {
        return Ok(None);
    }
    match bands.iter().find(|band| band.contains(total)) {
        Some(band) => Ok(Some(band)),
        None => {
            tracing::error!(total, bands = bands.len(), "no interpretation band matched");
            Err(EngineError::Configuration(format!(
                "no interpretation band covers {}",
                format_number(total)
            )))
        }
    }
}
