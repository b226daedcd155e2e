//! Elasticity engine.
//!
//! Price elasticity of demand as the slope of a log-log OLS fit:
//!
//! `ln(units) = intercept + coefficient · ln(price)`
//!
//! Only rows with strictly positive price *and* units participate; the fitted
//! coefficient's sign is returned as-is (deliberately unvalidated).

use serde_json::Value;

use crate::config::DataConfig;
use crate::data::{PRICE_SALES_DATASET, resolve};
use crate::domain::{ElasticityObservation, ElasticityResult};
use crate::error::EngineError;
use crate::math::fit_simple_line;

pub fn run_elasticity(
    inline: Option<&serde_json::Map<String, Value>>,
    data: &DataConfig,
) -> Result<ElasticityResult, EngineError> {
    let (frame, tag) = resolve(&PRICE_SALES_DATASET, inline, data)?;
    frame.require_columns(PRICE_SALES_DATASET.required_fields)?;

    let price = frame.col_f64("price")?;
    let units = frame.col_f64("units")?;
    let observations: Vec<ElasticityObservation> = price
        .iter()
        .zip(units.iter())
        .map(|(&price, &units)| ElasticityObservation { price, units })
        .collect();

    // Filter out non-positive rows to avoid log issues.
    let mut ln_price = Vec::with_capacity(observations.len());
    let mut ln_units = Vec::with_capacity(observations.len());
    for obs in &observations {
        if obs.price > 0.0 && obs.units > 0.0 && obs.price.is_finite() && obs.units.is_finite() {
            ln_price.push(obs.price.ln());
            ln_units.push(obs.units.ln());
        }
    }

    if ln_price.is_empty() {
        return Err(EngineError::empty(
            "No positive price/units rows to compute elasticity",
        ));
    }

    let (intercept, coefficient) = fit_simple_line(&ln_price, &ln_units)
        .ok_or_else(|| EngineError::model("Elasticity fit did not converge"))?;

    tracing::debug!(source = %tag.describe(), rows = ln_price.len(), coefficient, "elasticity fitted");
    Ok(ElasticityResult {
        source: tag.describe(),
        elasticity: coefficient,
        intercept,
    })
}
