//! Monte-Carlo profit simulation.
//!
//! Draws exactly [`DRAW_COUNT`] unit-demand samples from a normal baseline
//! distribution, clips them at zero, and derives revenue / expenses / profit
//! percentiles. The generator is request-scoped and seeded with a fixed
//! value, so identical inputs reproduce identical output bit-for-bit.
//!
//! Baseline: mean and sample standard deviation of the elasticity dataset's
//! `units` column; deviation defaults to 1.0 when undefined (fewer than two
//! usable rows or zero variance), and the whole baseline falls back to
//! mean=100 / deviation=20 when the dataset is unavailable.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::config::DataConfig;
use crate::data::{PRICE_SALES_DATASET, resolve};
use crate::domain::{PercentileTriplet, SimulationParams, SimulationResult};
use crate::error::EngineError;
use crate::math::{mean, percentile, sample_std};

pub const DRAW_COUNT: usize = 1000;
pub const SIMULATION_SEED: u64 = 42;

const FALLBACK_MEAN: f64 = 100.0;
const FALLBACK_STD: f64 = 20.0;

pub fn run_simulation(
    params: &SimulationParams,
    data: &DataConfig,
) -> Result<SimulationResult, EngineError> {
    let (units_mu, units_sigma) = baseline_units(data);

    let normal = Normal::new(units_mu, units_sigma)
        .map_err(|e| EngineError::model(format!("Simulation baseline error: {e}")))?;
    let mut rng = StdRng::seed_from_u64(SIMULATION_SEED);

    // Sequential draws keep the sampling order deterministic.
    let units: Vec<f64> = (0..DRAW_COUNT)
        .map(|_| normal.sample(&mut rng).max(0.0))
        .collect();

    let revenue: Vec<f64> = units.iter().map(|u| params.price * u).collect();
    let expenses_value = params.cost + params.marketing_spend;
    let profit: Vec<f64> = revenue.iter().map(|r| r - expenses_value).collect();

    tracing::debug!(units_mu, units_sigma, "simulation drawn");
    Ok(SimulationResult {
        revenue: triplet(&revenue)?,
        // Expenses are constant across draws; the triplet degenerates to it.
        expenses: triplet(&vec![expenses_value; DRAW_COUNT])?,
        profit: triplet(&profit)?,
    })
}

fn triplet(values: &[f64]) -> Result<PercentileTriplet, EngineError> {
    let pct = |p: f64| {
        percentile(values, p)
            .ok_or_else(|| EngineError::model("Simulation produced no samples"))
    };
    Ok(PercentileTriplet {
        p10: pct(10.0)?,
        p50: pct(50.0)?,
        p90: pct(90.0)?,
    })
}

/// Baseline (mean, deviation) of the units distribution.
fn baseline_units(data: &DataConfig) -> (f64, f64) {
    let frame = match resolve(&PRICE_SALES_DATASET, None, data) {
        Ok((frame, _)) => frame,
        Err(_) => return (FALLBACK_MEAN, FALLBACK_STD),
    };
    let units: Vec<f64> = match frame.col_f64("units") {
        Ok(col) => col.into_iter().filter(|v| v.is_finite()).collect(),
        Err(_) => return (FALLBACK_MEAN, FALLBACK_STD),
    };
    let Some(mu) = mean(&units) else {
        return (FALLBACK_MEAN, FALLBACK_STD);
    };
    let sigma = match sample_std(&units) {
        Some(s) if s.is_finite() && s > 0.0 => s,
        _ => 1.0,
    };
    (mu, sigma)
}
