//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the engines
//! - rendered directly as JSON response bodies
//! - asserted against in tests without extra conversion layers

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One historical observation of the forecast metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub ds: NaiveDate,
    pub y: f64,
}

/// One (price, units) observation for elasticity fitting.
///
/// Collected unordered; only rows with strictly positive price *and* units
/// ever reach the regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticityObservation {
    pub price: f64,
    pub units: f64,
}

/// Scalar inputs to the Monte-Carlo profit simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub price: f64,
    pub cost: f64,
    pub marketing_spend: f64,
}

/// One forecast period: point estimate (`p50`) and 0.90-interval upper bound (`p90`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub ds: NaiveDate,
    pub p50: f64,
    pub p90: f64,
}

/// Forecast output: exactly 180 future daily periods, dates strictly
/// increasing, continuing immediately after the last historical date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub source: String,
    pub forecast: Vec<ForecastPoint>,
}

/// Elasticity output: fitted log-log slope and intercept.
///
/// The sign of `elasticity` is not constrained or validated; a positive value,
/// though economically atypical, is returned as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticityResult {
    pub source: String,
    pub elasticity: f64,
    pub intercept: f64,
}

/// One point on the spend grid: predicted conversion probability and ROI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiPoint {
    pub spend: f64,
    pub p_conv: f64,
    pub roi: f64,
}

/// ROI output: ordered spend grid (length `min(50, rows)`) plus the
/// binarization threshold that was used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiResult {
    pub probability_curve: Vec<RoiPoint>,
    pub threshold: f64,
}

/// p10/p50/p90 of one simulated distribution (linear-interpolation method).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileTriplet {
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

/// Simulation output: percentile triplets for the three derived distributions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub revenue: PercentileTriplet,
    pub expenses: PercentileTriplet,
    pub profit: PercentileTriplet,
}

/// One section of the combined report: either the engine's value or an error
/// descriptor. Never both, never omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section<T> {
    Value(T),
    Failed { error: String },
}

impl<T> Section<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, Section::Failed { .. })
    }
}

impl<T> From<Result<T, EngineError>> for Section<T> {
    fn from(result: Result<T, EngineError>) -> Self {
        match result {
            Ok(value) => Section::Value(value),
            Err(err) => Section::Failed {
                error: err.to_string(),
            },
        }
    }
}

/// The combined report: one slot per engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub forecast: Section<ForecastResult>,
    pub elasticity: Section<ElasticityResult>,
    pub roi: Section<RoiResult>,
    pub simulation: Section<SimulationResult>,
}
