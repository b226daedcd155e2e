//! Forecast engine.
//!
//! Fits an additive trend+seasonality model to the historical series and
//! returns exactly [`HORIZON_DAYS`] future daily periods, each with a point
//! estimate (`p50`) and the upper bound of a 0.90 uncertainty interval
//! (`p90`). Dates continue immediately after the last historical date.

use chrono::NaiveDate;
use serde_json::Value;

use crate::config::DataConfig;
use crate::data::{FORECAST_DATASET, resolve};
use crate::domain::{ForecastPoint, ForecastResult, TimeSeriesPoint};
use crate::error::EngineError;
use crate::models::fit_default_trend;

/// Forecast horizon: 180 daily periods (~6 months).
pub const HORIZON_DAYS: usize = 180;

pub fn run_forecast(
    inline: Option<&serde_json::Map<String, Value>>,
    data: &DataConfig,
) -> Result<ForecastResult, EngineError> {
    let (frame, tag) = resolve(&FORECAST_DATASET, inline, data)?;
    frame.require_columns(FORECAST_DATASET.required_fields)?;

    let ds_raw = frame.col_str("ds")?;
    let y = frame.col_f64("y")?;

    // Row-level tolerance: rows with an unparseable date or a non-numeric
    // value are dropped; the trend fitter enforces the two-distinct-dates
    // minimum on what remains.
    let mut points: Vec<TimeSeriesPoint> = Vec::with_capacity(ds_raw.len());
    for (raw, value) in ds_raw.iter().zip(y.iter()) {
        if let Some(ds) = parse_date(raw) {
            if value.is_finite() {
                points.push(TimeSeriesPoint { ds, y: *value });
            }
        }
    }

    let model = fit_default_trend(&points)?;
    let last = points
        .iter()
        .map(|p| p.ds)
        .max()
        .ok_or_else(|| EngineError::model("Forecasting failed: empty series"))?;

    let forecast: Vec<ForecastPoint> = (1..=HORIZON_DAYS as i64)
        .map(|offset| {
            let ds = last + chrono::Duration::days(offset);
            ForecastPoint {
                ds,
                p50: model.predict(ds),
                p90: model.upper(ds),
            }
        })
        .collect();

    tracing::debug!(source = %tag.describe(), points = points.len(), "forecast fitted");
    Ok(ForecastResult {
        source: tag.describe(),
        forecast,
    })
}

/// Accept ISO dates plus the handful of formats spreadsheet exports use.
fn parse_date(s: &str) -> Option<NaiveDate> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    FMTS.iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s.trim(), fmt).ok())
}
