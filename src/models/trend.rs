//! Additive trend + seasonality time-series fitter.
//!
//! The forecast engine treats its fitter as an opaque capability: fit the
//! historical series, then produce a point estimate and a 0.90-interval upper
//! bound for any future date. The strategy implemented here is a least-squares
//! additive model:
//!
//! - linear trend in days since the first observation
//! - weekly Fourier harmonics when the history is long enough to identify them
//! - yearly Fourier harmonics when the history spans at least two years
//!
//! The design matrix is solved with the SVD least-squares core in
//! `crate::math::ols`, so the fit is deterministic.

use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};

use crate::domain::TimeSeriesPoint;
use crate::error::EngineError;
use crate::math::solve_least_squares;

/// Upper-tail z of a centered 0.90 interval (95th normal percentile).
const Z_UPPER_90: f64 = 1.6448536269514722;

const WEEKLY_HARMONICS: usize = 3;
const YEARLY_HARMONICS: usize = 5;
const DAYS_PER_YEAR: f64 = 365.25;

/// A fitted univariate time-series model.
pub trait TrendModel: Send + Sync {
    /// Point estimate for a date (p50).
    fn predict(&self, ds: NaiveDate) -> f64;

    /// Upper bound of the 0.90 uncertainty interval (p90).
    fn upper(&self, ds: NaiveDate) -> f64;
}

/// The default trend-fitting strategy.
#[derive(Debug, Clone)]
pub struct SeasonalTrend {
    origin: NaiveDate,
    beta: Vec<f64>,
    weekly: bool,
    yearly: bool,
    sigma: f64,
}

impl SeasonalTrend {
    /// Fit the model to a historical series.
    ///
    /// Requires at least two distinct dates; anything less cannot identify a
    /// trend and is a model error.
    pub fn fit(points: &[TimeSeriesPoint]) -> Result<SeasonalTrend, EngineError> {
        let mut series: Vec<TimeSeriesPoint> = points
            .iter()
            .copied()
            .filter(|p| p.y.is_finite())
            .collect();
        series.sort_by_key(|p| p.ds);
        series.dedup_by_key(|p| p.ds);

        let n = series.len();
        if n < 2 {
            return Err(EngineError::model(
                "Forecasting failed: need at least two distinct dated observations",
            ));
        }

        let origin = series[0].ds;
        let span_days = (series[n - 1].ds - origin).num_days() as f64;

        // Only include seasonal blocks the history can identify.
        let weekly = span_days >= 14.0 && n >= 4 * WEEKLY_HARMONICS;
        let yearly = span_days >= 2.0 * DAYS_PER_YEAR && n >= 4 * YEARLY_HARMONICS;

        let p = column_count(weekly, yearly);
        let mut design = DMatrix::<f64>::zeros(n, p);
        let mut obs = DVector::<f64>::zeros(n);
        let mut row = vec![0.0; p];
        for (i, p) in series.iter().enumerate() {
            let t = (p.ds - origin).num_days() as f64;
            fill_design_row(t, weekly, yearly, &mut row);
            for (j, v) in row.iter().enumerate() {
                design[(i, j)] = *v;
            }
            obs[i] = p.y;
        }

        let beta = solve_least_squares(&design, &obs).ok_or_else(|| {
            EngineError::model("Forecasting failed: trend fit did not converge")
        })?;

        let mut sse = 0.0;
        for p in &series {
            let t = (p.ds - origin).num_days() as f64;
            fill_design_row(t, weekly, yearly, &mut row);
            let fit: f64 = row.iter().zip(beta.iter()).map(|(x, b)| x * b).sum();
            let r = p.y - fit;
            sse += r * r;
        }
        let dof = (n.saturating_sub(p)).max(1) as f64;
        let sigma = (sse / dof).sqrt();
        if !sigma.is_finite() {
            return Err(EngineError::model(
                "Forecasting failed: non-finite residual variance",
            ));
        }

        Ok(SeasonalTrend {
            origin,
            beta: beta.iter().copied().collect(),
            weekly,
            yearly,
            sigma,
        })
    }

    fn eval(&self, ds: NaiveDate) -> f64 {
        let t = (ds - self.origin).num_days() as f64;
        let mut row = vec![0.0; self.beta.len()];
        fill_design_row(t, self.weekly, self.yearly, &mut row);
        row.iter().zip(self.beta.iter()).map(|(x, b)| x * b).sum()
    }
}

impl TrendModel for SeasonalTrend {
    fn predict(&self, ds: NaiveDate) -> f64 {
        self.eval(ds)
    }

    fn upper(&self, ds: NaiveDate) -> f64 {
        self.eval(ds) + Z_UPPER_90 * self.sigma
    }
}

/// Fit the default strategy behind the capability interface.
pub fn fit_default_trend(points: &[TimeSeriesPoint]) -> Result<Box<dyn TrendModel>, EngineError> {
    Ok(Box::new(SeasonalTrend::fit(points)?))
}

fn column_count(weekly: bool, yearly: bool) -> usize {
    let mut p = 2; // intercept + trend
    if weekly {
        p += 2 * WEEKLY_HARMONICS;
    }
    if yearly {
        p += 2 * YEARLY_HARMONICS;
    }
    p
}

fn fill_design_row(t: f64, weekly: bool, yearly: bool, out: &mut [f64]) {
    out[0] = 1.0;
    out[1] = t;
    let mut j = 2;
    if weekly {
        for k in 1..=WEEKLY_HARMONICS {
            let arg = 2.0 * std::f64::consts::PI * k as f64 * t / 7.0;
            out[j] = arg.sin();
            out[j + 1] = arg.cos();
            j += 2;
        }
    }
    if yearly {
        for k in 1..=YEARLY_HARMONICS {
            let arg = 2.0 * std::f64::consts::PI * k as f64 * t / DAYS_PER_YEAR;
            out[j] = arg.sin();
            out[j + 1] = arg.cos();
            j += 2;
        }
    }
}
