//! Model capability seams.
//!
//! Library-style fitting routines are abstracted behind three small
//! interfaces so the engines stay generic over interchangeable strategies:
//!
//! - a time-series fitter ([`TrendModel`], strategy in [`trend`])
//! - a linear regression fitter (`crate::math::ols`)
//! - a binary classifier ([`SpendClassifier`], strategies in [`boosted`] and
//!   [`logistic`])

pub mod boosted;
pub mod logistic;
pub mod trend;

pub use boosted::BoostedTrees;
pub use logistic::LogisticModel;
pub use trend::{SeasonalTrend, TrendModel, fit_default_trend};

use crate::error::EngineError;

/// A fitted binary classifier over a single spend feature.
pub trait SpendClassifier: Send + Sync {
    /// Raw decision score (unbounded).
    fn score(&self, spend: f64) -> f64;

    /// Conversion probability in `[0, 1]`.
    ///
    /// Strategies without a native probability inherit the logistic transform
    /// of their decision score.
    fn probability(&self, spend: f64) -> f64 {
        sigmoid(self.score(spend))
    }
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Fit the preferred classifier strategy for the spend → label problem.
///
/// The bounded boosted-tree ensemble is tried first; if its fit is rejected
/// (degenerate input), logistic regression is the fallback. Both satisfy the
/// same downstream contract: a probability in `[0, 1]` for a given spend.
pub fn fit_conversion_classifier(
    spend: &[f64],
    labels: &[u8],
) -> Result<Box<dyn SpendClassifier>, EngineError> {
    match BoostedTrees::fit(spend, labels, &boosted::BoostedConfig::default()) {
        Ok(model) => Ok(Box::new(model)),
        Err(boost_err) => {
            tracing::warn!(error = %boost_err, "boosted classifier rejected fit; falling back to logistic regression");
            let model = LogisticModel::fit(spend, labels)
                .map_err(|e| EngineError::model(format!("Training ROI model failed: {e}")))?;
            Ok(Box::new(model))
        }
    }
}
