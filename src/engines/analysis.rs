//! Analysis orchestrator.
//!
//! Runs all four engines for one combined report. Each engine is invoked
//! with no inline payload (file-resolved datasets only); simulation baseline
//! parameters are derived from the elasticity and marketing datasets.
//!
//! Sections are isolated: a failing engine contributes an error descriptor
//! to its own slot and never prevents the other three from populating. The
//! four invocations only read immutable per-request state and on-disk
//! datasets, so they run in parallel.

use crate::config::DataConfig;
use crate::data::{MARKETING_DATASET, PRICE_SALES_DATASET, resolve};
use crate::domain::{AnalysisResult, SimulationParams};
use crate::engines::{run_elasticity, run_forecast, run_roi, run_simulation};
use crate::math::mean;

/// Assumed cost margin: baseline cost is 60% of the mean price.
const MARGIN_RATIO: f64 = 0.6;
const DEFAULT_PRICE: f64 = 20.0;
const DEFAULT_MARKETING_SPEND: f64 = 100.0;

pub fn run_analysis(data: &DataConfig) -> AnalysisResult {
    let params = derive_baseline_params(data);

    let ((forecast, elasticity), (roi, simulation)) = rayon::join(
        || {
            rayon::join(
                || run_forecast(None, data),
                || run_elasticity(None, data),
            )
        },
        || {
            rayon::join(
                || run_roi(None, data),
                || run_simulation(&params, data),
            )
        },
    );

    AnalysisResult {
        forecast: forecast.into(),
        elasticity: elasticity.into(),
        roi: roi.into(),
        simulation: simulation.into(),
    }
}

/// Baseline simulation parameters from the datasets, with fixed defaults
/// when a dataset or column is unavailable.
fn derive_baseline_params(data: &DataConfig) -> SimulationParams {
    let price = resolve(&PRICE_SALES_DATASET, None, data)
        .ok()
        .and_then(|(frame, _)| frame.col_f64("price").ok())
        .and_then(|col| finite_mean(&col))
        .unwrap_or(DEFAULT_PRICE);

    let marketing_spend = resolve(&MARKETING_DATASET, None, data)
        .ok()
        .and_then(|(frame, _)| frame.col_f64("spend").ok())
        .and_then(|col| finite_mean(&col))
        .unwrap_or(DEFAULT_MARKETING_SPEND);

    SimulationParams {
        price,
        cost: price * MARGIN_RATIO,
        marketing_spend,
    }
}

fn finite_mean(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    mean(&finite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "insight-analysis-{label}-{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn baseline_params_use_dataset_means() {
        let dir = scratch("params");
        fs::write(dir.join("price_sales.csv"), "price,units\n10,100\n30,50\n").unwrap();
        fs::write(
            dir.join("marketing.csv"),
            "date,channel,spend,impressions,clicks,conversions\n2024-01-01,search,200,1000,50,5\n2024-01-02,social,400,2000,80,9\n",
        )
        .unwrap();
        let cfg = DataConfig {
            local_dir: dir,
            shared_dir: scratch("params-shared"),
        };

        let params = derive_baseline_params(&cfg);
        assert!((params.price - 20.0).abs() < 1e-12);
        assert!((params.cost - 12.0).abs() < 1e-12);
        assert!((params.marketing_spend - 300.0).abs() < 1e-12);
    }

    #[test]
    fn baseline_params_fall_back_to_defaults() {
        let cfg = DataConfig {
            local_dir: scratch("defaults-empty"),
            shared_dir: scratch("defaults-empty-shared"),
        };
        let params = derive_baseline_params(&cfg);
        assert_eq!(params.price, DEFAULT_PRICE);
        assert_eq!(params.marketing_spend, DEFAULT_MARKETING_SPEND);
        assert!((params.cost - DEFAULT_PRICE * MARGIN_RATIO).abs() < 1e-12);
    }
}
