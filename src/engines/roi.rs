//! ROI engine.
//!
//! Models conversion probability as a function of marketing spend:
//!
//! 1. binarize conversions at their median (`label = conversions >= median`)
//! 2. fit the preferred classifier strategy (boosted trees, logistic fallback)
//! 3. sample the fitted curve on an evenly spaced spend grid of
//!    `min(50, rows)` points spanning observed min to max inclusive
//! 4. `expected_conversions = probability · max(conversions)`,
//!    `roi = expected_conversions / spend` with an explicit zero-spend guard

use serde_json::Value;

use crate::config::DataConfig;
use crate::data::{MARKETING_DATASET, resolve};
use crate::domain::{RoiPoint, RoiResult};
use crate::error::EngineError;
use crate::math::median;
use crate::models::fit_conversion_classifier;

/// Upper bound on the spend-grid length.
pub const MAX_GRID_POINTS: usize = 50;

pub fn run_roi(
    inline: Option<&serde_json::Map<String, Value>>,
    data: &DataConfig,
) -> Result<RoiResult, EngineError> {
    let (frame, tag) = resolve(&MARKETING_DATASET, inline, data)?;
    // Either {spend, conversions} directly or the wide marketing schema
    // ({date, channel, spend, impressions, clicks, conversions}); both project
    // down to the same two columns.
    frame.require_columns(MARKETING_DATASET.required_fields)?;

    let spend_col = frame.col_f64("spend")?;
    let conv_col = frame.col_f64("conversions")?;
    // The grid cap counts input rows, before the finite filter below.
    let input_rows = spend_col.len();

    let mut spend = Vec::with_capacity(spend_col.len());
    let mut conversions = Vec::with_capacity(conv_col.len());
    for (&s, &c) in spend_col.iter().zip(conv_col.iter()) {
        if s.is_finite() && c.is_finite() {
            spend.push(s);
            conversions.push(c);
        }
    }

    let max_conv = conversions.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if conversions.is_empty() || max_conv <= 0.0 {
        return Err(EngineError::empty("No conversions to model"));
    }

    let threshold = median(&conversions)
        .ok_or_else(|| EngineError::empty("No conversions to model"))?;
    let labels: Vec<u8> = conversions
        .iter()
        .map(|&c| u8::from(c >= threshold))
        .collect();

    let model = fit_conversion_classifier(&spend, &labels)?;

    let grid = spend_grid(&spend, input_rows.min(MAX_GRID_POINTS));
    let probability_curve: Vec<RoiPoint> = grid
        .into_iter()
        .map(|s| {
            let p_conv = model.probability(s);
            let expected = p_conv * max_conv;
            // Division guard, not an error: zero spend yields zero ROI.
            let roi = if s == 0.0 { 0.0 } else { expected / s };
            RoiPoint { spend: s, p_conv, roi }
        })
        .collect();

    tracing::debug!(
        source = %tag.describe(),
        rows = spend.len(),
        grid = probability_curve.len(),
        threshold,
        "roi curve built"
    );
    Ok(RoiResult {
        probability_curve,
        threshold,
    })
}

/// Evenly spaced grid of `count` points from min to max observed spend,
/// endpoints exact.
fn spend_grid(spend: &[f64], count: usize) -> Vec<f64> {
    let lo = spend.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = spend.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if count <= 1 || lo == hi {
        return vec![lo; count.max(1)];
    }

    let step = (hi - lo) / (count as f64 - 1.0);
    (0..count)
        .map(|i| {
            if i == count - 1 {
                hi
            } else {
                lo + step * i as f64
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty_data() -> DataConfig {
        DataConfig {
            local_dir: std::env::temp_dir().join("insight-roi-none"),
            shared_dir: std::env::temp_dir().join("insight-roi-none-shared"),
        }
    }

    fn synthetic_body(n: usize) -> serde_json::Value {
        let spend: Vec<f64> = (0..n).map(|i| 10.0 + i as f64 * 5.0).collect();
        let conversions: Vec<f64> = (0..n).map(|i| (i as f64 / 2.0).floor()).collect();
        json!({"spend": spend, "conversions": conversions})
    }

    #[test]
    fn grid_length_is_min_of_fifty_and_rows() {
        let small = run_roi(synthetic_body(12).as_object(), &empty_data()).unwrap();
        assert_eq!(small.probability_curve.len(), 12);

        let large = run_roi(synthetic_body(90).as_object(), &empty_data()).unwrap();
        assert_eq!(large.probability_curve.len(), MAX_GRID_POINTS);
    }

    #[test]
    fn grid_endpoints_match_observed_spend_range() {
        let result = run_roi(synthetic_body(30).as_object(), &empty_data()).unwrap();
        let first = result.probability_curve.first().unwrap();
        let last = result.probability_curve.last().unwrap();
        assert_eq!(first.spend, 10.0);
        assert_eq!(last.spend, 10.0 + 29.0 * 5.0);
    }

    #[test]
    fn grid_cap_counts_input_rows_not_surviving_ones() {
        // One unparseable spend cell: 10 input rows, 9 usable pairs. The
        // curve length follows the input row count.
        let body = json!({
            "spend": [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, "oops"],
            "conversions": [0.0, 0.0, 1.0, 1.0, 2.0, 3.0, 5.0, 6.0, 8.0, 9.0]
        });
        let result = run_roi(body.as_object(), &empty_data()).unwrap();
        assert_eq!(result.probability_curve.len(), 10);
        assert_eq!(result.probability_curve.first().unwrap().spend, 10.0);
        assert_eq!(result.probability_curve.last().unwrap().spend, 90.0);
    }

    #[test]
    fn zero_spend_point_has_zero_roi() {
        let body = json!({
            "spend": [0.0, 50.0, 100.0, 150.0, 200.0],
            "conversions": [0.0, 2.0, 5.0, 9.0, 12.0]
        });
        let result = run_roi(body.as_object(), &empty_data()).unwrap();
        let first = &result.probability_curve[0];
        assert_eq!(first.spend, 0.0);
        assert_eq!(first.roi, 0.0);
        assert!(first.roi.is_finite());
    }

    #[test]
    fn probabilities_are_bounded() {
        let result = run_roi(synthetic_body(40).as_object(), &empty_data()).unwrap();
        for point in &result.probability_curve {
            assert!((0.0..=1.0).contains(&point.p_conv));
            assert!(point.roi.is_finite());
        }
    }

    #[test]
    fn threshold_is_the_median_of_conversions() {
        let body = json!({
            "spend": [10.0, 20.0, 30.0, 40.0, 50.0],
            "conversions": [1.0, 2.0, 3.0, 4.0, 100.0]
        });
        let result = run_roi(body.as_object(), &empty_data()).unwrap();
        assert_eq!(result.threshold, 3.0);
    }

    #[test]
    fn all_zero_conversions_is_an_empty_dataset_error() {
        let body = json!({"spend": [10.0, 20.0], "conversions": [0.0, 0.0]});
        let err = run_roi(body.as_object(), &empty_data()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyDataset(_)));
    }

    #[test]
    fn missing_both_schemas_is_a_validation_error() {
        let local = std::env::temp_dir().join(format!("insight-roi-schema-{}", std::process::id()));
        std::fs::create_dir_all(&local).unwrap();
        std::fs::write(local.join("marketing.csv"), "date,channel\n2024-01-01,search\n").unwrap();
        let cfg = DataConfig {
            local_dir: local,
            shared_dir: std::env::temp_dir().join("insight-roi-schema-shared"),
        };
        let err = run_roi(None, &cfg).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
