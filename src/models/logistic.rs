//! Logistic regression on a single feature, fitted by IRLS.
//!
//! This is the fallback classifier strategy: iteratively reweighted least
//! squares on the 2-parameter problem `P(label=1 | spend) = σ(b0 + b1·z)`,
//! where `z` is the standardized spend. Standardizing keeps the normal
//! equations well-conditioned for large spend magnitudes.

use crate::error::EngineError;
use crate::models::{SpendClassifier, sigmoid};

const MAX_ITERS: usize = 50;
const TOL: f64 = 1e-8;
/// Probability clamp keeping the working weights strictly positive.
const P_EPS: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct LogisticModel {
    b0: f64,
    b1: f64,
    x_mean: f64,
    x_scale: f64,
}

impl LogisticModel {
    pub fn fit(spend: &[f64], labels: &[u8]) -> Result<LogisticModel, EngineError> {
        debug_assert_eq!(spend.len(), labels.len());
        let n = spend.len();
        if n == 0 {
            return Err(EngineError::model("Logistic fit requires at least one row"));
        }

        let x_mean = spend.iter().sum::<f64>() / n as f64;
        let var = spend.iter().map(|x| (x - x_mean) * (x - x_mean)).sum::<f64>() / n as f64;
        let x_scale = if var.sqrt() > 0.0 { var.sqrt() } else { 1.0 };
        let z: Vec<f64> = spend.iter().map(|x| (x - x_mean) / x_scale).collect();
        let y: Vec<f64> = labels.iter().map(|&l| f64::from(l)).collect();

        let mut b0 = 0.0;
        let mut b1 = 0.0;

        for _ in 0..MAX_ITERS {
            // Weighted normal equations for the 2x2 IRLS step.
            let mut s_w = 0.0;
            let mut s_wz = 0.0;
            let mut s_wzz = 0.0;
            let mut s_r = 0.0;
            let mut s_rz = 0.0;
            for i in 0..n {
                let p = sigmoid(b0 + b1 * z[i]).clamp(P_EPS, 1.0 - P_EPS);
                let w = (p * (1.0 - p)).max(P_EPS);
                let r = y[i] - p;
                s_w += w;
                s_wz += w * z[i];
                s_wzz += w * z[i] * z[i];
                s_r += r;
                s_rz += r * z[i];
            }

            let det = s_w * s_wzz - s_wz * s_wz;
            if !det.is_finite() || det.abs() < 1e-12 {
                return Err(EngineError::model(
                    "Logistic fit failed: singular IRLS system (degenerate labels?)",
                ));
            }

            // Newton step: solve [s_w s_wz; s_wz s_wzz] Δ = [s_r; s_rz].
            let d0 = (s_wzz * s_r - s_wz * s_rz) / det;
            let d1 = (s_w * s_rz - s_wz * s_r) / det;
            b0 += d0;
            b1 += d1;

            if !(b0.is_finite() && b1.is_finite()) {
                return Err(EngineError::model("Logistic fit diverged"));
            }
            if d0.abs() < TOL && d1.abs() < TOL {
                break;
            }
        }

        Ok(LogisticModel {
            b0,
            b1,
            x_mean,
            x_scale,
        })
    }
}

impl SpendClassifier for LogisticModel {
    fn score(&self, spend: f64) -> f64 {
        self.b0 + self.b1 * (spend - self.x_mean) / self.x_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separable_data_yields_monotone_probabilities() {
        let spend = [10.0, 20.0, 30.0, 40.0, 500.0, 600.0, 700.0, 800.0];
        let labels = [0u8, 0, 0, 0, 1, 1, 1, 1];
        let model = LogisticModel::fit(&spend, &labels).unwrap();

        let p_low = model.probability(15.0);
        let p_high = model.probability(650.0);
        assert!(p_low < 0.5 && p_high > 0.5);
        for s in [0.0, 50.0, 300.0, 1000.0] {
            let p = model.probability(s);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn noisy_overlap_still_converges() {
        let spend = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let labels = [0u8, 1, 0, 0, 1, 0, 1, 1];
        let model = LogisticModel::fit(&spend, &labels).unwrap();
        let p = model.probability(4.5);
        assert!(p.is_finite() && (0.0..=1.0).contains(&p));
    }

    #[test]
    fn single_class_labels_are_rejected() {
        let spend = [1.0, 2.0, 3.0];
        let labels = [1u8, 1, 1];
        assert!(LogisticModel::fit(&spend, &labels).is_err());
    }
}
