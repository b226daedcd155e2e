//! Bounded gradient-boosted tree classifier.
//!
//! Preferred classifier strategy: a small gradient-boosted ensemble of
//! depth-3 regression trees over the single spend feature, trained on the
//! logistic loss with Newton leaf values.
//!
//! The configuration is deliberately bounded (50 rounds, depth 3, learning
//! rate 0.1, row subsample 0.9, feature subsample 0.9, L2 regularization 1.0)
//! so training cost stays flat regardless of dataset size. Row subsampling
//! uses a fixed internal seed, so repeated fits of the same data are
//! identical.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;

use crate::error::EngineError;
use crate::models::{SpendClassifier, sigmoid};

/// Fixed seed for the row-subsampling RNG (fit-scoped, deterministic).
const SUBSAMPLE_SEED: u64 = 17;

/// Clamp for the base-rate log-odds so single-class labels stay finite.
const RATE_EPS: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct BoostedConfig {
    pub rounds: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub subsample: f64,
    /// Feature subsample ratio. With a single feature it has no effect.
    pub colsample: f64,
    /// L2 regularization on leaf values.
    pub lambda: f64,
}

impl Default for BoostedConfig {
    fn default() -> Self {
        Self {
            rounds: 50,
            learning_rate: 0.1,
            max_depth: 3,
            subsample: 0.9,
            colsample: 0.9,
            lambda: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn eval(&self, x: f64) -> f64 {
        match self {
            Node::Leaf { value } => *value,
            Node::Split {
                threshold,
                left,
                right,
            } => {
                if x <= *threshold {
                    left.eval(x)
                } else {
                    right.eval(x)
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoostedTrees {
    base_score: f64,
    learning_rate: f64,
    trees: Vec<Node>,
}

impl BoostedTrees {
    pub fn fit(
        spend: &[f64],
        labels: &[u8],
        cfg: &BoostedConfig,
    ) -> Result<BoostedTrees, EngineError> {
        debug_assert_eq!(spend.len(), labels.len());
        let n = spend.len();
        if n == 0 {
            return Err(EngineError::model("Boosted fit requires at least one row"));
        }
        if spend.iter().any(|x| !x.is_finite()) {
            return Err(EngineError::model("Boosted fit requires finite spend values"));
        }

        let y: Vec<f64> = labels.iter().map(|&l| f64::from(l)).collect();
        let rate = (y.iter().sum::<f64>() / n as f64).clamp(RATE_EPS, 1.0 - RATE_EPS);
        let base_score = (rate / (1.0 - rate)).ln();

        let mut rng = StdRng::seed_from_u64(SUBSAMPLE_SEED);
        let mut scores = vec![base_score; n];
        let mut trees = Vec::with_capacity(cfg.rounds);

        let sample_size = ((cfg.subsample * n as f64).floor() as usize).clamp(1, n);

        for _ in 0..cfg.rounds {
            // First/second-order gradients of the logistic loss.
            let grad: Vec<f64> = (0..n).map(|i| y[i] - sigmoid(scores[i])).collect();
            let hess: Vec<f64> = (0..n)
                .map(|i| {
                    let p = sigmoid(scores[i]);
                    (p * (1.0 - p)).max(1e-12)
                })
                .collect();

            let mut rows: Vec<usize> = if sample_size < n {
                sample(&mut rng, n, sample_size).into_vec()
            } else {
                (0..n).collect()
            };
            rows.sort_by(|&a, &b| {
                spend[a]
                    .partial_cmp(&spend[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let tree = build_node(spend, &grad, &hess, &rows, cfg.max_depth, cfg.lambda);
            for i in 0..n {
                scores[i] += cfg.learning_rate * tree.eval(spend[i]);
            }
            trees.push(tree);
        }

        Ok(BoostedTrees {
            base_score,
            learning_rate: cfg.learning_rate,
            trees,
        })
    }
}

impl SpendClassifier for BoostedTrees {
    fn score(&self, spend: f64) -> f64 {
        let boost: f64 = self.trees.iter().map(|t| t.eval(spend)).sum();
        self.base_score + self.learning_rate * boost
    }
}

/// Newton leaf value with L2 regularization: Σg / (Σh + λ).
fn leaf_value(grad: &[f64], hess: &[f64], rows: &[usize], lambda: f64) -> f64 {
    let g: f64 = rows.iter().map(|&i| grad[i]).sum();
    let h: f64 = rows.iter().map(|&i| hess[i]).sum();
    g / (h + lambda)
}

/// Split gain in the regularized Newton objective.
fn gain(g: f64, h: f64, lambda: f64) -> f64 {
    g * g / (h + lambda)
}

/// Recursively grow a tree over `rows` (pre-sorted by spend).
fn build_node(
    x: &[f64],
    grad: &[f64],
    hess: &[f64],
    rows: &[usize],
    depth: usize,
    lambda: f64,
) -> Node {
    if depth == 0 || rows.len() < 2 {
        return Node::Leaf {
            value: leaf_value(grad, hess, rows, lambda),
        };
    }

    let g_total: f64 = rows.iter().map(|&i| grad[i]).sum();
    let h_total: f64 = rows.iter().map(|&i| hess[i]).sum();
    let base_gain = gain(g_total, h_total, lambda);

    let mut best: Option<(f64, usize)> = None; // (gain, split index into rows)
    let mut g_left = 0.0;
    let mut h_left = 0.0;
    for k in 0..rows.len() - 1 {
        g_left += grad[rows[k]];
        h_left += hess[rows[k]];
        // Only split between distinct spend values.
        if x[rows[k]] == x[rows[k + 1]] {
            continue;
        }
        let split_gain = gain(g_left, h_left, lambda)
            + gain(g_total - g_left, h_total - h_left, lambda)
            - base_gain;
        let improves = match best {
            Some((g, _)) => split_gain > g,
            None => split_gain > 0.0,
        };
        if improves {
            best = Some((split_gain, k));
        }
    }

    let Some((_, k)) = best else {
        return Node::Leaf {
            value: leaf_value(grad, hess, rows, lambda),
        };
    };

    let threshold = (x[rows[k]] + x[rows[k + 1]]) / 2.0;
    let left = build_node(x, grad, hess, &rows[..=k], depth - 1, lambda);
    let right = build_node(x, grad, hess, &rows[k + 1..], depth - 1, lambda);
    Node::Split {
        threshold,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probabilities_stay_in_unit_interval() {
        let spend: Vec<f64> = (0..40).map(|i| i as f64 * 25.0).collect();
        let labels: Vec<u8> = (0..40).map(|i| u8::from(i >= 20)).collect();
        let model = BoostedTrees::fit(&spend, &labels, &BoostedConfig::default()).unwrap();
        for s in [-100.0, 0.0, 250.0, 499.0, 501.0, 5000.0] {
            let p = model.probability(s);
            assert!((0.0..=1.0).contains(&p), "p={p} out of range at spend {s}");
        }
    }

    #[test]
    fn separates_a_clean_threshold() {
        let spend: Vec<f64> = (0..40).map(|i| i as f64 * 25.0).collect();
        let labels: Vec<u8> = (0..40).map(|i| u8::from(i >= 20)).collect();
        let model = BoostedTrees::fit(&spend, &labels, &BoostedConfig::default()).unwrap();
        assert!(model.probability(100.0) < 0.5);
        assert!(model.probability(900.0) > 0.5);
    }

    #[test]
    fn repeated_fits_are_identical() {
        let spend: Vec<f64> = (0..30).map(|i| (i * 7 % 30) as f64).collect();
        let labels: Vec<u8> = (0..30).map(|i| u8::from(i % 3 == 0)).collect();
        let a = BoostedTrees::fit(&spend, &labels, &BoostedConfig::default()).unwrap();
        let b = BoostedTrees::fit(&spend, &labels, &BoostedConfig::default()).unwrap();
        for s in [0.0, 3.0, 11.0, 29.0] {
            assert_eq!(a.score(s).to_bits(), b.score(s).to_bits());
        }
    }

    #[test]
    fn constant_labels_predict_the_clamped_base_rate() {
        let spend = [5.0, 10.0, 15.0];
        let labels = [1u8, 1, 1];
        let model = BoostedTrees::fit(&spend, &labels, &BoostedConfig::default()).unwrap();
        assert!(model.probability(10.0) > 0.9);
    }
}
