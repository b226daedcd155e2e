//! Least squares solver.
//!
//! Both fitting engines reduce to small linear regression problems:
//!
//! - elasticity: `ln(units) = intercept + coefficient · ln(price)`
//! - forecast: an additive trend + seasonal-harmonic design matrix
//!
//! Implementation choices:
//! - We solve via SVD so tall design matrices (many rows, few columns) are
//!   handled robustly even when columns are nearly collinear (e.g., seasonal
//!   harmonics over a short history).
//! - Parameter dimension is tiny (2–14 columns), so SVD cost is negligible
//!   next to dataset I/O.

use nalgebra::{DMatrix, DVector};

/// Solve an ordinary least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if the strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = intercept + slope * x` and return `(intercept, slope)`.
pub fn fit_simple_line(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len();
    if n < 2 {
        return None;
    }

    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &xi) in x.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = xi;
    }
    let obs = DVector::from_row_slice(y);

    let beta = solve_least_squares(&design, &obs)?;
    Some((beta[0], beta[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn simple_line_recovers_slope_and_intercept() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 0.5 - 1.5 * v).collect();
        let (intercept, slope) = fit_simple_line(&x, &y).unwrap();
        assert!((intercept - 0.5).abs() < 1e-10);
        assert!((slope + 1.5).abs() < 1e-10);
    }
}
