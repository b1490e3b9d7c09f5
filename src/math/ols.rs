//! Least squares solver.
//!
//! Curve fits solve small problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! where each row `x_i` is a Vandermonde row `[q³, q², q, 1]` (or a lower degree).
//!
//! Implementation choices:
//! - Columns are scaled to unit norm before solving. Raw flow values of a few hundred
//!   m³/h put `q³` columns many orders of magnitude above the constant column.
//! - SVD solves tall systems and yields the minimum-norm solution when columns
//!   are collinear (e.g. repeated flow values).

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD on column-scaled data.
///
/// Returns `None` if no finite solution can be found.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() != y.len() || x.ncols() == 0 {
        return None;
    }
    // SVD iteration does not terminate reliably on NaN/inf entries.
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return None;
    }

    let mut scaled = x.clone();
    let mut scale = DVector::from_element(x.ncols(), 1.0);
    for (j, mut col) in scaled.column_iter_mut().enumerate() {
        let norm = col.norm();
        if norm > 0.0 && norm.is_finite() {
            col /= norm;
            scale[j] = norm;
        }
    }

    let svd = scaled.svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            let beta = beta.component_div(&scale);
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
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
    fn least_squares_handles_badly_scaled_columns() {
        // y = 1e-6·x³ + 5 sampled at large x.
        let xs = [100.0, 200.0, 300.0, 400.0, 500.0];
        let mut rows = Vec::new();
        let mut ys = Vec::new();
        for &x in &xs {
            rows.extend_from_slice(&[x * x * x, 1.0]);
            ys.push(1e-6 * x * x * x + 5.0);
        }
        let x = DMatrix::from_row_slice(xs.len(), 2, &rows);
        let y = DVector::from_row_slice(&ys);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 1e-6).abs() < 1e-12);
        assert!((beta[1] - 5.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_shape_mismatch_and_non_finite_input() {
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        assert!(solve_least_squares(&x, &DVector::from_row_slice(&[1.0])).is_none());
        assert!(solve_least_squares(&x, &DVector::from_row_slice(&[1.0, f64::NAN])).is_none());
    }
}
