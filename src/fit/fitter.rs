//! Least-squares polynomial fitting for a single curve.
//!
//! Given flow samples `q_i` and dependent samples `y_i` we fit a polynomial of
//! degree `min(3, n - 1)`: a cubic needs four points, so smaller sample sets drop to
//! the highest degree they can pin down (down to a line through two points).
//! The result is always padded to the fixed cubic width.

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::domain::PolynomialModel;
use crate::error::CurveError;
use crate::math::{parse_series, solve_least_squares};
use crate::models::fill_design_row;

/// Highest polynomial degree stored per curve.
pub const MAX_DEGREE: usize = 3;

/// Fewest dependent samples that define a trend.
pub const MIN_POINTS: usize = 2;

/// Fit a curve from flow samples and the dependent samples as text.
pub fn fit_curve(field: &str, x: &[f64], y_text: &str) -> Result<PolynomialModel, CurveError> {
    let y = parse_series(field, y_text)?;
    fit_samples(field, x, &y)
}

/// Fit a curve from parsed samples.
///
/// Fewer than two dependent samples yield the zero model: curves may be left
/// incomplete while a pump is being edited.
pub fn fit_samples(field: &str, x: &[f64], y: &[f64]) -> Result<PolynomialModel, CurveError> {
    if y.len() < MIN_POINTS {
        debug!("{field}: {} sample(s), storing zero model", y.len());
        return Ok(PolynomialModel::ZERO);
    }
    if x.len() != y.len() {
        return Err(CurveError::LengthMismatch {
            field: field.to_string(),
            x_len: x.len(),
            y_len: y.len(),
        });
    }

    let n = x.len();
    let degree = (n - 1).min(MAX_DEGREE);
    let cols = degree + 1;

    let mut rows = vec![0.0; n * cols];
    for (row, &xi) in rows.chunks_exact_mut(cols).zip(x) {
        fill_design_row(xi, row);
    }
    let design = DMatrix::from_row_slice(n, cols, &rows);
    let target = DVector::from_row_slice(y);

    let beta = solve_least_squares(&design, &target).ok_or_else(|| CurveError::SolveFailed {
        field: field.to_string(),
    })?;
    debug!("{field}: degree {degree} fit over {n} points");

    PolynomialModel::from_padded(beta.as_slice()).ok_or_else(|| CurveError::SolveFailed {
        field: field.to_string(),
    })
}
