//! Polynomial evaluation for stored curve models.
//!
//! Two primitive operations back both the fitter and the selection engine:
//! - build a design row for a flow value (for least squares)
//! - evaluate a coefficient list at a flow value
//!
//! Coefficients are always ordered highest degree first. Leading zeros contribute
//! nothing, so padded cubic models and unpadded legacy lists evaluate alike.

/// Evaluate `Σ c_i · x^(n-1-i)` with Horner's scheme.
///
/// No domain check is applied; callers that need conservative behavior must bound
/// `x` to the sampled flow range themselves.
pub fn evaluate(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// Fill a Vandermonde design row `[x^d, ..., x, 1]` for degree `d = out.len() - 1`.
pub fn fill_design_row(x: f64, out: &mut [f64]) {
    let mut power = 1.0;
    for slot in out.iter_mut().rev() {
        *slot = power;
        power *= x;
    }
}

/// Coefficient of determination of a curve against its samples.
///
/// With four points or fewer a cubic passes through every sample, so the fit is
/// reported as exact.
pub fn r_squared(x: &[f64], y: &[f64], coeffs: &[f64]) -> f64 {
    if x.len() <= 4 || y.is_empty() {
        return 1.0;
    }
    let mean = y.iter().sum::<f64>() / y.len() as f64;
    let (ss_res, ss_tot) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0), |(res, tot), (&xi, &yi)| {
            let pred = evaluate(coeffs, xi);
            (res + (yi - pred).powi(2), tot + (yi - mean).powi(2))
        });
    if ss_tot == 0.0 {
        return 1.0;
    }
    1.0 - ss_res / ss_tot
}
