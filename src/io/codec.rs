//! Coefficient text encodings.
//!
//! Stored coefficient fields come in two shapes:
//! - bracketed lists, `"[0.0, -0.01, 50.0]"` (what this crate writes)
//! - space-delimited lists, `"0 -0.01 50"` (older records)
//!
//! The shape is decided once by the first non-blank character and then decoded by
//! the matching strategy.

use crate::domain::PolynomialModel;
use crate::error::CurveError;
use crate::math::parse_series;

/// A coefficient field classified by its encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoefficientText<'a> {
    Bracketed(&'a str),
    Delimited(&'a str),
}

impl<'a> CoefficientText<'a> {
    pub fn classify(text: &'a str) -> Self {
        let trimmed = text.trim();
        if trimmed.starts_with('[') {
            CoefficientText::Bracketed(trimmed)
        } else {
            CoefficientText::Delimited(trimmed)
        }
    }

    /// Decode into a highest-degree-first coefficient list of any length.
    pub fn decode(self, field: &str) -> Result<Vec<f64>, CurveError> {
        match self {
            CoefficientText::Bracketed(text) => {
                serde_json::from_str::<Vec<f64>>(text).map_err(|e| CurveError::MalformedCoefficients {
                    field: field.to_string(),
                    reason: e.to_string(),
                })
            }
            CoefficientText::Delimited(text) => parse_series(field, text),
        }
    }
}

/// Decode a stored coefficient field in either encoding.
///
/// Every coefficient must be finite.
pub fn decode_coefficients(field: &str, text: &str) -> Result<Vec<f64>, CurveError> {
    let coeffs = CoefficientText::classify(text).decode(field)?;
    if coeffs.iter().any(|c| !c.is_finite()) {
        return Err(CurveError::MalformedCoefficients {
            field: field.to_string(),
            reason: "non-finite coefficient".to_string(),
        });
    }
    Ok(coeffs)
}

/// Decode a literal `[a3, a2, a1, a0]` list (MODES input).
///
/// Blank text is an absent curve and yields the zero model.
pub fn decode_literal_model(field: &str, text: &str) -> Result<PolynomialModel, CurveError> {
    if text.trim().is_empty() {
        return Ok(PolynomialModel::ZERO);
    }
    let coeffs = decode_coefficients(field, text)?;
    let Ok(coeffs) = <[f64; 4]>::try_from(coeffs.as_slice()) else {
        return Err(CurveError::CoefficientCount {
            field: field.to_string(),
            found: coeffs.len(),
        });
    };
    Ok(PolynomialModel::new(coeffs))
}

/// Encode a model in the bracketed form.
///
/// `f64`'s `Display` is the shortest representation that round-trips and never
/// uses an exponent, so the output is valid JSON and decodes losslessly.
pub fn encode_model(model: &PolynomialModel) -> String {
    let parts: Vec<String> = model.coeffs().iter().map(|c| c.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_sniffs_leading_bracket() {
        assert_eq!(
            CoefficientText::classify("  [1, 2]"),
            CoefficientText::Bracketed("[1, 2]")
        );
        assert_eq!(
            CoefficientText::classify("1 2\n"),
            CoefficientText::Delimited("1 2")
        );
    }

    #[test]
    fn both_encodings_decode_to_the_same_list() {
        let a = decode_coefficients("h_coeffs", "[0, 0, -0.01, 50]").unwrap();
        let b = decode_coefficients("h_coeffs", "0 0 -0.01 50").unwrap();
        assert_eq!(a, vec![0.0, 0.0, -0.01, 50.0]);
        assert_eq!(a, b);
    }

    #[test]
    fn malformed_bracketed_list_is_an_error() {
        let err = decode_coefficients("p2_coeffs", "[1, 2,").unwrap_err();
        assert_eq!(err.field(), "p2_coeffs");
        assert!(matches!(err, CurveError::MalformedCoefficients { .. }));

        let err = decode_coefficients("p2_coeffs", "[1, \"x\"]").unwrap_err();
        assert!(matches!(err, CurveError::MalformedCoefficients { .. }));
    }

    #[test]
    fn non_finite_stored_coefficients_are_rejected() {
        let err = decode_coefficients("h_coeffs", "NaN 0 0 40").unwrap_err();
        assert_eq!(err.field(), "h_coeffs");
        assert!(decode_coefficients("h_coeffs", "[1e999, 0, 0, 40]").is_err());
    }

    #[test]
    fn literal_model_requires_exactly_four_values() {
        let m = decode_literal_model("h_text", "[0, 0, -0.01, 50]").unwrap();
        assert_eq!(m.coeffs(), &[0.0, 0.0, -0.01, 50.0]);

        let err = decode_literal_model("h_text", "[-0.01, 50]").unwrap_err();
        assert_eq!(
            err,
            CurveError::CoefficientCount {
                field: "h_text".to_string(),
                found: 2,
            }
        );
        assert!(decode_literal_model("eff_text", "  ").unwrap().is_zero());
    }

    #[test]
    fn encoded_model_decodes_losslessly() {
        let m = PolynomialModel::new([-1.234_567_890_123e-7, 3.3e-20, -0.01, 50.0]);
        let text = encode_model(&m);
        assert!(text.starts_with('['));
        let back = decode_coefficients("h_coeffs", &text).unwrap();
        assert_eq!(back.as_slice(), m.coeffs());
    }
}
