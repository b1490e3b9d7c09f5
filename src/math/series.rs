//! Whitespace-separated number lists.
//!
//! Curve samples arrive as free text (`"0 10 20 30"`). A token that does not parse
//! rejects the whole series: a silently shortened series would pair flows with the
//! wrong dependent values.

use crate::error::CurveError;

/// Parse a whitespace-separated list of floats.
///
/// Empty or whitespace-only text yields an empty series. `NaN` and `inf` tokens
/// are rejected like any other non-number.
pub fn parse_series(field: &str, text: &str) -> Result<Vec<f64>, CurveError> {
    text.split_whitespace()
        .map(|token| match token.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(CurveError::MalformedNumber {
                field: field.to_string(),
                token: token.to_string(),
            }),
        })
        .collect()
}

/// `(min, max)` of a series, or `(0, 0)` when empty.
pub fn series_bounds(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tokens_in_order() {
        let v = parse_series("q_text", " 0 10\t20.5\n-3e1 ").unwrap();
        assert_eq!(v, vec![0.0, 10.0, 20.5, -30.0]);
    }

    #[test]
    fn length_matches_token_count() {
        for text in ["1", "1 2", "  4 5 6  ", "7\n8\n9\n10"] {
            let v = parse_series("x", text).unwrap();
            assert_eq!(v.len(), text.split_whitespace().count());
        }
    }

    #[test]
    fn empty_and_blank_text_is_empty_series() {
        assert!(parse_series("x", "").unwrap().is_empty());
        assert!(parse_series("x", "   \n\t").unwrap().is_empty());
    }

    #[test]
    fn bad_token_rejects_the_whole_series() {
        let err = parse_series("h_text", "50 45 abc 20").unwrap_err();
        assert_eq!(
            err,
            CurveError::MalformedNumber {
                field: "h_text".to_string(),
                token: "abc".to_string(),
            }
        );
    }

    #[test]
    fn non_finite_tokens_are_malformed() {
        for token in ["NaN", "inf", "-infinity", "1e999"] {
            let err = parse_series("q_text", &format!("0 {token} 20")).unwrap_err();
            assert!(matches!(err, CurveError::MalformedNumber { .. }), "{token}");
        }
    }

    #[test]
    fn bounds_of_series() {
        assert_eq!(series_bounds(&[]), (0.0, 0.0));
        assert_eq!(series_bounds(&[20.0, 50.0, 35.0]), (20.0, 50.0));
    }
}
