//! Error types.
//!
//! - `CurveError`: failures of the numeric core (parsing, fitting, decoding stored
//!   coefficients). Every variant names the curve field it came from so the caller
//!   can report which input was rejected.
//! - `AppError`: what the binary prints, carrying the process exit code.

use thiserror::Error;

/// Errors raised while parsing, fitting, or decoding curve data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("{field}: '{token}' is not a number")]
    MalformedNumber { field: String, token: String },

    #[error("{field}: {y_len} values given for {x_len} flow samples")]
    LengthMismatch {
        field: String,
        x_len: usize,
        y_len: usize,
    },

    #[error("{field}: expected 4 coefficients [a3, a2, a1, a0], found {found}")]
    CoefficientCount { field: String, found: usize },

    #[error("{field}: malformed coefficient list ({reason})")]
    MalformedCoefficients { field: String, reason: String },

    #[error("{field}: least squares solve failed (flow samples may be degenerate)")]
    SolveFailed { field: String },
}

impl CurveError {
    /// Name of the curve field the error refers to.
    pub fn field(&self) -> &str {
        match self {
            CurveError::MalformedNumber { field, .. }
            | CurveError::LengthMismatch { field, .. }
            | CurveError::CoefficientCount { field, .. }
            | CurveError::MalformedCoefficients { field, .. }
            | CurveError::SolveFailed { field } => field,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<CurveError> for AppError {
    fn from(err: CurveError) -> Self {
        AppError::new(2, format!("Invalid curve input: {err}"))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
