//! Cubic curve model primitives.
//!
//! Kept as small pure functions so the fitter and the selection engine share one
//! definition of how coefficients are laid out.

pub mod polynomial;

pub use polynomial::*;
