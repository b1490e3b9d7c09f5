//! Curve fitting.
//!
//! Responsibilities:
//!
//! - fit one bounded-degree polynomial per curve (`fitter`)
//! - turn a fit request (points or MODES) into a full curve set (`curve_set`)

pub mod curve_set;
pub mod fitter;

pub use curve_set::*;
pub use fitter::*;
