//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the curve model (`PolynomialModel`, `CurveSet`, `OperatingEnvelope`)
//! - fit requests and outcomes, including input units
//! - catalog records (`PumpRecord`) and selection results (`SelectionMatch`)

pub mod types;

pub use types::*;
