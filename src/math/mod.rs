//! Mathematical utilities: number-list parsing and least squares.

pub mod ols;
pub mod series;

pub use ols::*;
pub use series::*;
