//! Input/output helpers.
//!
//! - coefficient text encodings (`codec`)
//! - JSON pump catalog (`catalog`)
//! - CSV export of selection results (`export`)

pub mod catalog;
pub mod codec;
pub mod export;

pub use catalog::*;
pub use codec::*;
pub use export::*;
