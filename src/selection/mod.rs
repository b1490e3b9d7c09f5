//! Pump selection.
//!
//! - `engine`: rank catalog pumps against a duty point
//! - `system`: system curve and the operating point it implies

pub mod engine;
pub mod system;

pub use engine::*;
pub use system::*;
