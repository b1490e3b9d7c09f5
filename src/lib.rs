//! `pump-curves` library crate.
//!
//! The binary (`pumpsel`) is a thin wrapper around this library so that:
//!
//! - fitting and selection are testable without spawning processes
//! - the catalog and selection engine are reusable behind other front-ends

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod selection;
