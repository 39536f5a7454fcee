//! Core types: document classification, error taxonomy, and result aggregation.
//!
//! Everything a caller sees on the outside of a validation run lives here:
//! the [`ValidationRequest`] produced by intake, the [`ValidationResult`]
//! handed back after all stages ran, and the [`ValidatorError`] taxonomy.

mod error;
mod report;
mod types;

pub use error::*;
pub use report::*;
pub use types::*;
