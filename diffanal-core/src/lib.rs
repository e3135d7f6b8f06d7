//! Core models and combinatorics for diffanal.
//!
//! This crate holds what the analysis crates share:
//!
//! - Paired per-condition count samples ([`models::ConditionCounts`]) and their validation
//! - Overflow-checked binomial coefficients and a lazy combination iterator
//! - Random demo counts in the shape of a two-condition experiment

pub mod errors;
pub mod models;
pub mod simulate;
pub mod utils;

// re-exports
pub use errors::CountsError;
pub use models::ConditionCounts;
