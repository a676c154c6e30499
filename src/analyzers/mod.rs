//! Aggregation of enhanced path traversals.
//!
//! Link statistics, per-mode subsets and totals, and the run-level analysis
//! that ties loading, derivation and writing together.

pub mod aggregate;
pub mod analyzer;
pub mod mode;
pub mod types;
pub mod utility;
