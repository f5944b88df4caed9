//! # reconengine-report
//!
//! Flattens a [`reconengine_core::ReconcileResult`] into the stable,
//! serializable output rows a host persists or displays: the result
//! aggregator that collates matches and unmatched residue into one
//! tabular output schema.

pub mod records;
pub mod stats;

pub use records::{to_records, Record};
pub use stats::RoutedStats;
