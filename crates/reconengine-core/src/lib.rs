//! # reconengine-core
//!
//! **Pure deterministic reconciliation core.**
//!
//! This crate takes a family's pool of unmatched trader and exchange trades
//! and produces a deterministic set of matches. It has:
//!
//! - **Zero side effects**: no I/O, no adapter logic, no persistence
//! - **Deterministic output**: same pool + config -> same matches, same order
//! - **Atomic commits**: a rule either claims every trade it names or none
//! - **Position-level reconciliation**: Rule 0's decomposition, unit
//!   normalization, and matrix comparison run independently of the
//!   trade-pairing rules

pub mod decomposer;
pub mod matrix_comparator;
pub mod partition;
pub mod pool;
pub mod position_matrix;
pub mod reconcile;
pub mod rule_engine;
pub mod rules;
pub mod signature;
pub mod unit;

pub use decomposer::{decompose, Leg};
pub use matrix_comparator::{compare, ComparisonSummary, PositionComparison, PositionStatus};
pub use partition::Partition;
pub use pool::{AuditEntry, PoolStats, UnmatchedPool};
pub use position_matrix::{Position, PositionMatrix};
pub use reconcile::{position_analysis, reconcile, PositionAnalysis, ReconcileResult, Stats};
pub use rule_engine::run_all;
pub use signature::{HasTradeId, SignatureIndex};
pub use unit::convert;
