//! # reconengine-router
//!
//! Partitions a whole trade book by `exchange_group_id`, resolves each
//! group id to its exchange family via `ReconConfig::exchange_group_mapping`,
//! and dispatches each resulting [`reconengine_core::Partition`] to the
//! core's `reconcile`. Groups that carry no `exchange_group_id`, or one not
//! present in the mapping, are dropped with a warning rather than failing
//! the whole run.

pub mod router;

pub use router::{route_and_reconcile, PartitionResult, RoutedResult, TradeBook};
