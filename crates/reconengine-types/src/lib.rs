//! # reconengine-types
//!
//! Shared value types, configuration, and errors for the **ReconEngine**
//! multi-exchange trade reconciliation engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`TradeId`], [`MatchId`]
//! - **Trade model**: [`Trade`], [`Source`], [`Side`], [`Unit`], [`PutCall`]
//! - **Month**: [`MonYY`]
//! - **Exchange family**: [`Family`]
//! - **Match model**: [`MatchResult`], [`MatchStatus`]
//! - **Configuration**: [`ReconConfig`], [`FamilySettings`], [`SideConvention`], [`Tolerances`]
//! - **Errors**: [`ReconError`] with `RECON_ERR_` prefix codes
//! - **Constants**: system-wide defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod family;
pub mod ids;
pub mod match_result;
pub mod month;
pub mod trade;

// Re-export all primary types at crate root for ergonomic imports:
//   use reconengine_types::{Trade, Side, MatchResult, ReconConfig, ...};

pub use config::*;
pub use error::*;
pub use family::*;
pub use ids::*;
pub use match_result::*;
pub use month::*;
pub use trade::*;

// Constants are accessed via `reconengine_types::constants::FOO`
// (not re-exported to avoid name collisions).
