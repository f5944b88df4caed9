//! Identifiers used throughout the reconciliation engine.
//!
//! `TradeId` wraps the broker/exchange-assigned `internal_trade_id` string
//! verbatim — these ids are not engine-generated, unlike `MatchId`, which
//! the engine mints when a rule commits a match.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A trade's identity within its source (trader or exchange).
///
/// Wraps the source system's own id string; the engine never mints these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TradeId(pub String);

impl TradeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TradeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TradeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a `MatchResult`, format `{FAMILY}_{RULE#}_{uuid-suffix}`.
///
/// Minted by the rule that produces the match, never by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchId(pub String);

/// Length of the UUID suffix appended to a generated `MatchId`.
const UUID_SUFFIX_LEN: usize = 8;

impl MatchId {
    /// Mint a new match id for the given family and rule number.
    ///
    /// Format: `{FAMILY}_{RULE#}_{uuid-suffix}`, e.g. `ICE_3_a1b2c3d4`.
    #[must_use]
    pub fn generate(family_tag: &str, rule_number: u32) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        let suffix = &suffix[..UUID_SUFFIX_LEN];
        Self(format!("{family_tag}_{rule_number}_{suffix}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
