//! The output of a successful (or partially successful) rule application.

use serde::{Deserialize, Serialize};

use crate::ids::{MatchId, TradeId};

/// Outcome recorded against a match attempt.
///
/// `PendingExchange` covers a trader-side aggregation that has consumed its
/// trader legs but is still waiting on a covering exchange trade; the two
/// `Unmatched*` variants are terminal states assigned once all rules have
/// run and pool residue is swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Matched,
    PendingExchange,
    UnmatchedTraders,
    UnmatchedExch,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Matched => "matched",
            Self::PendingExchange => "pending_exchange",
            Self::UnmatchedTraders => "unmatched_traders",
            Self::UnmatchedExch => "unmatched_exch",
        };
        write!(f, "{s}")
    }
}

/// A single outcome of the rule engine: one primary trader/exchange pair,
/// plus any additional legs an N:M rule (aggregation, multileg, the
/// aggregated variants) pulled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: MatchId,
    pub rule_number: u32,
    pub confidence: u8,
    pub primary_trader_trade: TradeId,
    pub primary_exchange_trade: TradeId,
    pub additional_trader_trades: Vec<TradeId>,
    pub additional_exchange_trades: Vec<TradeId>,
    pub matched_fields: Vec<String>,
    pub status: MatchStatus,
}

impl MatchResult {
    /// All trader-side trade ids this match consumed, primary first.
    #[must_use]
    pub fn all_trader_trades(&self) -> Vec<TradeId> {
        std::iter::once(self.primary_trader_trade.clone())
            .chain(self.additional_trader_trades.iter().cloned())
            .collect()
    }

    /// All exchange-side trade ids this match consumed, primary first.
    #[must_use]
    pub fn all_exchange_trades(&self) -> Vec<TradeId> {
        std::iter::once(self.primary_exchange_trade.clone())
            .chain(self.additional_exchange_trades.iter().cloned())
            .collect()
    }

    /// `true` for aggregation-style results spanning more than one trade on
    /// either side.
    #[must_use]
    pub fn is_aggregated(&self) -> bool {
        !self.additional_trader_trades.is_empty() || !self.additional_exchange_trades.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::MatchId;

    fn sample() -> MatchResult {
        MatchResult {
            match_id: MatchId::generate("ICE", 1),
            rule_number: 1,
            confidence: 100,
            primary_trader_trade: TradeId::new("T1"),
            primary_exchange_trade: TradeId::new("E1"),
            additional_trader_trades: vec![],
            additional_exchange_trades: vec![],
            matched_fields: vec!["product".to_string()],
            status: MatchStatus::Matched,
        }
    }

    #[test]
    fn simple_match_is_not_aggregated() {
        assert!(!sample().is_aggregated());
    }

    #[test]
    fn aggregated_match_reports_all_legs() {
        let mut m = sample();
        m.additional_trader_trades.push(TradeId::new("T2"));
        assert!(m.is_aggregated());
        assert_eq!(m.all_trader_trades().len(), 2);
        assert_eq!(m.all_exchange_trades().len(), 1);
    }

    #[test]
    fn status_display_matches_remarks_vocabulary() {
        assert_eq!(MatchStatus::Matched.to_string(), "matched");
        assert_eq!(MatchStatus::UnmatchedTraders.to_string(), "unmatched_traders");
    }
}
