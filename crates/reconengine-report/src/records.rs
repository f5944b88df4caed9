//! Flatten a [`ReconcileResult`] into output rows: one row per
//! `MatchResult`, plus one row per unmatched trade on each side.

use serde::{Deserialize, Serialize};

use reconengine_core::ReconcileResult;
use reconengine_types::{MatchStatus, TradeId};

/// One output row: a match, or a single unmatched trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub match_id: Option<String>,
    pub trader_trade_ids: Vec<TradeId>,
    pub exchange_trade_ids: Vec<TradeId>,
    pub status: MatchStatus,
    pub remarks: String,
    pub confidence: u8,
}

/// Flatten every match in `result` plus its unmatched residue into rows, in
/// match order followed by trader residue then exchange residue (both
/// already ascending `internal_trade_id`, per [`reconengine_core::reconcile`]).
#[must_use]
pub fn to_records(result: &ReconcileResult) -> Vec<Record> {
    let family = result.family;
    let mut records = Vec::with_capacity(result.matches.len() + result.unmatched_trader.len() + result.unmatched_exchange.len());

    for m in &result.matches {
        records.push(Record {
            match_id: Some(m.match_id.to_string()),
            trader_trade_ids: m.all_trader_trades(),
            exchange_trade_ids: m.all_exchange_trades(),
            status: m.status,
            remarks: format!("{family}_rule{}", m.rule_number),
            confidence: m.confidence,
        });
    }

    for t in &result.unmatched_trader {
        records.push(Record {
            match_id: None,
            trader_trade_ids: vec![t.internal_trade_id.clone()],
            exchange_trade_ids: Vec::new(),
            status: MatchStatus::UnmatchedTraders,
            remarks: format!("{family}_{}", MatchStatus::UnmatchedTraders),
            confidence: 0,
        });
    }

    for e in &result.unmatched_exchange {
        records.push(Record {
            match_id: None,
            trader_trade_ids: Vec::new(),
            exchange_trade_ids: vec![e.internal_trade_id.clone()],
            status: MatchStatus::UnmatchedExch,
            remarks: format!("{family}_{}", MatchStatus::UnmatchedExch),
            confidence: 0,
        });
    }

    records
}
