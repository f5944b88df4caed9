//! The unmatched pool: the single exclusive set of trades still available
//! for matching.
//!
//! Once a trade is committed out of the pool it is permanently withdrawn
//! from every subsequent rule — no trade id is ever claimed by more than
//! one result. The commit is staged first (both sides checked for
//! presence) and only applied once every id in the batch is confirmed
//! available, so a rule can never leave the pool partially drained on a
//! rejected candidate — an unavailable id just reports `Ok(false)` and
//! leaves the pool untouched.

use std::collections::HashMap;

use reconengine_types::{ReconError, Result, Trade, TradeId};

/// The first id in `ids` that also appears earlier in `ids`, if any.
fn first_duplicate(ids: &[TradeId]) -> Option<TradeId> {
    ids.iter().enumerate().find_map(|(i, id)| ids[..i].contains(id).then(|| id.clone()))
}

/// One append-only audit record of a successful commit.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub trader_ids: Vec<TradeId>,
    pub exchange_ids: Vec<TradeId>,
    pub rule_number: u32,
}

/// Aggregate statistics over everything the pool has committed so far.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolStats {
    pub commits: usize,
    pub trader_trades_matched: usize,
    pub exchange_trades_matched: usize,
}

/// The exclusive, mutable working set of trader and exchange trades not yet
/// matched. `commit` is the only way to remove trades; there is no public
/// mutator that can leave it in an inconsistent state.
#[derive(Debug)]
pub struct UnmatchedPool {
    trader_trades: HashMap<TradeId, Trade>,
    exchange_trades: HashMap<TradeId, Trade>,
    audit_log: Vec<AuditEntry>,
}

impl UnmatchedPool {
    /// Build a pool from the full set of trader and exchange trades in a
    /// partition. Panics (fail-fast) on a duplicate id within either side —
    /// that is a data integrity fault upstream of the core, not a
    /// recoverable rule-level condition.
    #[must_use]
    pub fn new(trader_trades: Vec<Trade>, exchange_trades: Vec<Trade>) -> Self {
        let mut traders = HashMap::with_capacity(trader_trades.len());
        for t in trader_trades {
            if traders.insert(t.internal_trade_id.clone(), t).is_some() {
                panic!("duplicate trader trade id in partition");
            }
        }
        let mut exchanges = HashMap::with_capacity(exchange_trades.len());
        for t in exchange_trades {
            if exchanges.insert(t.internal_trade_id.clone(), t).is_some() {
                panic!("duplicate exchange trade id in partition");
            }
        }
        Self {
            trader_trades: traders,
            exchange_trades: exchanges,
            audit_log: Vec::new(),
        }
    }

    /// Borrow a trader trade still in the pool, if present.
    #[must_use]
    pub fn trader(&self, id: &TradeId) -> Option<&Trade> {
        self.trader_trades.get(id)
    }

    /// Borrow an exchange trade still in the pool, if present.
    #[must_use]
    pub fn exchange(&self, id: &TradeId) -> Option<&Trade> {
        self.exchange_trades.get(id)
    }

    /// `true` if the given trader id is still available.
    #[must_use]
    pub fn is_trader_available(&self, id: &TradeId) -> bool {
        self.trader_trades.contains_key(id)
    }

    /// `true` if the given exchange id is still available.
    #[must_use]
    pub fn is_exchange_available(&self, id: &TradeId) -> bool {
        self.exchange_trades.contains_key(id)
    }

    /// Iterate the trader trades currently available, in no particular
    /// order — callers that need a deterministic order sort by
    /// `internal_trade_id` (spec's ascending-id tie-break).
    pub fn trader_trades(&self) -> impl Iterator<Item = &Trade> {
        self.trader_trades.values()
    }

    /// Iterate the exchange trades currently available.
    pub fn exchange_trades(&self) -> impl Iterator<Item = &Trade> {
        self.exchange_trades.values()
    }

    #[must_use]
    pub fn trader_count(&self) -> usize {
        self.trader_trades.len()
    }

    #[must_use]
    pub fn exchange_count(&self) -> usize {
        self.exchange_trades.len()
    }

    /// Atomically withdraw `trader_ids` and `exchange_ids` from the pool and
    /// append one audit entry for the commit.
    ///
    /// All-or-nothing: if any id is absent, nothing is removed and `Ok(false)`
    /// is returned — an ordinary, recoverable outcome (a candidate another
    /// rule pass already claimed, or a multi-step search whose earlier
    /// choice turned out stale) that the caller should treat as "this
    /// candidate didn't pan out," not as an error. `Err` is reserved for a
    /// duplicate id *within* the same commit request (a trade named twice on
    /// one side), which no candidate-selection logic should ever produce and
    /// which leaves no sane partial-withdrawal to perform.
    pub fn commit(&mut self, trader_ids: &[TradeId], exchange_ids: &[TradeId], rule_number: u32) -> Result<bool> {
        if let Some(id) = first_duplicate(trader_ids).or_else(|| first_duplicate(exchange_ids)) {
            return Err(ReconError::PoolInvariantViolation(id));
        }

        for id in trader_ids {
            if !self.trader_trades.contains_key(id) {
                return Ok(false);
            }
        }
        for id in exchange_ids {
            if !self.exchange_trades.contains_key(id) {
                return Ok(false);
            }
        }

        for id in trader_ids {
            self.trader_trades.remove(id);
        }
        for id in exchange_ids {
            self.exchange_trades.remove(id);
        }

        self.audit_log.push(AuditEntry {
            trader_ids: trader_ids.to_vec(),
            exchange_ids: exchange_ids.to_vec(),
            rule_number,
        });

        Ok(true)
    }

    /// The append-only commit history, in commit order.
    #[must_use]
    pub fn audit_log(&self) -> &[AuditEntry] {
        &self.audit_log
    }

    /// Summary statistics over the commit history.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let mut stats = PoolStats {
            commits: self.audit_log.len(),
            ..PoolStats::default()
        };
        for entry in &self.audit_log {
            stats.trader_trades_matched += entry.trader_ids.len();
            stats.exchange_trades_matched += entry.exchange_ids.len();
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconengine_types::{MonYY, Side, Unit};
    use rust_decimal::Decimal;

    fn trade(id: &str, source: reconengine_types::Source) -> Trade {
        Trade::dummy(
            id,
            source,
            "380cst",
            MonYY::new(2025, 7),
            Decimal::ONE,
            Unit::Mt,
            Decimal::new(500, 0),
            Side::Buy,
        )
    }

    #[test]
    fn commit_removes_both_sides_atomically() {
        let t = trade("T1", reconengine_types::Source::Trader);
        let e = trade("E1", reconengine_types::Source::Exchange);
        let mut pool = UnmatchedPool::new(vec![t], vec![e]);

        pool.commit(&[TradeId::new("T1")], &[TradeId::new("E1")], 1)
            .unwrap();

        assert!(!pool.is_trader_available(&TradeId::new("T1")));
        assert!(!pool.is_exchange_available(&TradeId::new("E1")));
        assert_eq!(pool.audit_log().len(), 1);
    }

    #[test]
    fn commit_with_missing_id_leaves_pool_untouched_and_reports_false() {
        let t = trade("T1", reconengine_types::Source::Trader);
        let mut pool = UnmatchedPool::new(vec![t], vec![]);

        let result = pool.commit(&[TradeId::new("T1")], &[TradeId::new("E_MISSING")], 1);
        assert!(!result.unwrap());
        assert!(pool.is_trader_available(&TradeId::new("T1")));
        assert_eq!(pool.audit_log().len(), 0);
    }

    #[test]
    fn double_commit_of_same_trade_reports_false_not_error() {
        let t = trade("T1", reconengine_types::Source::Trader);
        let e = trade("E1", reconengine_types::Source::Exchange);
        let mut pool = UnmatchedPool::new(vec![t], vec![e]);

        pool.commit(&[TradeId::new("T1")], &[TradeId::new("E1")], 1)
            .unwrap();
        let second = pool.commit(&[TradeId::new("T1")], &[], 2);
        assert!(!second.unwrap());
    }

    #[test]
    fn duplicate_id_within_one_commit_request_is_a_fatal_invariant_violation() {
        let t = trade("T1", reconengine_types::Source::Trader);
        let e = trade("E1", reconengine_types::Source::Exchange);
        let mut pool = UnmatchedPool::new(vec![t], vec![e]);

        let result = pool.commit(&[TradeId::new("T1"), TradeId::new("T1")], &[TradeId::new("E1")], 1);
        assert!(result.is_err());
        assert!(pool.is_trader_available(&TradeId::new("T1")));
    }

    #[test]
    fn stats_accumulate_across_commits() {
        let t1 = trade("T1", reconengine_types::Source::Trader);
        let t2 = trade("T2", reconengine_types::Source::Trader);
        let e1 = trade("E1", reconengine_types::Source::Exchange);
        let mut pool = UnmatchedPool::new(vec![t1, t2], vec![e1]);

        pool.commit(&[TradeId::new("T1")], &[TradeId::new("E1")], 1)
            .unwrap();
        let stats = pool.stats();
        assert_eq!(stats.commits, 1);
        assert_eq!(stats.trader_trades_matched, 1);
        assert_eq!(stats.exchange_trades_matched, 1);
        assert_eq!(pool.trader_count(), 1);
    }
}
