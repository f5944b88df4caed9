//! The two top-level entry points a host actually calls: `reconcile` (the
//! trade-pairing pipeline) and `position_analysis` (Rule 0), each operating
//! on one [`Partition`].

use reconengine_types::{Family, MatchResult, ReconConfig, Result, Trade};

use crate::matrix_comparator::{compare, PositionComparison};
use crate::partition::Partition;
use crate::position_matrix::PositionMatrix;
use crate::rule_engine::run_all;

/// Counts and rates over one partition's reconciliation: original counts,
/// matched counts, unmatched counts, trader rate, exchange rate, overall
/// rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stats {
    pub original_trader: usize,
    pub original_exchange: usize,
    pub matched_trader: usize,
    pub matched_exchange: usize,
    pub unmatched_trader: usize,
    pub unmatched_exchange: usize,
}

impl Stats {
    /// Matched trader trades as a percentage of the original trader count
    /// (`100.0` if there were none to begin with).
    #[must_use]
    pub fn trader_rate(&self) -> f64 {
        rate(self.matched_trader, self.original_trader)
    }

    /// Matched exchange trades as a percentage of the original exchange
    /// count.
    #[must_use]
    pub fn exchange_rate(&self) -> f64 {
        rate(self.matched_exchange, self.original_exchange)
    }

    /// Weighted average of `trader_rate` and `exchange_rate`, weighted by
    /// each side's original count.
    #[must_use]
    pub fn overall_rate(&self) -> f64 {
        rate(self.matched_trader + self.matched_exchange, self.original_trader + self.original_exchange)
    }
}

fn rate(matched: usize, original: usize) -> f64 {
    if original == 0 {
        return 100.0;
    }
    (matched as f64 / original as f64) * 100.0
}

/// Outcome of reconciling one partition: every match the rule engine
/// produced, summary stats, and each side's residue.
#[derive(Debug, Clone)]
pub struct ReconcileResult {
    pub family: Family,
    pub matches: Vec<MatchResult>,
    pub stats: Stats,
    pub unmatched_trader: Vec<Trade>,
    pub unmatched_exchange: Vec<Trade>,
}

/// Run the full rule pipeline over `partition` and sweep whatever the pool
/// still holds into the two unmatched buckets.
pub fn reconcile(partition: &Partition, config: &ReconConfig, family: Family) -> Result<ReconcileResult> {
    let original_trader = partition.trader_trades.len();
    let original_exchange = partition.exchange_trades.len();

    let mut pool = partition.clone().into_pool();
    let matches = run_all(&mut pool, config, family)?;

    let matched_trader: usize = matches.iter().map(|m| m.all_trader_trades().len()).sum();
    let matched_exchange: usize = matches.iter().map(|m| m.all_exchange_trades().len()).sum();

    let mut unmatched_trader: Vec<Trade> = pool.trader_trades().cloned().collect();
    unmatched_trader.sort_by(|a, b| a.internal_trade_id.cmp(&b.internal_trade_id));
    let mut unmatched_exchange: Vec<Trade> = pool.exchange_trades().cloned().collect();
    unmatched_exchange.sort_by(|a, b| a.internal_trade_id.cmp(&b.internal_trade_id));

    let stats = Stats {
        original_trader,
        original_exchange,
        matched_trader,
        matched_exchange,
        unmatched_trader: unmatched_trader.len(),
        unmatched_exchange: unmatched_exchange.len(),
    };

    Ok(ReconcileResult {
        family,
        matches,
        stats,
        unmatched_trader,
        unmatched_exchange,
    })
}

/// Rule 0's independent position-level view: build both sides' matrices and
/// compare them, without regard to which individual trades the pairing
/// rules matched.
#[derive(Debug, Clone)]
pub struct PositionAnalysis {
    pub matrix_trader: PositionMatrix,
    pub matrix_exchange: PositionMatrix,
    pub comparisons: Vec<PositionComparison>,
}

#[must_use]
pub fn position_analysis(partition: &Partition, config: &ReconConfig, family: Family) -> PositionAnalysis {
    let matrix_trader = PositionMatrix::build(&partition.trader_trades, config, family);
    let matrix_exchange = PositionMatrix::build(&partition.exchange_trades, config, family);
    let comparisons = compare(&matrix_trader, &matrix_exchange, config);

    PositionAnalysis {
        matrix_trader,
        matrix_exchange,
        comparisons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconengine_types::{MonYY, Side, Source, Unit};
    use rust_decimal::Decimal;

    fn trade(id: &str, source: Source, qty: Decimal, side: Side) -> Trade {
        Trade::dummy(id, source, "380cst", MonYY::new(2025, 7), qty, Unit::Mt, Decimal::new(500, 0), side)
    }

    #[test]
    fn reconcile_reports_one_match_and_no_residue() {
        let cfg = ReconConfig::test_default();
        let partition = Partition::new(
            vec![trade("T1", Source::Trader, Decimal::TEN, Side::Buy)],
            vec![trade("E1", Source::Exchange, Decimal::TEN, Side::Buy)],
        );

        let result = reconcile(&partition, &cfg, Family::Ice).unwrap();
        assert_eq!(result.matches.len(), 1);
        assert!(result.unmatched_trader.is_empty());
        assert!(result.unmatched_exchange.is_empty());
        assert!((result.stats.overall_rate() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reconcile_sweeps_leftover_trades_into_unmatched_buckets() {
        let cfg = ReconConfig::test_default();
        let partition = Partition::new(vec![trade("T1", Source::Trader, Decimal::TEN, Side::Buy)], vec![]);

        let result = reconcile(&partition, &cfg, Family::Ice).unwrap();
        assert!(result.matches.is_empty());
        assert_eq!(result.unmatched_trader.len(), 1);
        assert_eq!(result.stats.trader_rate(), 0.0);
    }

    #[test]
    fn position_analysis_is_independent_of_trade_pairing() {
        let cfg = ReconConfig::test_default();
        let partition = Partition::new(
            vec![trade("T1", Source::Trader, Decimal::TEN, Side::Buy)],
            vec![trade("E1", Source::Exchange, Decimal::TEN, Side::Buy)],
        );

        let analysis = position_analysis(&partition, &cfg, Family::Ice);
        assert_eq!(analysis.comparisons.len(), 1);
    }
}
