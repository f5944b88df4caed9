//! Rule 0 comparison: diff a trader [`PositionMatrix`] against an exchange
//! one, tolerance band per unit.
//!
//! [`PositionStatus`] names the outcome of comparing one position; kept
//! distinct from [`reconengine_types::MatchStatus`] (the trade-match
//! outcome), an unrelated concept that happens to share the word "match".

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use reconengine_types::{MonYY, ReconConfig};

use crate::position_matrix::PositionMatrix;

/// Outcome of comparing one `(month, product)` position across sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    Zero,
    Matched,
    MissingInExchange,
    MissingInTrader,
    QuantityMismatch,
}

/// One compared position.
#[derive(Debug, Clone)]
pub struct PositionComparison {
    pub product: String,
    pub contract_month: MonYY,
    pub trader_quantity: Decimal,
    pub exchange_quantity: Decimal,
    pub difference: Decimal,
    pub status: PositionStatus,
    pub trader_trades: usize,
    pub exchange_trades: usize,
}

impl PositionComparison {
    #[must_use]
    pub fn has_discrepancy(&self) -> bool {
        !matches!(self.status, PositionStatus::Matched | PositionStatus::Zero)
    }
}

/// Compare every `(month, product)` position that appears in either matrix,
/// in ascending `(month, product)` order, for a deterministic output order.
#[must_use]
pub fn compare(
    trader: &PositionMatrix,
    exchange: &PositionMatrix,
    config: &ReconConfig,
) -> Vec<PositionComparison> {
    let mut keys: BTreeSet<(MonYY, String)> = BTreeSet::new();
    keys.extend(trader.keys().cloned());
    keys.extend(exchange.keys().cloned());

    keys.into_iter()
        .map(|(month, product)| {
            let trader_pos = trader.get(month, &product);
            let exchange_pos = exchange.get(month, &product);

            let trader_quantity = trader_pos.map_or(Decimal::ZERO, |p| p.quantity);
            let exchange_quantity = exchange_pos.map_or(Decimal::ZERO, |p| p.quantity);
            let difference = trader_quantity - exchange_quantity;

            let unit = trader_pos
                .or(exchange_pos)
                .map_or(config.canonical_unit(&product), |p| p.unit);
            let tolerance = config.tolerances.for_unit(unit);

            let status = determine_status(trader_quantity, exchange_quantity, difference, tolerance);

            PositionComparison {
                product,
                contract_month: month,
                trader_quantity,
                exchange_quantity,
                difference,
                status,
                trader_trades: trader_pos.map_or(0, |p| p.trade_count),
                exchange_trades: exchange_pos.map_or(0, |p| p.trade_count),
            }
        })
        .collect()
}

fn determine_status(
    trader_quantity: Decimal,
    exchange_quantity: Decimal,
    difference: Decimal,
    tolerance: Decimal,
) -> PositionStatus {
    if trader_quantity == Decimal::ZERO && exchange_quantity == Decimal::ZERO {
        return PositionStatus::Zero;
    }
    if trader_quantity == Decimal::ZERO {
        return PositionStatus::MissingInTrader;
    }
    if exchange_quantity == Decimal::ZERO {
        return PositionStatus::MissingInExchange;
    }
    if difference.abs() <= tolerance {
        return PositionStatus::Matched;
    }
    PositionStatus::QuantityMismatch
}

/// Cross-position summary over a comparison run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonSummary {
    pub total_positions: usize,
    pub matched: usize,
    pub quantity_mismatches: usize,
    pub missing_in_exchange: usize,
    pub missing_in_trader: usize,
    pub zero_positions: usize,
}

impl ComparisonSummary {
    #[must_use]
    pub fn from_comparisons(comparisons: &[PositionComparison]) -> Self {
        let mut summary = Self {
            total_positions: comparisons.len(),
            ..Self::default()
        };
        for c in comparisons {
            match c.status {
                PositionStatus::Matched => summary.matched += 1,
                PositionStatus::QuantityMismatch => summary.quantity_mismatches += 1,
                PositionStatus::MissingInExchange => summary.missing_in_exchange += 1,
                PositionStatus::MissingInTrader => summary.missing_in_trader += 1,
                PositionStatus::Zero => summary.zero_positions += 1,
            }
        }
        summary
    }

    /// Match rate as a percentage of non-zero positions, or `100.0` if there
    /// are no non-zero positions to reconcile.
    #[must_use]
    pub fn match_rate(&self) -> f64 {
        let non_zero = self.total_positions - self.zero_positions;
        if non_zero == 0 {
            return 100.0;
        }
        (self.matched as f64 / non_zero as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconengine_types::{Family, Side, Source, Trade, Unit};

    fn matrix_of(id: &str, source: Source, quantity: Decimal, side: Side) -> PositionMatrix {
        let cfg = ReconConfig::test_default();
        let trade = Trade::dummy(id, source, "380cst", MonYY::new(2025, 7), quantity, Unit::Mt, Decimal::new(500, 0), side);
        PositionMatrix::build(&[trade], &cfg, Family::Ice)
    }

    #[test]
    fn round_trip_position_matches_within_tolerance() {
        let cfg = ReconConfig::test_default();
        let trader = matrix_of("T1", Source::Trader, Decimal::TEN, Side::Buy);
        let exchange = matrix_of("E1", Source::Exchange, Decimal::TEN, Side::Buy);
        let comparisons = compare(&trader, &exchange, &cfg);

        assert_eq!(comparisons.len(), 1);
        assert_eq!(comparisons[0].status, PositionStatus::Matched);
        assert!(!comparisons[0].has_discrepancy());
    }

    #[test]
    fn quantity_mismatch_beyond_tolerance() {
        let cfg = ReconConfig::test_default();
        let trader = matrix_of("T1", Source::Trader, Decimal::TEN, Side::Buy);
        let exchange = matrix_of("E1", Source::Exchange, Decimal::new(8, 0), Side::Buy);
        let comparisons = compare(&trader, &exchange, &cfg);

        assert_eq!(comparisons[0].status, PositionStatus::QuantityMismatch);
        assert!(comparisons[0].has_discrepancy());
    }

    #[test]
    fn missing_in_exchange_when_only_trader_has_position() {
        let cfg = ReconConfig::test_default();
        let trader = matrix_of("T1", Source::Trader, Decimal::TEN, Side::Buy);
        let exchange = PositionMatrix::empty(Source::Exchange);
        let comparisons = compare(&trader, &exchange, &cfg);

        assert_eq!(comparisons[0].status, PositionStatus::MissingInExchange);
    }

    #[test]
    fn summary_computes_match_rate_excluding_zero_positions() {
        let cfg = ReconConfig::test_default();
        let trader = matrix_of("T1", Source::Trader, Decimal::TEN, Side::Buy);
        let exchange = matrix_of("E1", Source::Exchange, Decimal::TEN, Side::Buy);
        let comparisons = compare(&trader, &exchange, &cfg);
        let summary = ComparisonSummary::from_comparisons(&comparisons);

        assert_eq!(summary.matched, 1);
        assert!((summary.match_rate() - 100.0).abs() < f64::EPSILON);
    }
}
