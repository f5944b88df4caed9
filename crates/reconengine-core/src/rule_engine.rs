//! The deterministic rule engine driver.
//!
//! Iterates `ReconConfig::rule_order_for(family)` in order, running each
//! rule's `find` against the pool it leaves behind. Pure given the same
//! pool and config. A rule number a family's `rule_order` contains but this
//! engine has no implementation for is skipped with a warning rather than
//! treated as an error — the same recoverable, locally-handled treatment
//! the router gives an exchange group id it can't resolve to a family.

use tracing::{info, warn};

use reconengine_types::{Family, MatchResult, ReconConfig, Result};

use crate::pool::UnmatchedPool;
use crate::rules::{aggregated, aggregation, complex_crack, crack, exact, multileg, product_spread, spread};

/// Run every configured rule for `family`, in order, against `pool`.
///
/// Returns the full ordered list of [`MatchResult`]s produced across all
/// rules. The pool is mutated in place; by the time this returns, every
/// trade it still holds is genuinely unmatched under every rule the family
/// implements.
pub fn run_all(pool: &mut UnmatchedPool, config: &ReconConfig, family: Family) -> Result<Vec<MatchResult>> {
    let mut all_results = Vec::new();

    for rule_number in config.rule_order_for(family) {
        let results = run_one(pool, config, family, rule_number)?;
        info!(
            family = %family,
            rule_number,
            matches = results.len(),
            trader_remaining = pool.trader_count(),
            exchange_remaining = pool.exchange_count(),
            "rule pass complete"
        );
        all_results.extend(results);
    }

    Ok(all_results)
}

fn run_one(pool: &mut UnmatchedPool, config: &ReconConfig, family: Family, rule_number: u32) -> Result<Vec<MatchResult>> {
    match rule_number {
        exact::RULE_NUMBER => exact::find(pool, config, family),
        spread::RULE_NUMBER => spread::find(pool, config, family),
        crack::RULE_NUMBER if family == Family::Ice => crack::find(pool, config, family),
        // SGX's rule 3 is product spread, not crack.
        3 if family == Family::Sgx => product_spread::find(pool, config, family, 3),
        complex_crack::COMPLEX_CRACK_RULE_NUMBER => complex_crack::find_complex_crack(pool, config, family),
        5 => product_spread::find(pool, config, family, 5),
        aggregation::RULE_NUMBER => aggregation::find(pool, config, family),
        aggregated::AGGREGATED_CRACK_RULE_NUMBER => aggregated::find_aggregated_crack(pool, config, family),
        aggregated::AGGREGATED_SPREAD_RULE_NUMBER => aggregated::find_aggregated_spread(pool, config, family),
        multileg::RULE_NUMBER => multileg::find(pool, config, family),
        aggregated::AGGREGATED_CRACK_ROLL_RULE_NUMBER => aggregated::find_aggregated_crack_roll(pool, config, family),
        complex_crack::CRACK_ROLL_RULE_NUMBER => complex_crack::find_crack_roll(pool, config, family),
        aggregated::AGGREGATED_PRODUCT_SPREAD_RULE_NUMBER => aggregated::find_aggregated_product_spread(pool, config, family),
        other => {
            warn!(family = %family, rule_number = other, "no implementation for configured rule number, skipping");
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconengine_types::{MonYY, Side, Source, Trade, Unit};
    use rust_decimal::Decimal;

    #[test]
    fn run_all_is_deterministic_across_repeated_runs() {
        let cfg = ReconConfig::test_default();
        let make_pool = || {
            let t = Trade::dummy("T1", Source::Trader, "380cst", MonYY::new(2025, 7), Decimal::TEN, Unit::Mt, Decimal::new(500, 0), Side::Buy);
            let e = Trade::dummy("E1", Source::Exchange, "380cst", MonYY::new(2025, 7), Decimal::TEN, Unit::Mt, Decimal::new(500, 0), Side::Buy);
            UnmatchedPool::new(vec![t], vec![e])
        };

        let mut pool_a = make_pool();
        let results_a = run_all(&mut pool_a, &cfg, Family::Ice).unwrap();

        let mut pool_b = make_pool();
        let results_b = run_all(&mut pool_b, &cfg, Family::Ice).unwrap();

        assert_eq!(results_a.len(), results_b.len());
        assert_eq!(results_a[0].rule_number, results_b[0].rule_number);
    }

    #[test]
    fn exact_match_runs_before_crack_rule_consumes_the_pair() {
        let cfg = ReconConfig::test_default();
        let t = Trade::dummy("T1", Source::Trader, "380cst crack", MonYY::new(2025, 7), Decimal::TEN, Unit::Mt, Decimal::new(5, 0), Side::Buy);
        let e = Trade::dummy("E1", Source::Exchange, "380cst crack", MonYY::new(2025, 7), Decimal::TEN, Unit::Mt, Decimal::new(5, 0), Side::Buy);
        let mut pool = UnmatchedPool::new(vec![t], vec![e]);

        let results = run_all(&mut pool, &cfg, Family::Ice).unwrap();
        // Rule 1 (exact) precedes rule 3 (crack) in rule_order and is an
        // exact-signature superset of it, so it claims the pair first.
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rule_number, 1);
    }

    #[test]
    fn sgx_routes_rule_3_to_product_spread_not_crack() {
        let cfg = ReconConfig::test_default();
        let t = Trade::dummy("T1", Source::Trader, "marine-380cst", MonYY::new(2025, 7), Decimal::TEN, Unit::Mt, Decimal::new(5, 0), Side::Buy);
        let mut e = t.clone();
        e.internal_trade_id = reconengine_types::TradeId::new("E1");
        e.source = Source::Exchange;
        e.side = Side::Sell; // SGX flips side

        let mut pool = UnmatchedPool::new(vec![t], vec![e]);
        let results = run_all(&mut pool, &cfg, Family::Sgx).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rule_number, 3);
    }
}
