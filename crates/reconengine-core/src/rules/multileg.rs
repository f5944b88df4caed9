//! Rule 9 (ICE): multileg spread — three or more legs of the same product,
//! each a different contract month, matched as one structure rather than
//! leg-by-leg.
//!
//! Trader legs and exchange legs are grouped by product (restricted to
//! `spread_flag`-tagged trades, same marker [`crate::rules::spread`] uses
//! for two-leg calendar spreads). A group of `n >= 3` trader legs matches a
//! group of `n` exchange legs for the same product when, after both groups
//! are sorted by contract month, every leg pairs up exactly on quantity,
//! price, and side (per the family's convention) — i.e. the structures are
//! identical multisets of `(month, quantity, price, side)`.

use reconengine_types::{Family, MatchId, MatchResult, MatchStatus, ReconConfig, Result, Trade, TradeId};

use crate::pool::UnmatchedPool;
use crate::rules::pairwise::side_matches;
use crate::rules::universal::{universal_fields_match, universal_matched_field_names};

pub const RULE_NUMBER: u32 = 9;
const MIN_LEGS: usize = 3;

fn is_spread_leg(trade: &Trade) -> bool {
    trade.spread_flag.is_some()
}

pub fn find(pool: &mut UnmatchedPool, config: &ReconConfig, family: Family) -> Result<Vec<MatchResult>> {
    let side_convention = config.family_settings(family).side_convention;
    let confidence = config.confidence_for(RULE_NUMBER);

    let matched_fields: Vec<String> = ["product", "contract_month", "quantity", "price", "side"]
        .iter()
        .map(ToString::to_string)
        .chain(universal_matched_field_names(&config.universal_matching_fields))
        .collect();

    let mut products: Vec<String> = pool
        .trader_trades()
        .filter(|t| is_spread_leg(t))
        .map(|t| t.product.clone())
        .collect();
    products.sort();
    products.dedup();

    let mut results = Vec::new();

    for product in products {
        let mut trader_ids: Vec<TradeId> = pool
            .trader_trades()
            .filter(|t| is_spread_leg(t) && t.product == product)
            .map(|t| t.internal_trade_id.clone())
            .collect();
        trader_ids.sort_by_key(|id| pool.trader(id).map(|t| t.contract_month));

        let mut exchange_ids: Vec<TradeId> = pool
            .exchange_trades()
            .filter(|t| is_spread_leg(t) && t.product == product)
            .map(|t| t.internal_trade_id.clone())
            .collect();
        exchange_ids.sort_by_key(|id| pool.exchange(id).map(|t| t.contract_month));

        if trader_ids.len() < MIN_LEGS || trader_ids.len() != exchange_ids.len() {
            continue;
        }

        let all_pairs_match = trader_ids.iter().zip(exchange_ids.iter()).all(|(t_id, e_id)| {
            let t = pool.trader(t_id).expect("trader id collected from pool");
            let e = pool.exchange(e_id).expect("exchange id collected from pool");
            t.quantity == e.quantity
                && t.price == e.price
                && side_matches(t, e, side_convention)
                && universal_fields_match(t, e, &config.universal_matching_fields)
        });

        if !all_pairs_match {
            continue;
        }

        if !pool.commit(&trader_ids, &exchange_ids, RULE_NUMBER)? {
            continue;
        }

        let mut trader_iter = trader_ids.into_iter();
        let mut exchange_iter = exchange_ids.into_iter();
        let primary_trader = trader_iter.next().expect("checked len >= MIN_LEGS");
        let primary_exchange = exchange_iter.next().expect("checked len >= MIN_LEGS");

        results.push(MatchResult {
            match_id: MatchId::generate(family.tag(), RULE_NUMBER),
            rule_number: RULE_NUMBER,
            confidence,
            primary_trader_trade: primary_trader,
            primary_exchange_trade: primary_exchange,
            additional_trader_trades: trader_iter.collect(),
            additional_exchange_trades: exchange_iter.collect(),
            matched_fields: matched_fields.clone(),
            status: MatchStatus::Matched,
        });
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconengine_types::{MonYY, Side, Source, Unit};
    use rust_decimal::Decimal;

    fn leg(id: &str, source: Source, month: u8, qty: Decimal, price: Decimal) -> Trade {
        let mut t = Trade::dummy(id, source, "380cst", MonYY::new(2025, month), qty, Unit::Mt, price, Side::Buy);
        t.spread_flag = Some("S".to_string());
        t
    }

    #[test]
    fn three_leg_structure_matches_as_one() {
        let cfg = ReconConfig::test_default();
        let trader_legs = vec![
            leg("T1", Source::Trader, 7, Decimal::TEN, Decimal::new(5, 0)),
            leg("T2", Source::Trader, 8, Decimal::TEN, Decimal::new(6, 0)),
            leg("T3", Source::Trader, 9, Decimal::TEN, Decimal::new(7, 0)),
        ];
        let exchange_legs = vec![
            leg("E1", Source::Exchange, 7, Decimal::TEN, Decimal::new(5, 0)),
            leg("E2", Source::Exchange, 8, Decimal::TEN, Decimal::new(6, 0)),
            leg("E3", Source::Exchange, 9, Decimal::TEN, Decimal::new(7, 0)),
        ];
        let mut pool = UnmatchedPool::new(trader_legs, exchange_legs);

        let results = find(&mut pool, &cfg, Family::Ice).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].all_trader_trades().len(), 3);
        assert_eq!(results[0].all_exchange_trades().len(), 3);
        assert_eq!(pool.trader_count(), 0);
    }

    #[test]
    fn two_legs_do_not_qualify_as_multileg() {
        let cfg = ReconConfig::test_default();
        let trader_legs = vec![
            leg("T1", Source::Trader, 7, Decimal::TEN, Decimal::new(5, 0)),
            leg("T2", Source::Trader, 8, Decimal::TEN, Decimal::new(6, 0)),
        ];
        let exchange_legs = vec![
            leg("E1", Source::Exchange, 7, Decimal::TEN, Decimal::new(5, 0)),
            leg("E2", Source::Exchange, 8, Decimal::TEN, Decimal::new(6, 0)),
        ];
        let mut pool = UnmatchedPool::new(trader_legs, exchange_legs);

        let results = find(&mut pool, &cfg, Family::Ice).unwrap();
        assert!(results.is_empty());
    }
}
