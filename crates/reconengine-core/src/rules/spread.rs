//! Rule 2 (ICE/SGX): calendar spread matching.
//!
//! Distinct from [`crate::rules::product_spread`] (hyphenated two-product
//! spreads): a Rule 2 candidate trader "spread" is a pair of trader trades
//! on the same product, tagged `spread_flag` (the "S" marker carried over
//! from the source trader feed), with opposite sides, different contract
//! months, and equal quantity. It matches when the exchange side provides
//! a mirroring pair — same two months, same quantity, each leg's side
//! agreeing with its trader counterpart under the family's side convention
//! — and the near/far price delta agrees within tolerance on both sides.
//! All four ids commit atomically.

use reconengine_types::{Family, MatchId, MatchResult, MatchStatus, ReconConfig, Result, Trade, TradeId};

use crate::pool::UnmatchedPool;
use crate::rules::pairwise::side_matches;
use crate::rules::universal::{universal_fields_match, universal_matched_field_names};

pub const RULE_NUMBER: u32 = 2;

fn is_spread_leg(trade: &Trade) -> bool {
    trade.spread_flag.is_some()
}

pub fn find(pool: &mut UnmatchedPool, config: &ReconConfig, family: Family) -> Result<Vec<MatchResult>> {
    let side_convention = config.family_settings(family).side_convention;
    let confidence = config.confidence_for(RULE_NUMBER);
    let tolerance = config.tolerances.tolerance_default;

    let matched_fields: Vec<String> = ["product", "contract_month", "quantity", "price", "side", "spread_flag"]
        .iter()
        .map(ToString::to_string)
        .chain(universal_matched_field_names(&config.universal_matching_fields))
        .collect();

    let mut trader_ids: Vec<TradeId> = pool.trader_trades().filter(|t| is_spread_leg(t)).map(|t| t.internal_trade_id.clone()).collect();
    trader_ids.sort();

    let mut results = Vec::new();

    for i in 0..trader_ids.len() {
        let Some(leg1) = pool.trader(&trader_ids[i]).cloned() else { continue };

        for t2_id in trader_ids.iter().skip(i + 1) {
            let Some(leg2) = pool.trader(t2_id).cloned() else { continue };

            if leg1.product != leg2.product
                || leg1.side == leg2.side
                || leg1.contract_month == leg2.contract_month
                || leg1.quantity != leg2.quantity
            {
                continue;
            }

            let trader_delta = leg1.price - leg2.price;

            let mut exchange_ids: Vec<TradeId> = pool
                .exchange_trades()
                .filter(|e| is_spread_leg(e) && e.product == leg1.product && e.quantity == leg1.quantity)
                .map(|e| e.internal_trade_id.clone())
                .collect();
            exchange_ids.sort();

            let mut found: Option<(TradeId, TradeId)> = None;
            'search: for a in 0..exchange_ids.len() {
                for b in 0..exchange_ids.len() {
                    if a == b {
                        continue;
                    }
                    let Some(exch_a) = pool.exchange(&exchange_ids[a]).cloned() else { continue };
                    let Some(exch_b) = pool.exchange(&exchange_ids[b]).cloned() else { continue };

                    let pairs_with_leg1 = exch_a.contract_month == leg1.contract_month
                        && side_matches(&leg1, &exch_a, side_convention)
                        && universal_fields_match(&leg1, &exch_a, &config.universal_matching_fields);
                    let pairs_with_leg2 = exch_b.contract_month == leg2.contract_month
                        && side_matches(&leg2, &exch_b, side_convention)
                        && universal_fields_match(&leg2, &exch_b, &config.universal_matching_fields);

                    if !pairs_with_leg1 || !pairs_with_leg2 {
                        continue;
                    }

                    let exchange_delta = exch_a.price - exch_b.price;
                    if (trader_delta - exchange_delta).abs() <= tolerance {
                        found = Some((exchange_ids[a].clone(), exchange_ids[b].clone()));
                        break 'search;
                    }
                }
            }

            let Some((exch_a_id, exch_b_id)) = found else {
                continue;
            };

            let t1_id = trader_ids[i].clone();
            let t2_id = t2_id.clone();
            if !pool.commit(&[t1_id.clone(), t2_id.clone()], &[exch_a_id.clone(), exch_b_id.clone()], RULE_NUMBER)? {
                continue;
            }

            results.push(MatchResult {
                match_id: MatchId::generate(family.tag(), RULE_NUMBER),
                rule_number: RULE_NUMBER,
                confidence,
                primary_trader_trade: t1_id,
                primary_exchange_trade: exch_a_id,
                additional_trader_trades: vec![t2_id],
                additional_exchange_trades: vec![exch_b_id],
                matched_fields: matched_fields.clone(),
                status: MatchStatus::Matched,
            });
            break;
        }
    }

    Ok(results)
}
