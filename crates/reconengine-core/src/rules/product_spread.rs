//! Product spread matching: Rule 5 for ICE, Rule 3 for SGX.
//!
//! A trader trade on `"A-B"` nets out to two exchange legs: one on `A`, one
//! on `B`, same contract month, opposite sides, equal quantities after unit
//! normalization, with `price(trader) == price(A) - price(B)` within
//! tolerance — the same base-and-synthetic-leg shape as
//! [`crate::rules::crack`], just with both leg names read off the product
//! string instead of one being a configured hub. The rule number is a
//! parameter because ICE assigns this behavior slot 5 and SGX assigns it
//! slot 3 in their respective `rule_order`.

use reconengine_types::{Family, MatchId, MatchResult, MatchStatus, ReconConfig, Result, SideConvention, TradeId};

use crate::pool::UnmatchedPool;
use crate::rules::universal::{universal_fields_match, universal_matched_field_names};
use crate::unit::convert;

fn split_product<'a>(product: &'a str, separator: &str) -> Option<(&'a str, &'a str)> {
    let mut parts = product.splitn(2, separator);
    let a = parts.next()?;
    let b = parts.next()?;
    if b.contains(separator) {
        return None;
    }
    Some((a, b))
}

pub fn find(pool: &mut UnmatchedPool, config: &ReconConfig, family: Family, rule_number: u32) -> Result<Vec<MatchResult>> {
    let settings = config.family_settings(family);
    let separator = settings.spread_separator.clone();
    let side_convention = settings.side_convention;
    let confidence = config.confidence_for(rule_number);
    let tolerance = config.tolerances.tolerance_default;

    let matched_fields: Vec<String> = ["product", "contract_month", "quantity", "price", "side"]
        .iter()
        .map(ToString::to_string)
        .chain(universal_matched_field_names(&config.universal_matching_fields))
        .collect();

    let mut trader_ids: Vec<TradeId> = pool
        .trader_trades()
        .filter(|t| t.is_product_spread(&separator))
        .map(|t| t.internal_trade_id.clone())
        .collect();
    trader_ids.sort();

    let mut results = Vec::new();

    for trader_id in trader_ids {
        let Some(trader) = pool.trader(&trader_id).cloned() else {
            continue;
        };
        let Some((product_a, product_b)) = split_product(&trader.product, &separator) else {
            continue;
        };
        let (product_a, product_b) = (product_a.to_string(), product_b.to_string());

        let unit_a = config.canonical_unit(&product_a);
        let unit_b = config.canonical_unit(&product_b);
        let ratio = config.conversion_ratio(&product_a);
        let required_a_qty = convert(trader.quantity, trader.unit, unit_a, ratio);
        let required_b_qty = convert(required_a_qty, unit_a, unit_b, ratio);

        let side_a = match side_convention {
            SideConvention::SameSide => trader.side,
            SideConvention::FlippedSide => trader.side.opposite(),
        };
        let side_b = side_a.opposite();

        let mut a_ids: Vec<TradeId> = pool
            .exchange_trades()
            .filter(|e| {
                e.product == product_a
                    && e.side == side_a
                    && e.contract_month == trader.contract_month
                    && convert(e.quantity, e.unit, unit_a, ratio) == required_a_qty
                    && universal_fields_match(&trader, e, &config.universal_matching_fields)
            })
            .map(|e| e.internal_trade_id.clone())
            .collect();
        a_ids.sort();

        let mut found: Option<(TradeId, TradeId)> = None;
        'search: for a_id in &a_ids {
            let Some(leg_a) = pool.exchange(a_id).cloned() else { continue };

            let mut b_ids: Vec<TradeId> = pool
                .exchange_trades()
                .filter(|e| {
                    e.internal_trade_id != *a_id
                        && e.product == product_b
                        && e.side == side_b
                        && e.contract_month == trader.contract_month
                        && convert(e.quantity, e.unit, unit_b, ratio) == required_b_qty
                        && universal_fields_match(&trader, e, &config.universal_matching_fields)
                })
                .map(|e| e.internal_trade_id.clone())
                .collect();
            b_ids.sort();

            for b_id in b_ids {
                let Some(leg_b) = pool.exchange(&b_id) else { continue };
                let identity_gap = (trader.price - (leg_a.price - leg_b.price)).abs();
                if identity_gap <= tolerance {
                    found = Some((a_id.clone(), b_id));
                    break 'search;
                }
            }
        }

        let Some((a_id, b_id)) = found else {
            continue;
        };

        if !pool.commit(std::slice::from_ref(&trader_id), &[a_id.clone(), b_id.clone()], rule_number)? {
            continue;
        }

        results.push(MatchResult {
            match_id: MatchId::generate(family.tag(), rule_number),
            rule_number,
            confidence,
            primary_trader_trade: trader_id,
            primary_exchange_trade: a_id,
            additional_trader_trades: Vec::new(),
            additional_exchange_trades: vec![b_id],
            matched_fields: matched_fields.clone(),
            status: MatchStatus::Matched,
        });
    }

    Ok(results)
}
