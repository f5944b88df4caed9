//! Rules 4 and 11 (ICE): complex crack and crack roll.
//!
//! Both extend [`crate::rules::crack`]'s base-and-hub match (Rule 3):
//!
//! - Rule 4 (complex crack) permits the base leg and hub leg to each fall
//!   in a month other than the crack trade's own, and tolerates a price
//!   difference within the configured default tolerance rather than
//!   requiring bit-exact identity.
//! - Rule 11 (crack roll) keeps Rule 3's same-month base leg but permits
//!   the hub side to be split across two exchange trades in adjacent
//!   contract months whose quantities sum to the single hub leg Rule 3
//!   would otherwise require — modeling a trader who rolled a crack
//!   position into the next month before the exchange cleared it.

use reconengine_types::{Family, MatchId, MatchResult, MatchStatus, MonYY, ReconConfig, Result, TradeId};

use crate::pool::UnmatchedPool;
use crate::rules::crack::find_crack_variant;
use crate::rules::universal::{universal_fields_match, universal_matched_field_names};
use crate::unit::convert;

pub const COMPLEX_CRACK_RULE_NUMBER: u32 = 4;
pub const CRACK_ROLL_RULE_NUMBER: u32 = 11;

fn months_adjacent(a: MonYY, b: MonYY) -> bool {
    let a_index = i32::from(a.year) * 12 + i32::from(a.month);
    let b_index = i32::from(b.year) * 12 + i32::from(b.month);
    (a_index - b_index).abs() == 1
}

pub fn find_complex_crack(pool: &mut UnmatchedPool, config: &ReconConfig, family: Family) -> Result<Vec<MatchResult>> {
    find_crack_variant(pool, config, family, COMPLEX_CRACK_RULE_NUMBER, false, config.tolerances.tolerance_default)
}

pub fn find_crack_roll(pool: &mut UnmatchedPool, config: &ReconConfig, family: Family) -> Result<Vec<MatchResult>> {
    let settings = config.family_settings(family);
    let hub_product = settings.crack_hub_product.clone();
    let side_convention = settings.side_convention;
    let confidence = config.confidence_for(CRACK_ROLL_RULE_NUMBER);
    let tolerance = config.tolerances.tolerance_default;

    let matched_fields: Vec<String> = ["product", "contract_month", "quantity", "price", "side"]
        .iter()
        .map(ToString::to_string)
        .chain(universal_matched_field_names(&config.universal_matching_fields))
        .collect();

    let mut trader_ids: Vec<TradeId> = pool.trader_trades().filter(|t| t.is_crack()).map(|t| t.internal_trade_id.clone()).collect();
    trader_ids.sort();

    let mut results = Vec::new();

    for trader_id in trader_ids {
        let Some(trader) = pool.trader(&trader_id).cloned() else {
            continue;
        };
        let Some(base_product) = trader.crack_base_product().map(str::to_string) else {
            continue;
        };

        let base_unit = config.canonical_unit(&base_product);
        let hub_unit = config.canonical_unit(&hub_product);
        let ratio = config.conversion_ratio(&base_product);
        let required_base_qty = convert(trader.quantity, trader.unit, base_unit, ratio);
        let required_hub_qty = convert(required_base_qty, base_unit, hub_unit, ratio);

        let base_side = match side_convention {
            reconengine_types::SideConvention::SameSide => trader.side,
            reconengine_types::SideConvention::FlippedSide => trader.side.opposite(),
        };
        let hub_side = base_side.opposite();

        let mut base_ids: Vec<TradeId> = pool
            .exchange_trades()
            .filter(|e| {
                e.product == base_product
                    && e.side == base_side
                    && e.contract_month == trader.contract_month
                    && convert(e.quantity, e.unit, base_unit, ratio) == required_base_qty
                    && universal_fields_match(&trader, e, &config.universal_matching_fields)
            })
            .map(|e| e.internal_trade_id.clone())
            .collect();
        base_ids.sort();

        let mut found: Option<(TradeId, TradeId, TradeId)> = None;
        'search: for base_id in &base_ids {
            let Some(base) = pool.exchange(base_id).cloned() else { continue };

            let mut hub_ids: Vec<TradeId> = pool
                .exchange_trades()
                .filter(|e| {
                    e.internal_trade_id != *base_id
                        && e.product == hub_product
                        && e.side == hub_side
                        && universal_fields_match(&trader, e, &config.universal_matching_fields)
                })
                .map(|e| e.internal_trade_id.clone())
                .collect();
            hub_ids.sort();

            for i in 0..hub_ids.len() {
                for j in (i + 1)..hub_ids.len() {
                    let (front_id, back_id) = (&hub_ids[i], &hub_ids[j]);
                    let Some(front) = pool.exchange(front_id) else { continue };
                    let Some(back) = pool.exchange(back_id) else { continue };
                    if !months_adjacent(front.contract_month, back.contract_month) {
                        continue;
                    }
                    let combined_qty = convert(front.quantity, front.unit, hub_unit, ratio) + convert(back.quantity, back.unit, hub_unit, ratio);
                    if combined_qty != required_hub_qty {
                        continue;
                    }
                    let weighted_hub_price = (front.price * front.quantity + back.price * back.quantity) / (front.quantity + back.quantity);
                    let identity_gap = (trader.price - (base.price - weighted_hub_price)).abs();
                    if identity_gap <= tolerance {
                        found = Some((base_id.clone(), front_id.clone(), back_id.clone()));
                        break 'search;
                    }
                }
            }
        }

        let Some((base_id, front_id, back_id)) = found else {
            continue;
        };

        if !pool.commit(
            std::slice::from_ref(&trader_id),
            &[base_id.clone(), front_id.clone(), back_id.clone()],
            CRACK_ROLL_RULE_NUMBER,
        )? {
            continue;
        }

        results.push(MatchResult {
            match_id: MatchId::generate(family.tag(), CRACK_ROLL_RULE_NUMBER),
            rule_number: CRACK_ROLL_RULE_NUMBER,
            confidence,
            primary_trader_trade: trader_id,
            primary_exchange_trade: base_id,
            additional_trader_trades: Vec::new(),
            additional_exchange_trades: vec![front_id, back_id],
            matched_fields: matched_fields.clone(),
            status: MatchStatus::Matched,
        });
    }

    Ok(results)
}
