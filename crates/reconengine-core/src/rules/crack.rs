//! Rule 3 (ICE): crack match.
//!
//! A trader trade on `"<base> crack"` nets out to two exchange legs: one on
//! `<base>` itself and one on the family's configured `crack_hub_product`
//! (e.g. `"brent swap"`), same contract month as the crack trade. Unlike
//! the pairwise rules in [`crate::rules::pairwise`], this is a 1:2 match —
//! one trader id against exactly two exchange ids — so it walks the pool
//! directly rather than going through `find_pairwise_matches`.

use rust_decimal::Decimal;

use reconengine_types::{Family, MatchId, MatchResult, MatchStatus, ReconConfig, Result, TradeId};

use crate::pool::UnmatchedPool;
use crate::rules::universal::{universal_fields_match, universal_matched_field_names};
use crate::unit::convert;

pub const RULE_NUMBER: u32 = 3;

pub fn find(pool: &mut UnmatchedPool, config: &ReconConfig, family: Family) -> Result<Vec<MatchResult>> {
    find_crack_variant(pool, config, family, RULE_NUMBER, true, Decimal::ZERO)
}

/// Shared crack-matching walk used by Rule 3 (strict) and Rule 4 (complex
/// crack, `same_month = false`, nonzero `price_tolerance`, see
/// [`crate::rules::complex_crack`]).
///
/// For each candidate trader crack trade (ascending id order), looks for an
/// available exchange base leg and an available exchange hub leg such that:
/// - `side(base)` agrees with the crack trade's side under the family's
///   configured side convention (direct for `SameSide`, flipped for
///   `FlippedSide`), and `side(hub)` is the opposite of `side(base)`
/// - both legs' quantities, converted to their respective canonical units
///   using the *base product's* conversion ratio, equal the crack trade's
///   quantity (in the base unit) and its hub-unit equivalent
/// - `price(crack) - (price(base) - price(hub))` is within `price_tolerance`
/// - when `same_month` is set, both legs share the crack trade's contract
///   month; otherwise each leg's month is unconstrained (Rule 4's roll)
pub(crate) fn find_crack_variant(
    pool: &mut UnmatchedPool,
    config: &ReconConfig,
    family: Family,
    rule_number: u32,
    same_month: bool,
    price_tolerance: Decimal,
) -> Result<Vec<MatchResult>> {
    let settings = config.family_settings(family);
    let hub_product = settings.crack_hub_product.clone();
    let side_convention = settings.side_convention;
    let confidence = config.confidence_for(rule_number);

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
                    && (!same_month || e.contract_month == trader.contract_month)
                    && convert(e.quantity, e.unit, base_unit, ratio) == required_base_qty
                    && universal_fields_match(&trader, e, &config.universal_matching_fields)
            })
            .map(|e| e.internal_trade_id.clone())
            .collect();
        base_ids.sort();

        let mut found: Option<(TradeId, TradeId)> = None;
        'search: for base_id in &base_ids {
            let Some(base) = pool.exchange(base_id).cloned() else {
                continue;
            };

            let mut hub_ids: Vec<TradeId> = pool
                .exchange_trades()
                .filter(|e| {
                    e.internal_trade_id != *base_id
                        && e.product == hub_product
                        && e.side == hub_side
                        && (!same_month || e.contract_month == trader.contract_month)
                        && convert(e.quantity, e.unit, hub_unit, ratio) == required_hub_qty
                        && universal_fields_match(&trader, e, &config.universal_matching_fields)
                })
                .map(|e| e.internal_trade_id.clone())
                .collect();
            hub_ids.sort();

            for hub_id in hub_ids {
                let Some(hub) = pool.exchange(&hub_id) else { continue };
                let identity_gap = (trader.price - (base.price - hub.price)).abs();
                if identity_gap <= price_tolerance {
                    found = Some((base_id.clone(), hub_id));
                    break 'search;
                }
            }
        }

        let Some((base_id, hub_id)) = found else {
            continue;
        };

        if !pool.commit(std::slice::from_ref(&trader_id), &[base_id.clone(), hub_id.clone()], rule_number)? {
            continue;
        }

        results.push(MatchResult {
            match_id: MatchId::generate(family.tag(), rule_number),
            rule_number,
            confidence,
            primary_trader_trade: trader_id,
            primary_exchange_trade: base_id,
            additional_trader_trades: Vec::new(),
            additional_exchange_trades: vec![hub_id],
            matched_fields: matched_fields.clone(),
            status: MatchStatus::Matched,
        });
    }

    Ok(results)
}
