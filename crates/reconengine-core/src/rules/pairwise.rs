//! Shared 1:1 matching engine underlying every exact-style pairwise rule.
//!
//! The template: build a [`SignatureIndex`] of the candidate exchange
//! trades keyed by `signature_key`, walk the candidate trader trades in a
//! deterministic order, look up only the bucket sharing the trader's own
//! key, take the first still-available exchange trade in that bucket whose
//! finer-grained fields match, commit both. Narrowing to the matching
//! bucket before the `pair_matches`/universal/side checks is what turns the
//! naive `O(N*M)` pairwise scan into `O(N+M)`: each trader trade only ever
//! inspects the (typically small) set of exchange trades sharing its
//! signature key, never the full candidate list.
//!
//! Rules whose matching isn't bucketable this way (a price tolerance, a
//! roll across adjacent months) walk the pool directly instead — see
//! [`crate::rules::crack`] and [`crate::rules::product_spread`].

use reconengine_types::{Family, MatchId, MatchResult, MatchStatus, ReconConfig, Result, Trade, TradeId};

use crate::pool::UnmatchedPool;
use crate::rules::universal::{universal_fields_match, universal_matched_field_names};
use crate::signature::SignatureIndex;

/// Run one pairwise rule pass over the pool.
///
/// `candidate` narrows the pool to the trades this rule is even allowed to
/// look at; `signature_key` projects a trade onto the coarse key candidates
/// are bucketed by (e.g. product/month/quantity/price for an exact match);
/// `pair_matches` decides whether a specific trader/exchange pair within the
/// same bucket satisfies the rule's own fields. Universal fields are always
/// required regardless of `pair_matches` — every rule requires the
/// configured universal fields to agree.
///
/// Candidates are walked in ascending `internal_trade_id` order on both
/// sides, and the first available match within the trader's bucket wins.
pub fn find_pairwise_matches<K: Eq + std::hash::Hash + Clone>(
    pool: &mut UnmatchedPool,
    config: &ReconConfig,
    family: Family,
    rule_number: u32,
    rule_fields: &[&str],
    candidate: impl Fn(&Trade) -> bool,
    signature_key: impl Fn(&Trade) -> K,
    pair_matches: impl Fn(&Trade, &Trade) -> bool,
) -> Result<Vec<MatchResult>> {
    let side_convention = config.family_settings(family).side_convention;
    let confidence = config.confidence_for(rule_number);

    let mut exchange_candidates: Vec<Trade> = pool.exchange_trades().filter(|t| candidate(t)).cloned().collect();
    exchange_candidates.sort_by(|a, b| a.internal_trade_id.cmp(&b.internal_trade_id));
    let index = SignatureIndex::<K>::build(&exchange_candidates, &signature_key);

    let mut trader_ids: Vec<TradeId> = pool
        .trader_trades()
        .filter(|t| candidate(t))
        .map(|t| t.internal_trade_id.clone())
        .collect();
    trader_ids.sort();

    let matched_fields: Vec<String> = rule_fields
        .iter()
        .map(ToString::to_string)
        .chain(universal_matched_field_names(&config.universal_matching_fields))
        .collect();

    let mut results = Vec::new();

    for trader_id in trader_ids {
        let Some(trader) = pool.trader(&trader_id).cloned() else {
            continue;
        };

        let bucket = index.get(&signature_key(&trader));
        let found = bucket.iter().find(|exchange_id| {
            pool.exchange(exchange_id).is_some_and(|exchange| {
                pair_matches(&trader, exchange)
                    && universal_fields_match(&trader, exchange, &config.universal_matching_fields)
                    && side_matches(&trader, exchange, side_convention)
            })
        });

        let Some(exchange_id) = found else {
            continue;
        };

        if !pool.commit(std::slice::from_ref(&trader_id), std::slice::from_ref(exchange_id), rule_number)? {
            continue;
        }

        results.push(MatchResult {
            match_id: MatchId::generate(family.tag(), rule_number),
            rule_number,
            confidence,
            primary_trader_trade: trader_id,
            primary_exchange_trade: exchange_id.clone(),
            additional_trader_trades: Vec::new(),
            additional_exchange_trades: Vec::new(),
            matched_fields: matched_fields.clone(),
            status: MatchStatus::Matched,
        });
    }

    Ok(results)
}

/// `true` if `trader`'s side agrees with `exchange`'s side under the
/// family's configured convention: directly equal for `SameSide`
/// (ICE/CME), equal to the *opposite* for `FlippedSide` (SGX/EEX).
#[must_use]
pub fn side_matches(trader: &Trade, exchange: &Trade, convention: reconengine_types::SideConvention) -> bool {
    match convention {
        reconengine_types::SideConvention::SameSide => trader.side == exchange.side,
        reconengine_types::SideConvention::FlippedSide => trader.side == exchange.side.opposite(),
    }
}

/// Exact-signature equality on product, contract month, quantity, and
/// price — the fields every pairwise rule shares beyond side and universal
/// fields.
#[must_use]
pub fn exact_signature_matches(a: &Trade, b: &Trade) -> bool {
    a.product == b.product && a.contract_month == b.contract_month && a.quantity == b.quantity && a.price == b.price
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconengine_types::{MonYY, Side, Source, Unit};
    use rust_decimal::Decimal;

    fn trade(id: &str, source: Source, side: Side) -> Trade {
        Trade::dummy(
            id,
            source,
            "380cst",
            MonYY::new(2025, 7),
            Decimal::TEN,
            Unit::Mt,
            Decimal::new(500, 0),
            side,
        )
    }

    #[test]
    fn exact_rule_matches_same_side_for_ice() {
        let cfg = ReconConfig::test_default();
        let t = trade("T1", Source::Trader, Side::Buy);
        let e = trade("E1", Source::Exchange, Side::Buy);
        let mut pool = UnmatchedPool::new(vec![t], vec![e]);

        let results = find_pairwise_matches(
            &mut pool,
            &cfg,
            Family::Ice,
            1,
            &["product", "contract_month", "quantity", "price", "side"],
            |_| true,
            |t| (t.product.clone(), t.contract_month, t.quantity, t.price),
            exact_signature_matches,
        )
        .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rule_number, 1);
        assert_eq!(results[0].confidence, 100);
        assert!(!pool.is_trader_available(&TradeId::new("T1")));
    }

    #[test]
    fn sgx_flips_side_for_exact_match() {
        let cfg = ReconConfig::test_default();
        let t = trade("T1", Source::Trader, Side::Buy);
        let e = trade("E1", Source::Exchange, Side::Sell);
        let mut pool = UnmatchedPool::new(vec![t], vec![e]);

        let results = find_pairwise_matches(
            &mut pool,
            &cfg,
            Family::Sgx,
            1,
            &["product", "contract_month", "quantity", "price", "side"],
            |_| true,
            |t| (t.product.clone(), t.contract_month, t.quantity, t.price),
            exact_signature_matches,
        )
        .unwrap();

        assert_eq!(results.len(), 1);
    }

    #[test]
    fn non_matching_price_is_left_unmatched() {
        let cfg = ReconConfig::test_default();
        let t = trade("T1", Source::Trader, Side::Buy);
        let mut e = trade("E1", Source::Exchange, Side::Buy);
        e.price = Decimal::new(600, 0);
        let mut pool = UnmatchedPool::new(vec![t], vec![e]);

        let results = find_pairwise_matches(
            &mut pool,
            &cfg,
            Family::Ice,
            1,
            &["product", "contract_month", "quantity", "price", "side"],
            |_| true,
            |t| (t.product.clone(), t.contract_month, t.quantity, t.price),
            exact_signature_matches,
        )
        .unwrap();

        assert!(results.is_empty());
        assert!(pool.is_trader_available(&TradeId::new("T1")));
    }
}
