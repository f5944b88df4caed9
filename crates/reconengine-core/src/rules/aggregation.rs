//! Rule 6 (ICE): aggregation — N trader trades summing to one exchange
//! trade.
//!
//! For each exchange trade, the candidate trader trades sharing its
//! product, contract month, price, and side (under the family's
//! convention) are searched for a subset whose quantities sum exactly to
//! the exchange quantity. The search space is exponential in the candidate
//! count, so it is bounded by `ReconConfig::rule6_subset_cap` — candidates
//! beyond the cap, taken in ascending `internal_trade_id` order, are not
//! considered for that exchange trade and are left for a later rule or the
//! terminal unmatched sweep.

use rust_decimal::Decimal;
use tracing::warn;

use reconengine_types::{Family, MatchId, MatchResult, MatchStatus, ReconConfig, Result, TradeId};

use crate::pool::UnmatchedPool;
use crate::rules::pairwise::side_matches;
use crate::rules::universal::{universal_fields_match, universal_matched_field_names};

pub const RULE_NUMBER: u32 = 6;

pub fn find(pool: &mut UnmatchedPool, config: &ReconConfig, family: Family) -> Result<Vec<MatchResult>> {
    let side_convention = config.family_settings(family).side_convention;
    let confidence = config.confidence_for(RULE_NUMBER);
    let cap = config.rule6_subset_cap;

    let mut exchange_ids: Vec<TradeId> = pool.exchange_trades().map(|t| t.internal_trade_id.clone()).collect();
    exchange_ids.sort();

    let matched_fields: Vec<String> = ["product", "contract_month", "price", "side", "quantity_sum"]
        .iter()
        .map(ToString::to_string)
        .chain(universal_matched_field_names(&config.universal_matching_fields))
        .collect();

    let mut results = Vec::new();

    for exchange_id in exchange_ids {
        let Some(exchange) = pool.exchange(&exchange_id).cloned() else {
            continue;
        };

        let mut candidate_ids: Vec<TradeId> = pool
            .trader_trades()
            .filter(|t| {
                t.product == exchange.product
                    && t.contract_month == exchange.contract_month
                    && t.price == exchange.price
                    && side_matches(t, &exchange, side_convention)
                    && universal_fields_match(t, &exchange, &config.universal_matching_fields)
            })
            .map(|t| t.internal_trade_id.clone())
            .collect();
        candidate_ids.sort();

        if candidate_ids.len() < 2 {
            continue;
        }

        if candidate_ids.len() > cap {
            warn!(
                exchange_trade = %exchange_id,
                candidates = candidate_ids.len(),
                cap,
                "rule 6 aggregation candidates exceed subset-search cap, truncating"
            );
            candidate_ids.truncate(cap);
        }

        let quantities: Vec<Decimal> = candidate_ids
            .iter()
            .map(|id| pool.trader(id).map(|t| t.quantity).unwrap_or_default())
            .collect();

        let Some(subset) = find_subset_summing_to(&quantities, exchange.quantity) else {
            continue;
        };
        if subset.len() < 2 {
            continue;
        }

        let chosen: Vec<TradeId> = subset.iter().map(|&i| candidate_ids[i].clone()).collect();

        if !pool.commit(&chosen, std::slice::from_ref(&exchange_id), RULE_NUMBER)? {
            continue;
        }

        let mut chosen_iter = chosen.into_iter();
        let primary = chosen_iter.next().expect("subset has at least 2 elements");

        results.push(MatchResult {
            match_id: MatchId::generate(family.tag(), RULE_NUMBER),
            rule_number: RULE_NUMBER,
            confidence,
            primary_trader_trade: primary,
            primary_exchange_trade: exchange_id,
            additional_trader_trades: chosen_iter.collect(),
            additional_exchange_trades: Vec::new(),
            matched_fields: matched_fields.clone(),
            status: MatchStatus::Matched,
        });
    }

    Ok(results)
}

/// Search for a subset of `quantities` summing exactly to `target`,
/// preferring the smallest subset size and, among same-size subsets, the
/// lexicographically smallest set of indices — `quantities`/`candidate_ids`
/// share the same ascending-id order, so the lexicographically smallest
/// index set is also the lexicographically smallest id set. Returns `None`
/// if no subset of size 2 or more sums exactly.
/// `quantities.len()` is expected to be capped small by the caller so
/// exponential search is acceptable.
fn find_subset_summing_to(quantities: &[Decimal], target: Decimal) -> Option<Vec<usize>> {
    for size in 2..=quantities.len() {
        let mut combo = Vec::with_capacity(size);
        if let Some(found) = search_combo(quantities, target, size, 0, &mut combo) {
            return Some(found);
        }
    }
    None
}

/// Extend `combo` with indices from `[start, quantities.len())`, in
/// ascending order, until it holds `size` indices summing to `target`.
/// Explores combinations in lexicographic order of index, so the first hit
/// is the lexicographically smallest combination of this size.
fn search_combo(quantities: &[Decimal], target: Decimal, size: usize, start: usize, combo: &mut Vec<usize>) -> Option<Vec<usize>> {
    if combo.len() == size {
        let sum: Decimal = combo.iter().map(|&i| quantities[i]).sum();
        return if sum == target { Some(combo.clone()) } else { None };
    }

    let remaining_needed = size - combo.len();
    if quantities.len() < start + remaining_needed {
        return None;
    }

    for i in start..=(quantities.len() - remaining_needed) {
        combo.push(i);
        if let Some(found) = search_combo(quantities, target, size, i + 1, combo) {
            return Some(found);
        }
        combo.pop();
    }

    None
}
