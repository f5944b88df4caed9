//! Rules 7, 8, 10, 12 (ICE): aggregated variants — the N:M lift of a
//! pairwise rule's own category and fields, for the case where neither
//! side alone accounts for the full quantity but the whole cluster of
//! trades sharing that category, price, and side does.
//!
//! Unlike Rule 6 (aggregation), which searches for a *subset* of trader
//! trades exactly covering one exchange trade, these variants operate on
//! clusters that may be split on both sides: the entire cluster of
//! candidate trades sharing the grouping key either totals out exactly on
//! both sides or it doesn't — no subset search is performed within a
//! cluster, since the rule's category filter (crack, spread, product
//! spread) already narrows membership tightly enough that ambiguous
//! partial overlaps are not expected in practice. Clusters larger than
//! `ReconConfig::rule6_subset_cap` on either side are skipped with a
//! warning rather than committed, reusing the same cap Rule 6 uses.
//!
//! | Rule | Lifts                | Category                 | Clusters by month |
//! |------|-----------------------|--------------------------|--------------------|
//! | 7    | Rule 3 (crack)        | `Trade::is_crack`        | yes                |
//! | 8    | Rule 2 (spread)       | `spread_flag.is_some`    | no                 |
//! | 10   | Rule 11 (crack roll)  | `Trade::is_crack`        | no                 |
//! | 12   | Rule 5 (product spread) | `is_product_spread`    | no                 |
//!
//! Rules 7 and 10 lift the base-and-hub structure of [`crate::rules::crack`]
//! directly: trader crack quantity, exchange base quantity, and exchange
//! hub quantity (all converted to their respective canonical units with the
//! base product's ratio) must each sum to the same covered amount. Rules 8
//! and 12 are simpler symmetric lifts — both rules 2 and 5 already net two
//! legs of equal magnitude against each other, so the N:M cluster-total
//! check alone (without pairing up individual quads) is a faithful
//! generalization.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::warn;

use reconengine_types::{Family, MatchId, MatchResult, MatchStatus, MonYY, ReconConfig, Result, Side, SideConvention, Trade, TradeId};

use crate::pool::UnmatchedPool;
use crate::rules::universal::{universal_fields_match, universal_matched_field_names};
use crate::unit::convert;

pub const AGGREGATED_CRACK_RULE_NUMBER: u32 = 7;
pub const AGGREGATED_SPREAD_RULE_NUMBER: u32 = 8;
pub const AGGREGATED_CRACK_ROLL_RULE_NUMBER: u32 = 10;
pub const AGGREGATED_PRODUCT_SPREAD_RULE_NUMBER: u32 = 12;

/// Grouping key shared by every trade in a candidate cluster: product,
/// contract month (only when `cluster_by_month` is set), price, and the
/// trader-facing canonical side (an exchange trade with a flipped
/// convention is keyed by its *opposite* side so it lands in the same
/// bucket as the trader trades it should match).
type ClusterKey = (String, Option<MonYY>, Decimal, Side);

fn cluster_key(trade: &Trade, canonical_side: Side, cluster_by_month: bool) -> ClusterKey {
    (
        trade.product.clone(),
        cluster_by_month.then_some(trade.contract_month),
        trade.price,
        canonical_side,
    )
}

/// Run one symmetric aggregated-variant rule pass (rules 8 and 12).
pub fn find_aggregated_variant(
    pool: &mut UnmatchedPool,
    config: &ReconConfig,
    family: Family,
    rule_number: u32,
    rule_fields: &[&str],
    cluster_by_month: bool,
    candidate: impl Fn(&Trade) -> bool,
) -> Result<Vec<MatchResult>> {
    let side_convention = config.family_settings(family).side_convention;
    let confidence = config.confidence_for(rule_number);
    let cap = config.rule6_subset_cap;

    let matched_fields: Vec<String> = rule_fields
        .iter()
        .map(ToString::to_string)
        .chain(universal_matched_field_names(&config.universal_matching_fields))
        .collect();

    let mut trader_clusters: HashMap<ClusterKey, Vec<TradeId>> = HashMap::new();
    for t in pool.trader_trades().filter(|t| candidate(t)) {
        trader_clusters
            .entry(cluster_key(t, t.side, cluster_by_month))
            .or_default()
            .push(t.internal_trade_id.clone());
    }

    let mut exchange_clusters: HashMap<ClusterKey, Vec<TradeId>> = HashMap::new();
    for e in pool.exchange_trades().filter(|t| candidate(t)) {
        let canonical_side = match side_convention {
            SideConvention::SameSide => e.side,
            SideConvention::FlippedSide => e.side.opposite(),
        };
        exchange_clusters
            .entry(cluster_key(e, canonical_side, cluster_by_month))
            .or_default()
            .push(e.internal_trade_id.clone());
    }

    let mut keys: Vec<ClusterKey> = trader_clusters.keys().cloned().collect();
    keys.sort();

    let mut results = Vec::new();

    for key in keys {
        let Some(exchange_ids) = exchange_clusters.get(&key) else {
            continue;
        };
        let mut trader_ids = trader_clusters[&key].clone();
        let mut exchange_ids = exchange_ids.clone();
        trader_ids.sort();
        exchange_ids.sort();

        if trader_ids.len() + exchange_ids.len() < 3 {
            // Not really an aggregation: a single trade on each side is Rule 3/2/5's job.
            continue;
        }

        if trader_ids.len() > cap || exchange_ids.len() > cap {
            warn!(
                rule_number,
                trader_legs = trader_ids.len(),
                exchange_legs = exchange_ids.len(),
                cap,
                "aggregated variant cluster exceeds subset-search cap, skipping"
            );
            continue;
        }

        if !universal_fields_match_all(pool, &trader_ids, &exchange_ids, &config.universal_matching_fields) {
            continue;
        }

        let trader_total: Decimal = trader_ids.iter().filter_map(|id| pool.trader(id)).map(|t| t.quantity).sum();
        let exchange_total: Decimal = exchange_ids.iter().filter_map(|id| pool.exchange(id)).map(|t| t.quantity).sum();

        if trader_total != exchange_total {
            continue;
        }

        if !pool.commit(&trader_ids, &exchange_ids, rule_number)? {
            continue;
        }

        let mut trader_iter = trader_ids.into_iter();
        let mut exchange_iter = exchange_ids.into_iter();
        let primary_trader = trader_iter.next().expect("cluster non-empty");
        let primary_exchange = exchange_iter.next().expect("cluster non-empty");

        results.push(MatchResult {
            match_id: MatchId::generate(family.tag(), rule_number),
            rule_number,
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

fn universal_fields_match_all(pool: &UnmatchedPool, trader_ids: &[TradeId], exchange_ids: &[TradeId], fields: &[String]) -> bool {
    let Some(first_trader) = trader_ids.first().and_then(|id| pool.trader(id)) else {
        return false;
    };
    trader_ids
        .iter()
        .filter_map(|id| pool.trader(id))
        .chain(exchange_ids.iter().filter_map(|id| pool.exchange(id)))
        .all(|t| universal_fields_match(first_trader, t, fields))
}

/// Base-and-hub cluster key: base product name, contract month (only when
/// `cluster_by_month`), and canonical side (trader-facing).
type CrackClusterKey = (String, Option<MonYY>, Side);

/// Shared walk for Rules 7 and 10: cluster trader crack trades by base
/// product (and month, for Rule 7), then require the exchange base-leg
/// cluster and exchange hub-leg cluster (same base product's ratio,
/// opposite canonical side) to sum to the same covered quantity.
fn find_aggregated_crack_variant(
    pool: &mut UnmatchedPool,
    config: &ReconConfig,
    family: Family,
    rule_number: u32,
    cluster_by_month: bool,
) -> Result<Vec<MatchResult>> {
    let settings = config.family_settings(family);
    let hub_product = settings.crack_hub_product.clone();
    let side_convention = settings.side_convention;
    let confidence = config.confidence_for(rule_number);
    let cap = config.rule6_subset_cap;

    let matched_fields: Vec<String> = ["product", "contract_month", "price", "side", "quantity_sum"]
        .iter()
        .map(ToString::to_string)
        .chain(universal_matched_field_names(&config.universal_matching_fields))
        .collect();

    let mut trader_clusters: HashMap<CrackClusterKey, Vec<TradeId>> = HashMap::new();
    for t in pool.trader_trades().filter(|t| t.is_crack()) {
        let Some(base_product) = t.crack_base_product().map(str::to_string) else {
            continue;
        };
        trader_clusters
            .entry((base_product, cluster_by_month.then_some(t.contract_month), t.side))
            .or_default()
            .push(t.internal_trade_id.clone());
    }

    let mut keys: Vec<CrackClusterKey> = trader_clusters.keys().cloned().collect();
    keys.sort();

    let mut results = Vec::new();

    for (base_product, month, crack_side) in keys {
        let mut trader_ids = trader_clusters[&(base_product.clone(), month, crack_side)].clone();
        trader_ids.sort();

        let base_unit = config.canonical_unit(&base_product);
        let hub_unit = config.canonical_unit(&hub_product);
        let ratio = config.conversion_ratio(&base_product);

        let required_total: Decimal = trader_ids
            .iter()
            .filter_map(|id| pool.trader(id))
            .map(|t| convert(t.quantity, t.unit, base_unit, ratio))
            .sum();

        let base_side = match side_convention {
            SideConvention::SameSide => crack_side,
            SideConvention::FlippedSide => crack_side.opposite(),
        };
        let hub_side = base_side.opposite();

        let mut base_ids: Vec<TradeId> = pool
            .exchange_trades()
            .filter(|e| e.product == base_product && e.side == base_side && (!cluster_by_month || month.is_none_or(|m| e.contract_month == m)))
            .map(|e| e.internal_trade_id.clone())
            .collect();
        base_ids.sort();

        let mut hub_ids: Vec<TradeId> = pool
            .exchange_trades()
            .filter(|e| e.product == hub_product && e.side == hub_side && (!cluster_by_month || month.is_none_or(|m| e.contract_month == m)))
            .map(|e| e.internal_trade_id.clone())
            .collect();
        hub_ids.sort();

        if trader_ids.len() + base_ids.len() + hub_ids.len() < 3 || base_ids.is_empty() || hub_ids.is_empty() {
            continue;
        }

        if trader_ids.len() > cap || base_ids.len() > cap || hub_ids.len() > cap {
            warn!(rule_number, base_legs = base_ids.len(), hub_legs = hub_ids.len(), cap, "aggregated crack cluster exceeds subset-search cap, skipping");
            continue;
        }

        let base_total: Decimal = base_ids.iter().filter_map(|id| pool.exchange(id)).map(|e| convert(e.quantity, e.unit, base_unit, ratio)).sum();
        let hub_total: Decimal = hub_ids.iter().filter_map(|id| pool.exchange(id)).map(|e| convert(e.quantity, e.unit, hub_unit, ratio)).sum();
        let required_hub_total = convert(required_total, base_unit, hub_unit, ratio);

        if base_total != required_total || hub_total != required_hub_total {
            continue;
        }

        let mut exchange_ids = base_ids;
        exchange_ids.extend(hub_ids);

        if !universal_fields_match_all(pool, &trader_ids, &exchange_ids, &config.universal_matching_fields) {
            continue;
        }

        if !pool.commit(&trader_ids, &exchange_ids, rule_number)? {
            continue;
        }

        let mut trader_iter = trader_ids.into_iter();
        let mut exchange_iter = exchange_ids.into_iter();
        let primary_trader = trader_iter.next().expect("cluster non-empty");
        let primary_exchange = exchange_iter.next().expect("cluster non-empty");

        results.push(MatchResult {
            match_id: MatchId::generate(family.tag(), rule_number),
            rule_number,
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

pub fn find_aggregated_crack(pool: &mut UnmatchedPool, config: &ReconConfig, family: Family) -> Result<Vec<MatchResult>> {
    find_aggregated_crack_variant(pool, config, family, AGGREGATED_CRACK_RULE_NUMBER, true)
}

pub fn find_aggregated_crack_roll(pool: &mut UnmatchedPool, config: &ReconConfig, family: Family) -> Result<Vec<MatchResult>> {
    find_aggregated_crack_variant(pool, config, family, AGGREGATED_CRACK_ROLL_RULE_NUMBER, false)
}

pub fn find_aggregated_spread(pool: &mut UnmatchedPool, config: &ReconConfig, family: Family) -> Result<Vec<MatchResult>> {
    find_aggregated_variant(
        pool,
        config,
        family,
        AGGREGATED_SPREAD_RULE_NUMBER,
        &["product", "price", "side", "spread_flag", "quantity_sum"],
        false,
        |t| t.spread_flag.is_some(),
    )
}

pub fn find_aggregated_product_spread(pool: &mut UnmatchedPool, config: &ReconConfig, family: Family) -> Result<Vec<MatchResult>> {
    let separator = config.family_settings(family).spread_separator.clone();
    find_aggregated_variant(
        pool,
        config,
        family,
        AGGREGATED_PRODUCT_SPREAD_RULE_NUMBER,
        &["product", "price", "side", "quantity_sum"],
        false,
        move |t| t.is_product_spread(&separator),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconengine_types::{MonYY, Side, Source, Unit};

    fn crack(id: &str, source: Source, qty: Decimal) -> Trade {
        Trade::dummy(id, source, "380cst crack", MonYY::new(2025, 8), qty, Unit::Mt, Decimal::new(-80, 0), Side::Buy)
    }

    #[test]
    fn aggregated_crack_sums_across_trader_base_and_hub_legs() {
        let cfg = ReconConfig::test_default();
        let traders = vec![crack("T1", Source::Trader, Decimal::new(6, 0)), crack("T2", Source::Trader, Decimal::new(4, 0))];
        let base = Trade::dummy("E1", Source::Exchange, "380cst", MonYY::new(2025, 8), Decimal::TEN, Unit::Mt, Decimal::new(420, 0), Side::Buy);
        let hub = Trade::dummy("E2", Source::Exchange, "brent swap", MonYY::new(2025, 8), Decimal::new(70, 0), Unit::Bbl, Decimal::new(500, 0), Side::Sell);
        let mut pool = UnmatchedPool::new(traders, vec![base, hub]);

        let results = find_aggregated_crack(&mut pool, &cfg, Family::Ice).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rule_number, 7);
        assert_eq!(pool.trader_count(), 0);
        assert_eq!(pool.exchange_count(), 0);
    }

    #[test]
    fn mismatched_hub_total_is_left_unmatched() {
        let cfg = ReconConfig::test_default();
        let traders = vec![crack("T1", Source::Trader, Decimal::new(6, 0)), crack("T2", Source::Trader, Decimal::new(4, 0))];
        let base = Trade::dummy("E1", Source::Exchange, "380cst", MonYY::new(2025, 8), Decimal::TEN, Unit::Mt, Decimal::new(420, 0), Side::Buy);
        let hub = Trade::dummy("E2", Source::Exchange, "brent swap", MonYY::new(2025, 8), Decimal::new(50, 0), Unit::Bbl, Decimal::new(500, 0), Side::Sell);
        let mut pool = UnmatchedPool::new(traders, vec![base, hub]);

        let results = find_aggregated_crack(&mut pool, &cfg, Family::Ice).unwrap();
        assert!(results.is_empty());
    }
}
