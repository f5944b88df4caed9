//! `route_and_reconcile`: group a trade book by `exchange_group_id`, look
//! each group up in `config.exchange_group_mapping`, and run one
//! `reconengine_core::reconcile` per resulting partition.

use std::collections::HashMap;

use tracing::warn;

use reconengine_core::{reconcile, Partition, ReconcileResult};
use reconengine_types::{Family, ReconConfig, Result, Trade};

/// The two independently produced trade lists a host hands the router —
/// not yet split by exchange group.
#[derive(Debug, Clone, Default)]
pub struct TradeBook {
    pub trader_trades: Vec<Trade>,
    pub exchange_trades: Vec<Trade>,
}

/// One group's reconciliation outcome, tagged with the family it was run
/// under.
#[derive(Debug, Clone)]
pub struct PartitionResult {
    pub family: Family,
    pub result: ReconcileResult,
}

/// All groups the router could resolve and reconcile, keyed by
/// `exchange_group_id`.
#[derive(Debug, Clone, Default)]
pub struct RoutedResult {
    pub partitions: HashMap<i64, PartitionResult>,
}

/// Split `book` into partitions by `exchange_group_id`, resolve each group
/// to a family via `config.exchange_group_mapping`, and reconcile each one.
///
/// A trade with no `exchange_group_id`, or one absent from the mapping, is
/// excluded from every partition and logged at `warn` rather than failing
/// the whole run.
pub fn route_and_reconcile(book: &TradeBook, config: &ReconConfig) -> Result<RoutedResult> {
    let mut trader_groups: HashMap<i64, Vec<Trade>> = HashMap::new();
    for t in &book.trader_trades {
        match t.exchange_group_id {
            Some(group_id) => trader_groups.entry(group_id).or_default().push(t.clone()),
            None => warn!(trade_id = %t.internal_trade_id, "trader trade has no exchange_group_id, dropping from routing"),
        }
    }

    let mut exchange_groups: HashMap<i64, Vec<Trade>> = HashMap::new();
    for t in &book.exchange_trades {
        match t.exchange_group_id {
            Some(group_id) => exchange_groups.entry(group_id).or_default().push(t.clone()),
            None => warn!(trade_id = %t.internal_trade_id, "exchange trade has no exchange_group_id, dropping from routing"),
        }
    }

    let mut group_ids: Vec<i64> = trader_groups.keys().chain(exchange_groups.keys()).copied().collect();
    group_ids.sort_unstable();
    group_ids.dedup();

    let mut partitions = HashMap::new();

    for group_id in group_ids {
        let Some(&family) = config.exchange_group_mapping.get(&group_id) else {
            warn!(group_id, "exchange_group_id not present in exchange_group_mapping, dropping group");
            continue;
        };

        let partition = Partition::new(
            trader_groups.remove(&group_id).unwrap_or_default(),
            exchange_groups.remove(&group_id).unwrap_or_default(),
        );

        let result = reconcile(&partition, config, family)?;
        partitions.insert(group_id, PartitionResult { family, result });
    }

    Ok(RoutedResult { partitions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconengine_types::{MonYY, Side, Source, Trade, Unit};
    use rust_decimal::Decimal;

    fn trade(id: &str, source: Source, group: Option<i64>) -> Trade {
        let mut t = Trade::dummy(id, source, "380cst", MonYY::new(2025, 7), Decimal::TEN, Unit::Mt, Decimal::new(500, 0), Side::Buy);
        t.exchange_group_id = group;
        t
    }

    #[test]
    fn routes_matching_groups_to_the_mapped_family() {
        let mut cfg = ReconConfig::test_default();
        cfg.exchange_group_mapping.insert(1, Family::Ice);

        let book = TradeBook {
            trader_trades: vec![trade("T1", Source::Trader, Some(1))],
            exchange_trades: vec![trade("E1", Source::Exchange, Some(1))],
        };

        let routed = route_and_reconcile(&book, &cfg).unwrap();
        assert_eq!(routed.partitions.len(), 1);
        let partition = &routed.partitions[&1];
        assert_eq!(partition.family, Family::Ice);
        assert_eq!(partition.result.matches.len(), 1);
    }

    #[test]
    fn unmapped_group_is_dropped_not_errored() {
        let cfg = ReconConfig::test_default();
        let book = TradeBook {
            trader_trades: vec![trade("T1", Source::Trader, Some(99))],
            exchange_trades: vec![],
        };

        let routed = route_and_reconcile(&book, &cfg).unwrap();
        assert!(routed.partitions.is_empty());
    }

    #[test]
    fn trade_without_a_group_id_is_dropped() {
        let mut cfg = ReconConfig::test_default();
        cfg.exchange_group_mapping.insert(1, Family::Ice);

        let book = TradeBook {
            trader_trades: vec![trade("T1", Source::Trader, None)],
            exchange_trades: vec![],
        };

        let routed = route_and_reconcile(&book, &cfg).unwrap();
        assert!(routed.partitions.is_empty());
    }
}
