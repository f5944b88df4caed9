//! A partition: one exchange family's trader and exchange trades, the unit
//! of work `reconcile` and `position_analysis` each take one of.
//!
//! Partitioning itself (grouping a whole trade book by `exchange_group_id`)
//! is `reconengine-router`'s job; this type is just the shape it hands to
//! the core, kept here because `reconcile`'s signature names it directly.

use reconengine_types::Trade;

use crate::pool::UnmatchedPool;

/// One family's worth of still-unreconciled trades.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub trader_trades: Vec<Trade>,
    pub exchange_trades: Vec<Trade>,
}

impl Partition {
    #[must_use]
    pub fn new(trader_trades: Vec<Trade>, exchange_trades: Vec<Trade>) -> Self {
        Self {
            trader_trades,
            exchange_trades,
        }
    }

    /// Build the exclusive working pool `reconcile` drives the rule engine
    /// over. Consumes `self` since the pool takes ownership of every trade.
    #[must_use]
    pub(crate) fn into_pool(self) -> UnmatchedPool {
        UnmatchedPool::new(self.trader_trades, self.exchange_trades)
    }
}
