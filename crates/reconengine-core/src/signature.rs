//! Hash index from a projected key to the trade ids that share it.
//!
//! One explicit, reusable projection-keyed index so every rule family
//! builds its lookup the same way instead of repeating ad hoc construction.

use std::collections::HashMap;
use std::hash::Hash;

use reconengine_types::TradeId;

/// An index from a projection key `K` to the ids of trades that project to
/// it. Built once per rule pass over one side of the pool; `O(1)` average
/// lookup turns the naive `O(N*M)` pairwise scan into `O(N+M)`.
#[derive(Debug, Default)]
pub struct SignatureIndex<K> {
    buckets: HashMap<K, Vec<TradeId>>,
}

impl<K: Eq + Hash + Clone> SignatureIndex<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }

    /// Build an index by projecting every item in `items` through `key_of`.
    pub fn build<'a, I, T>(items: I, key_of: impl Fn(&T) -> K) -> Self
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let mut index = Self::new();
        for item in items {
            index.insert(key_of(item), trade_id_of(item));
        }
        index
    }

    fn insert(&mut self, key: K, id: TradeId) {
        self.buckets.entry(key).or_default().push(id);
    }

    /// All trade ids sharing `key`, in insertion order, or an empty slice
    /// if none.
    #[must_use]
    pub fn get(&self, key: &K) -> &[TradeId] {
        self.buckets.get(key).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }
}

/// Extracted because `SignatureIndex::build` needs a `TradeId` to pair with
/// every key but is generic over the item type; callers supply items that
/// carry an `internal_trade_id` field by implementing `HasTradeId`.
pub trait HasTradeId {
    fn trade_id(&self) -> TradeId;
}

impl HasTradeId for reconengine_types::Trade {
    fn trade_id(&self) -> TradeId {
        self.internal_trade_id.clone()
    }
}

fn trade_id_of<T: HasTradeId>(item: &T) -> TradeId {
    item.trade_id()
}
