//! Cross-partition statistics: fold every partition's
//! [`reconengine_core::Stats`] into one summary, for a host reporting on a
//! whole routed run rather than a single exchange family.

use reconengine_router::RoutedResult;

/// Totals across every partition a router run produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutedStats {
    pub partitions: usize,
    pub original_trader: usize,
    pub original_exchange: usize,
    pub matched_trader: usize,
    pub matched_exchange: usize,
    pub unmatched_trader: usize,
    pub unmatched_exchange: usize,
}

impl RoutedStats {
    /// Fold every partition's stats into one cross-partition total.
    #[must_use]
    pub fn from_routed(routed: &RoutedResult) -> Self {
        let mut totals = Self {
            partitions: routed.partitions.len(),
            ..Self::default()
        };
        for partition in routed.partitions.values() {
            let s = &partition.result.stats;
            totals.original_trader += s.original_trader;
            totals.original_exchange += s.original_exchange;
            totals.matched_trader += s.matched_trader;
            totals.matched_exchange += s.matched_exchange;
            totals.unmatched_trader += s.unmatched_trader;
            totals.unmatched_exchange += s.unmatched_exchange;
        }
        totals
    }

    /// Weighted overall match rate across every partition, by total trade
    /// count on both sides.
    #[must_use]
    pub fn overall_rate(&self) -> f64 {
        let original = self.original_trader + self.original_exchange;
        if original == 0 {
            return 100.0;
        }
        ((self.matched_trader + self.matched_exchange) as f64 / original as f64) * 100.0
    }
}
