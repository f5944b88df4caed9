//! Canonical contract month representation.

use std::fmt;

use serde::{Deserialize, Serialize};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A canonical contract month, e.g. `Jul25`.
///
/// Ordering is `(year, month)` — the normalizer (out of scope for this
/// crate) is responsible for producing a `MonYY` from whatever raw month
/// token the adapter layer encounters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonYY {
    /// Four-digit year, e.g. `2025`.
    pub year: u16,
    /// Month index, 1-12.
    pub month: u8,
}

impl MonYY {
    /// Construct a `MonYY`. `month` must be in `1..=12`.
    #[must_use]
    pub fn new(year: u16, month: u8) -> Self {
        debug_assert!((1..=12).contains(&month), "month out of range: {month}");
        Self { year, month }
    }
}

impl fmt::Display for MonYY {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abbrev = MONTH_ABBREVIATIONS
            .get((self.month.saturating_sub(1)) as usize)
            .copied()
            .unwrap_or("???");
        write!(f, "{}{:02}", abbrev, self.year % 100)
    }
}
