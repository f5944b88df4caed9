//! System-wide constants for the reconciliation engine.

/// Decimal precision used when comparing quantities after unit conversion.
pub const QUANTITY_SCALE: u32 = 8;

/// Default MT-per-BBL conversion ratio when a product has no specific entry
/// in `product_conversion_ratios` and no `"default"` key is configured.
pub const FALLBACK_CONVERSION_RATIO: &str = "6.35";

/// Default cap on the number of trader trades considered when searching for
/// a covering subset in Rule 6 (aggregation).
pub const DEFAULT_RULE6_SUBSET_CAP: usize = 8;

/// Confidence (percent) assumed for an exact (Rule 1) match when the config
/// does not override it.
pub const DEFAULT_EXACT_CONFIDENCE: u8 = 100;

/// Number of hex characters appended to a generated `MatchId`.
pub const MATCH_ID_SUFFIX_LEN: usize = 8;

/// Engine name, used in logs and diagnostics.
pub const ENGINE_NAME: &str = "reconengine";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
