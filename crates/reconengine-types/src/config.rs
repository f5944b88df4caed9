//! Configuration record consumed (never parsed or persisted) by the core.
//!
//! Construction, file loading, and alias-table parsing belong to the
//! out-of-scope adapter layer; this module only defines the shape the core
//! reads from.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Family, Unit, constants};

/// Whether a family's Rule 1 (and derived rules) compares the trader side's
/// `side` field directly against the exchange side's, or against its
/// opposite.
///
/// ICE and CME compare directly (`SameSide`); SGX and EEX compare against
/// the flipped side (`FlippedSide`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideConvention {
    SameSide,
    FlippedSide,
}

/// Per-family settings not already covered by the generic maps below:
/// the crack hub product, the spread separator, and the side convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilySettings {
    pub side_convention: SideConvention,
    /// Synthetic hub product name for cracks, e.g. `"brent swap"`.
    pub crack_hub_product: String,
    /// Spread separator, e.g. `"-"`.
    pub spread_separator: String,
}

/// Named tolerance bands, keyed by unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tolerances {
    pub tolerance_mt: Decimal,
    pub tolerance_bbl: Decimal,
    pub tolerance_lots: Decimal,
    pub tolerance_default: Decimal,
}

impl Tolerances {
    /// Select the tolerance for the given unit, falling back to
    /// `tolerance_default`.
    #[must_use]
    pub fn for_unit(&self, unit: Unit) -> Decimal {
        match unit {
            Unit::Mt => self.tolerance_mt,
            Unit::Bbl => self.tolerance_bbl,
            Unit::Lots => self.tolerance_lots,
            Unit::Units => self.tolerance_default,
        }
    }
}

/// The full configuration record threaded through the reconciliation
/// pipeline. Read-only after construction; safe to share by reference
/// across partitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconConfig {
    /// Raw alias → canonical product name. Consumed by the (out-of-scope)
    /// normalizer; retained here as part of the configuration record even
    /// though the core never reads it directly.
    pub product_aliases: HashMap<String, String>,

    /// Ordered list of `(regex, replacement)` pairs for month normalization.
    /// Consumed by the out-of-scope normalizer.
    pub month_patterns: Vec<(String, String)>,

    /// Raw buy/sell token → canonical `Side`. Consumed by the out-of-scope
    /// normalizer.
    pub buy_sell_aliases: HashMap<String, String>,

    /// Fields that must match (including null == null) for *any* rule to
    /// accept a pair. Field names are rule-key-agnostic identifiers such as
    /// `"broker_group_id"`.
    pub universal_matching_fields: Vec<String>,

    /// Product (canonical name, lowercase) → MT-per-BBL ratio. Must contain
    /// a `"default"` entry.
    pub product_conversion_ratios: HashMap<String, Decimal>,

    /// Product (canonical name, lowercase) → canonical unit. Must contain a
    /// `"default"` entry.
    pub product_unit_defaults: HashMap<String, Unit>,

    pub tolerances: Tolerances,

    /// Ordered list of rule numbers to run, filtered per-family to the
    /// numbers that family implements.
    pub rule_order: Vec<u32>,

    /// Rule number → confidence percent (0..100).
    pub rule_confidence: HashMap<u32, u8>,

    /// Per-family settings: side convention, crack hub, spread separator.
    pub family_settings: HashMap<Family, FamilySettings>,

    /// Exchange group id → family, used by the router.
    pub exchange_group_mapping: HashMap<i64, Family>,

    /// Cap on the number of trader trades considered when searching for a
    /// covering subset in Rule 6, to keep the combinatorial search bounded.
    pub rule6_subset_cap: usize,
}

impl ReconConfig {
    /// Look up the conversion ratio for a product, falling back to
    /// `product_conversion_ratios["default"]`.
    #[must_use]
    pub fn conversion_ratio(&self, product: &str) -> Decimal {
        self.product_conversion_ratios
            .get(product)
            .copied()
            .unwrap_or_else(|| {
                self.product_conversion_ratios
                    .get("default")
                    .copied()
                    .unwrap_or_else(|| constants::FALLBACK_CONVERSION_RATIO.parse().unwrap())
            })
    }

    /// Look up the canonical unit for a product, falling back to
    /// `product_unit_defaults["default"]`, falling back further to `Mt`.
    #[must_use]
    pub fn canonical_unit(&self, product: &str) -> Unit {
        self.product_unit_defaults
            .get(product)
            .copied()
            .or_else(|| self.product_unit_defaults.get("default").copied())
            .unwrap_or(Unit::Mt)
    }

    /// Confidence percent configured for a rule number, defaulting to
    /// `constants::DEFAULT_EXACT_CONFIDENCE` for rule 1 and `0` otherwise.
    #[must_use]
    pub fn confidence_for(&self, rule_number: u32) -> u8 {
        self.rule_confidence.get(&rule_number).copied().unwrap_or(
            if rule_number == 1 {
                constants::DEFAULT_EXACT_CONFIDENCE
            } else {
                0
            },
        )
    }

    /// Family settings for `family`, panicking (fail-fast) if the caller
    /// passes a family with no configured settings — this is a
    /// configuration error the out-of-scope host should have caught before
    /// invoking the core.
    #[must_use]
    pub fn family_settings(&self, family: Family) -> &FamilySettings {
        self.family_settings
            .get(&family)
            .unwrap_or_else(|| panic!("no FamilySettings configured for family {family}"))
    }

    /// The rule numbers to actually run for `family`: the configured
    /// `rule_order`, filtered to the numbers `family` implements, preserving
    /// `rule_order`'s sequence.
    #[must_use]
    pub fn rule_order_for(&self, family: Family) -> Vec<u32> {
        let supported = family.supported_rules();
        self.rule_order
            .iter()
            .copied()
            .filter(|n| supported.contains(n))
            .collect()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl ReconConfig {
    /// Minimal configuration sufficient for unit/integration tests: ICE and
    /// SGX family settings, a flat conversion ratio, MT defaults everywhere,
    /// tight tolerances, and the full ICE rule order.
    #[must_use]
    pub fn test_default() -> Self {
        let mut product_conversion_ratios = HashMap::new();
        product_conversion_ratios.insert("default".to_string(), Decimal::new(635, 2));
        product_conversion_ratios.insert("380cst".to_string(), Decimal::new(7, 0));

        let mut product_unit_defaults = HashMap::new();
        product_unit_defaults.insert("default".to_string(), Unit::Mt);
        product_unit_defaults.insert("brent swap".to_string(), Unit::Bbl);

        let mut family_settings = HashMap::new();
        family_settings.insert(
            Family::Ice,
            FamilySettings {
                side_convention: SideConvention::SameSide,
                crack_hub_product: "brent swap".to_string(),
                spread_separator: "-".to_string(),
            },
        );
        family_settings.insert(
            Family::Sgx,
            FamilySettings {
                side_convention: SideConvention::FlippedSide,
                crack_hub_product: "brent swap".to_string(),
                spread_separator: "-".to_string(),
            },
        );
        family_settings.insert(
            Family::Cme,
            FamilySettings {
                side_convention: SideConvention::SameSide,
                crack_hub_product: "brent swap".to_string(),
                spread_separator: "-".to_string(),
            },
        );
        family_settings.insert(
            Family::Eex,
            FamilySettings {
                side_convention: SideConvention::FlippedSide,
                crack_hub_product: "brent swap".to_string(),
                spread_separator: "-".to_string(),
            },
        );

        let mut rule_confidence = HashMap::new();
        for n in 1..=12u32 {
            rule_confidence.insert(n, if n == 1 { 100 } else { 90 });
        }

        Self {
            product_aliases: HashMap::new(),
            month_patterns: Vec::new(),
            buy_sell_aliases: HashMap::new(),
            universal_matching_fields: vec!["broker_group_id".to_string()],
            product_conversion_ratios,
            product_unit_defaults,
            tolerances: Tolerances {
                tolerance_mt: Decimal::new(1, 2),
                tolerance_bbl: Decimal::new(1, 1),
                tolerance_lots: Decimal::ZERO,
                tolerance_default: Decimal::new(1, 2),
            },
            rule_order: (1..=12).collect(),
            rule_confidence,
            family_settings,
            exchange_group_mapping: HashMap::new(),
            rule6_subset_cap: constants::DEFAULT_RULE6_SUBSET_CAP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_ratio_falls_back_to_default() {
        let cfg = ReconConfig::test_default();
        assert_eq!(cfg.conversion_ratio("380cst"), Decimal::new(7, 0));
        assert_eq!(cfg.conversion_ratio("unknown product"), Decimal::new(635, 2));
    }

    #[test]
    fn canonical_unit_falls_back_to_default() {
        let cfg = ReconConfig::test_default();
        assert_eq!(cfg.canonical_unit("brent swap"), Unit::Bbl);
        assert_eq!(cfg.canonical_unit("380cst"), Unit::Mt);
    }

    #[test]
    fn confidence_defaults_to_100_for_rule_1() {
        let cfg = ReconConfig::test_default();
        assert_eq!(cfg.confidence_for(1), 100);
    }

    #[test]
    fn rule_order_for_filters_to_family() {
        let cfg = ReconConfig::test_default();
        assert_eq!(cfg.rule_order_for(Family::Sgx), vec![1, 2, 3]);
        assert_eq!(cfg.rule_order_for(Family::Cme), vec![1]);
        assert_eq!(cfg.rule_order_for(Family::Ice).len(), 12);
    }

    #[test]
    fn tolerance_for_unit_selects_correct_band() {
        let cfg = ReconConfig::test_default();
        assert_eq!(cfg.tolerances.for_unit(Unit::Mt), Decimal::new(1, 2));
        assert_eq!(cfg.tolerances.for_unit(Unit::Bbl), Decimal::new(1, 1));
    }
}
