//! Rule 0 product decomposition: break every trade down into signed
//! base-product legs, independent of whether it was ever matched as a
//! trade.
//!
//! Crack detection requires the configured hub suffix (`"<product>
//! crack"`), not a bare substring match of `"crack"` anywhere in the name;
//! the ratio used to convert a synthetic leg's quantity always keys off the
//! *original* traded product, never off the synthetic leg's own name.

use rust_decimal::Decimal;

use reconengine_types::{Family, ReconConfig, Trade, Unit};

/// One signed base-product leg produced by decomposing a trade.
///
/// `signed_quantity` carries the sign: positive for a net buy contribution,
/// negative for a net sell contribution, in the trade's original unit (not
/// yet converted to the canonical unit — that happens when the leg is
/// folded into a [`crate::position_matrix::PositionMatrix`]).
#[derive(Debug, Clone)]
pub struct Leg {
    pub base_product: String,
    pub signed_quantity: Decimal,
    pub unit: Unit,
    pub is_synthetic: bool,
    /// The product whose conversion ratio applies to this leg. Always the
    /// base/original refined-product name — `x` in `"<x> crack"`, `A` in
    /// `"A-B"` — never the full compound name, matching the ratio-keying
    /// every pairwise rule (`rules/crack.rs`, `rules/product_spread.rs`)
    /// already applies.
    pub ratio_product: String,
}

/// Decompose `trade` into its signed base-product legs for the given
/// `family`'s crack hub and spread separator conventions.
#[must_use]
pub fn decompose(trade: &Trade, config: &ReconConfig, family: Family) -> Vec<Leg> {
    let settings = config.family_settings(family);
    let sign = trade.side.sign();

    if let Some(base) = crack_base(trade) {
        let base = base.to_string();
        return vec![
            Leg {
                base_product: base.clone(),
                signed_quantity: sign * trade.quantity,
                unit: trade.unit,
                is_synthetic: false,
                ratio_product: base.clone(),
            },
            Leg {
                base_product: settings.crack_hub_product.clone(),
                signed_quantity: -sign * trade.quantity,
                unit: trade.unit,
                is_synthetic: true,
                ratio_product: base,
            },
        ];
    }

    if let Some((first, second)) = spread_parts(trade, &settings.spread_separator) {
        let first = first.to_string();
        return vec![
            Leg {
                base_product: first.clone(),
                signed_quantity: sign * trade.quantity,
                unit: trade.unit,
                is_synthetic: false,
                ratio_product: first.clone(),
            },
            Leg {
                base_product: second.to_string(),
                signed_quantity: -sign * trade.quantity,
                unit: trade.unit,
                is_synthetic: true,
                ratio_product: first,
            },
        ];
    }

    vec![Leg {
        base_product: trade.product.clone(),
        signed_quantity: sign * trade.quantity,
        unit: trade.unit,
        is_synthetic: false,
        ratio_product: trade.product.clone(),
    }]
}

/// `Some(base_product)` if `trade.product` is a crack product
/// (`"<base_product> crack"`, per `Trade::is_crack`). The synthetic hub leg
/// produced alongside it is always the configured `crack_hub_product`
/// (e.g. `"brent swap"`), not derived from the trade's own name.
fn crack_base(trade: &Trade) -> Option<&str> {
    trade.crack_base_product()
}

/// `Some((first, second))` if `trade.product` contains the configured
/// separator exactly once and is not itself a crack — product spreads and
/// cracks are mutually exclusive categories.
fn spread_parts<'a>(trade: &'a Trade, separator: &str) -> Option<(&'a str, &'a str)> {
    if trade.is_crack() {
        return None;
    }
    if trade.product.matches(separator).count() != 1 {
        return None;
    }
    trade.product.split_once(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconengine_types::{MonYY, Side, Source};

    fn trade(product: &str, side: Side) -> Trade {
        Trade::dummy(
            "T1",
            Source::Trader,
            product,
            MonYY::new(2025, 7),
            Decimal::TEN,
            Unit::Mt,
            Decimal::new(500, 0),
            side,
        )
    }

    #[test]
    fn crack_decomposes_into_base_and_hub_with_opposite_signs() {
        let cfg = ReconConfig::test_default();
        let t = trade("380cst crack", Side::Buy);
        let legs = decompose(&t, &cfg, Family::Ice);

        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].base_product, "380cst");
        assert_eq!(legs[0].signed_quantity, Decimal::TEN);
        assert_eq!(legs[1].base_product, "brent swap");
        assert_eq!(legs[1].signed_quantity, -Decimal::TEN);
        assert!(!legs[0].is_synthetic);
        assert!(legs[1].is_synthetic);
        assert_eq!(legs[0].ratio_product, "380cst");
        assert_eq!(legs[1].ratio_product, "380cst");
    }

    #[test]
    fn selling_crack_flips_both_leg_signs() {
        let cfg = ReconConfig::test_default();
        let t = trade("380cst crack", Side::Sell);
        let legs = decompose(&t, &cfg, Family::Ice);

        assert_eq!(legs[0].signed_quantity, -Decimal::TEN);
        assert_eq!(legs[1].signed_quantity, Decimal::TEN);
    }

    #[test]
    fn product_spread_decomposes_into_two_opposite_legs() {
        let cfg = ReconConfig::test_default();
        let t = trade("marine-380cst", Side::Buy);
        let legs = decompose(&t, &cfg, Family::Ice);

        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].base_product, "marine");
        assert_eq!(legs[1].base_product, "380cst");
        assert_eq!(legs[0].signed_quantity, Decimal::TEN);
        assert_eq!(legs[1].signed_quantity, -Decimal::TEN);
    }

    #[test]
    fn plain_product_yields_a_single_signed_leg() {
        let cfg = ReconConfig::test_default();
        let t = trade("380cst", Side::Sell);
        let legs = decompose(&t, &cfg, Family::Ice);

        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].base_product, "380cst");
        assert_eq!(legs[0].signed_quantity, -Decimal::TEN);
        assert!(!legs[0].is_synthetic);
    }
}
