//! Rule 0 position matrix: signed aggregate quantity per `(contract_month,
//! product)`, in the product's canonical unit.
//!
//! One `Decimal` per position, always expressed in
//! `ReconConfig::canonical_unit(product)`, rather than a pair of
//! product-specific MT/BBL fields where one side sits unused — every
//! product, brent swap included, goes through the same canonical-unit path.

use std::collections::HashMap;

use reconengine_types::{Family, MonYY, ReconConfig, Source, Trade};

use crate::decomposer::decompose;
use crate::unit::convert;

/// One aggregated position: the net signed quantity, in the canonical unit,
/// across every trade (and trade leg) that touched this `(month, product)`.
#[derive(Debug, Clone)]
pub struct Position {
    pub product: String,
    pub contract_month: MonYY,
    pub quantity: rust_decimal::Decimal,
    pub unit: reconengine_types::Unit,
    pub trade_count: usize,
    pub is_synthetic: bool,
}

/// A full set of positions for one side (trader or exchange) of a
/// partition.
#[derive(Debug, Clone)]
pub struct PositionMatrix {
    positions: HashMap<(MonYY, String), Position>,
    pub source: Source,
}

impl PositionMatrix {
    #[must_use]
    pub fn empty(source: Source) -> Self {
        Self {
            positions: HashMap::new(),
            source,
        }
    }

    /// Build a matrix by decomposing every trade in `trades` and folding
    /// each leg into its `(month, base_product)` bucket, converting to the
    /// product's canonical unit as it is added.
    #[must_use]
    pub fn build(trades: &[Trade], config: &ReconConfig, family: Family) -> Self {
        let source = trades.first().map_or(Source::Trader, |t| t.source);
        let mut matrix = Self::empty(source);

        for trade in trades {
            for leg in decompose(trade, config, family) {
                let canonical_unit = config.canonical_unit(&leg.base_product);
                let ratio = config.conversion_ratio(&leg.ratio_product);
                let converted = convert(leg.signed_quantity, leg.unit, canonical_unit, ratio);

                let key = (trade.contract_month, leg.base_product.clone());
                let entry = matrix.positions.entry(key).or_insert_with(|| Position {
                    product: leg.base_product.clone(),
                    contract_month: trade.contract_month,
                    quantity: rust_decimal::Decimal::ZERO,
                    unit: canonical_unit,
                    trade_count: 0,
                    is_synthetic: leg.is_synthetic,
                });
                entry.quantity += converted;
                entry.trade_count += 1;
            }
        }

        matrix
    }

    /// Combine several matrices from the same side into one, summing
    /// overlapping positions — used when a partition spans multiple
    /// upstream batches.
    #[must_use]
    pub fn merge(matrices: &[Self]) -> Self {
        let source = matrices.first().map_or(Source::Trader, |m| m.source);
        let mut merged = Self::empty(source);

        for matrix in matrices {
            for (key, position) in &matrix.positions {
                let entry = merged.positions.entry(key.clone()).or_insert_with(|| Position {
                    product: position.product.clone(),
                    contract_month: position.contract_month,
                    quantity: rust_decimal::Decimal::ZERO,
                    unit: position.unit,
                    trade_count: 0,
                    is_synthetic: position.is_synthetic,
                });
                entry.quantity += position.quantity;
                entry.trade_count += position.trade_count;
            }
        }

        merged
    }

    #[must_use]
    pub fn get(&self, month: MonYY, product: &str) -> Option<&Position> {
        self.positions.get(&(month, product.to_string()))
    }

    /// All `(month, product)` keys present in this matrix, for computing
    /// the union with another matrix.
    pub fn keys(&self) -> impl Iterator<Item = &(MonYY, String)> {
        self.positions.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconengine_types::{Side, Unit};
    use rust_decimal::Decimal;

    #[test]
    fn crack_decomposition_feeds_two_positions() {
        let cfg = ReconConfig::test_default();
        let trade = Trade::dummy(
            "T1",
            Source::Trader,
            "380cst crack",
            MonYY::new(2025, 7),
            Decimal::TEN,
            Unit::Mt,
            Decimal::new(500, 0),
            Side::Buy,
        );
        let matrix = PositionMatrix::build(&[trade], &cfg, Family::Ice);

        assert_eq!(matrix.len(), 2);
        let base = matrix.get(MonYY::new(2025, 7), "380cst").unwrap();
        assert_eq!(base.quantity, Decimal::TEN);

        let hub = matrix.get(MonYY::new(2025, 7), "brent swap").unwrap();
        // brent swap's canonical unit is BBL; converted using 380cst's own
        // ratio (7.0), since the hub leg's ratio is always keyed off the
        // base product, never off the hub product itself.
        assert_eq!(hub.unit, Unit::Bbl);
        assert_eq!(hub.quantity, -Decimal::new(70, 0));
    }

    #[test]
    fn plain_product_nets_buys_and_sells() {
        let cfg = ReconConfig::test_default();
        let buy = Trade::dummy(
            "T1",
            Source::Trader,
            "380cst",
            MonYY::new(2025, 7),
            Decimal::TEN,
            Unit::Mt,
            Decimal::new(500, 0),
            Side::Buy,
        );
        let sell = Trade::dummy(
            "T2",
            Source::Trader,
            "380cst",
            MonYY::new(2025, 7),
            Decimal::new(4, 0),
            Unit::Mt,
            Decimal::new(500, 0),
            Side::Sell,
        );
        let matrix = PositionMatrix::build(&[buy, sell], &cfg, Family::Ice);
        let pos = matrix.get(MonYY::new(2025, 7), "380cst").unwrap();
        assert_eq!(pos.quantity, Decimal::new(6, 0));
        assert_eq!(pos.trade_count, 2);
    }

    #[test]
    fn merge_sums_overlapping_positions() {
        let cfg = ReconConfig::test_default();
        let t = Trade::dummy(
            "T1",
            Source::Trader,
            "380cst",
            MonYY::new(2025, 7),
            Decimal::TEN,
            Unit::Mt,
            Decimal::new(500, 0),
            Side::Buy,
        );
        let m1 = PositionMatrix::build(&[t.clone()], &cfg, Family::Ice);
        let m2 = PositionMatrix::build(&[t], &cfg, Family::Ice);
        let merged = PositionMatrix::merge(&[m1, m2]);
        let pos = merged.get(MonYY::new(2025, 7), "380cst").unwrap();
        assert_eq!(pos.quantity, Decimal::new(20, 0));
        assert_eq!(pos.trade_count, 2);
    }
}
