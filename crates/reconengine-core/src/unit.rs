//! Unit conversion: `BBL = MT * ratio(product)`.
//!
//! All key construction and position aggregation normalizes to a single
//! unit *before* comparison, never after.

use rust_decimal::Decimal;

use reconengine_types::Unit;

/// Convert `quantity` from `from` to `to` using `ratio` (MT-per-BBL for the
/// product in question). Returns `quantity` unchanged if `from == to`, or if
/// neither unit is `Mt`/`Bbl` (Lots and Units have no defined conversion and
/// are never mixed with Mt/Bbl in the same position).
#[must_use]
pub fn convert(quantity: Decimal, from: Unit, to: Unit, ratio: Decimal) -> Decimal {
    if from == to {
        return quantity;
    }
    match (from, to) {
        (Unit::Mt, Unit::Bbl) => quantity * ratio,
        (Unit::Bbl, Unit::Mt) => quantity / ratio,
        _ => quantity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mt_to_bbl_multiplies_by_ratio() {
        let ratio = Decimal::new(635, 2);
        assert_eq!(convert(Decimal::TEN, Unit::Mt, Unit::Bbl, ratio), Decimal::new(635, 1));
    }

    #[test]
    fn bbl_to_mt_divides_by_ratio() {
        let ratio = Decimal::new(635, 2);
        let bbl = Decimal::new(635, 1);
        assert_eq!(convert(bbl, Unit::Bbl, Unit::Mt, ratio), Decimal::TEN);
    }

    #[test]
    fn same_unit_is_identity() {
        assert_eq!(convert(Decimal::TEN, Unit::Mt, Unit::Mt, Decimal::new(7, 0)), Decimal::TEN);
    }

    #[test]
    fn lots_is_left_unconverted() {
        assert_eq!(convert(Decimal::TEN, Unit::Lots, Unit::Mt, Decimal::new(7, 0)), Decimal::TEN);
    }
}
