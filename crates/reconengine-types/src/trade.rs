//! Canonical trade model consumed by the reconciliation core.
//!
//! A [`Trade`] is produced by an out-of-scope adapter layer (CSV parsers,
//! exchange report re-mappers, field normalization) and is immutable once
//! constructed. The core trusts its invariants: `product` is already
//! canonical, `contract_month` is already a [`MonYY`], `quantity` is
//! strictly positive.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MonYY, TradeId};

/// Which side produced this trade record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Trader,
    Exchange,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trader => write!(f, "trader"),
            Self::Exchange => write!(f, "exchange"),
        }
    }
}

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The opposite side.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Signed multiplier for position aggregation: `+1` for Buy, `-1` for Sell.
    #[must_use]
    pub fn sign(self) -> Decimal {
        match self {
            Self::Buy => Decimal::ONE,
            Self::Sell => -Decimal::ONE,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "B"),
            Self::Sell => write!(f, "S"),
        }
    }
}

/// The unit a trade's quantity is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Mt,
    Bbl,
    Lots,
    Units,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mt => write!(f, "MT"),
            Self::Bbl => write!(f, "BBL"),
            Self::Lots => write!(f, "LOTS"),
            Self::Units => write!(f, "UNITS"),
        }
    }
}

/// Put or call, for options trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PutCall {
    Put,
    Call,
}

impl std::fmt::Display for PutCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Put => write!(f, "P"),
            Self::Call => write!(f, "C"),
        }
    }
}

/// A single canonical trade record, from either the trader or exchange side.
///
/// Immutable: every field is `pub` for read access but there are no setters.
/// Identity is `(source, internal_trade_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub internal_trade_id: TradeId,
    pub source: Source,
    /// Canonical lowercase product name, e.g. `"380cst"`, `"brent swap"`,
    /// `"380cst crack"`, `"0.5%marine-380cst"`.
    pub product: String,
    pub contract_month: MonYY,
    pub quantity: Decimal,
    pub unit: Unit,
    /// Signed price; cracks may price negative.
    pub price: Decimal,
    pub side: Side,
    pub broker_group_id: Option<i64>,
    pub clearing_account_id: Option<i64>,
    pub exchange_group_id: Option<i64>,
    pub strike: Option<Decimal>,
    pub put_call: Option<PutCall>,
    /// Trader-tagged spread leg marker ("S" in the source data).
    pub spread_flag: Option<String>,
}

impl Trade {
    /// Returns `true` if this trade is on the buy side.
    #[must_use]
    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }

    /// Returns `true` if this trade is on the sell side.
    #[must_use]
    pub fn is_sell(&self) -> bool {
        self.side == Side::Sell
    }

    /// Returns `true` if this trade carries options fields.
    #[must_use]
    pub fn is_option(&self) -> bool {
        self.put_call.is_some()
    }

    /// Returns `true` if this trade's product name denotes a crack
    /// (`"<base> crack"`).
    #[must_use]
    pub fn is_crack(&self) -> bool {
        self.product.ends_with(" crack")
    }

    /// Returns `true` if this trade's product name denotes a product spread
    /// (`"A-B"`), and is not a crack.
    #[must_use]
    pub fn is_product_spread(&self, separator: &str) -> bool {
        !self.is_crack() && self.product.matches(separator).count() == 1
    }

    /// Returns the base product name with `" crack"` stripped, if this trade
    /// is a crack; otherwise `None`.
    #[must_use]
    pub fn crack_base_product(&self) -> Option<&str> {
        self.product.strip_suffix(" crack")
    }

    #[cfg(any(test, feature = "test-helpers"))]
    pub fn dummy(
        id: &str,
        source: Source,
        product: &str,
        month: MonYY,
        quantity: Decimal,
        unit: Unit,
        price: Decimal,
        side: Side,
    ) -> Self {
        Self {
            internal_trade_id: TradeId::new(id),
            source,
            product: product.to_string(),
            contract_month: month,
            quantity,
            unit,
            price,
            side,
            broker_group_id: None,
            clearing_account_id: None,
            exchange_group_id: None,
            strike: None,
            put_call: None,
            spread_flag: None,
        }
    }
}

impl std::fmt::Display for Trade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trade[{}] {} {} {} {} @ {} {}",
            self.internal_trade_id,
            self.source,
            self.side,
            self.quantity,
            self.unit,
            self.price,
            self.contract_month,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade() -> Trade {
        Trade::dummy(
            "1",
            Source::Trader,
            "380cst",
            MonYY::new(2025, 7),
            Decimal::new(1000, 0),
            Unit::Mt,
            Decimal::new(178, 0),
            Side::Buy,
        )
    }

    #[test]
    fn side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn side_sign() {
        assert_eq!(Side::Buy.sign(), Decimal::ONE);
        assert_eq!(Side::Sell.sign(), -Decimal::ONE);
    }

    #[test]
    fn is_crack_detection() {
        let mut t = trade();
        t.product = "380cst crack".to_string();
        assert!(t.is_crack());
        assert_eq!(t.crack_base_product(), Some("380cst"));
    }

    #[test]
    fn is_product_spread_detection() {
        let mut t = trade();
        t.product = "0.5%marine-380cst".to_string();
        assert!(t.is_product_spread("-"));
        assert!(!t.is_crack());
    }

    #[test]
    fn crack_is_not_also_a_spread() {
        let mut t = trade();
        t.product = "380cst crack".to_string();
        assert!(!t.is_product_spread("-"));
    }

    #[test]
    fn display_contains_core_fields() {
        let t = trade();
        let s = format!("{t}");
        assert!(s.contains("380cst"));
        assert!(s.contains("Jul25"));
    }

    #[test]
    fn serde_roundtrip() {
        let t = trade();
        let json = serde_json::to_string(&t).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
