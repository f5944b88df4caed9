//! Universal field matching: the fields every rule family requires to
//! match (including null == null) before it even considers its own
//! rule-specific fields.
//!
//! `universal_matching_fields` names trade attributes by string, but rather
//! than resolving them through runtime reflection, each known field name is
//! matched here by an explicit projection function.

use reconengine_types::Trade;

/// The value of one universal field on a trade, used both for equality
/// checks and as part of a rule's hash-index key.
fn universal_field_value(trade: &Trade, field_name: &str) -> Option<i64> {
    match field_name {
        "broker_group_id" | "brokergroupid" => trade.broker_group_id,
        "clearing_account_id" | "exchclearingacctid" => trade.clearing_account_id,
        "exchange_group_id" | "exchgroupid" => trade.exchange_group_id,
        _ => None,
    }
}

/// `true` if every configured universal field is equal (including both
/// being absent) between `a` and `b`.
#[must_use]
pub fn universal_fields_match(a: &Trade, b: &Trade, fields: &[String]) -> bool {
    fields
        .iter()
        .all(|f| universal_field_value(a, f) == universal_field_value(b, f))
}

/// The ordered tuple of universal field values for `trade`, suitable for
/// appending to a rule's signature key.
#[must_use]
pub fn universal_key(trade: &Trade, fields: &[String]) -> Vec<Option<i64>> {
    fields.iter().map(|f| universal_field_value(trade, f)).collect()
}

/// The trade-model attribute names the configured universal fields resolve
/// to, for inclusion in a [`reconengine_types::MatchResult::matched_fields`]
/// list alongside a rule's own fields.
#[must_use]
pub fn universal_matched_field_names(fields: &[String]) -> Vec<String> {
    fields
        .iter()
        .map(|f| match f.as_str() {
            "brokergroupid" => "broker_group_id".to_string(),
            "exchclearingacctid" => "clearing_account_id".to_string(),
            "exchgroupid" => "exchange_group_id".to_string(),
            other => other.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconengine_types::{MonYY, Side, Source, Unit};
    use rust_decimal::Decimal;

    fn trade(broker_group_id: Option<i64>) -> Trade {
        let mut t = Trade::dummy(
            "T1",
            Source::Trader,
            "380cst",
            MonYY::new(2025, 7),
            Decimal::TEN,
            Unit::Mt,
            Decimal::new(500, 0),
            Side::Buy,
        );
        t.broker_group_id = broker_group_id;
        t
    }

    #[test]
    fn matching_values_pass() {
        let fields = vec!["broker_group_id".to_string()];
        assert!(universal_fields_match(&trade(Some(1)), &trade(Some(1)), &fields));
    }

    #[test]
    fn mismatched_values_fail() {
        let fields = vec!["broker_group_id".to_string()];
        assert!(!universal_fields_match(&trade(Some(1)), &trade(Some(2)), &fields));
    }

    #[test]
    fn both_absent_counts_as_matching() {
        let fields = vec!["broker_group_id".to_string()];
        assert!(universal_fields_match(&trade(None), &trade(None), &fields));
    }

    #[test]
    fn one_absent_one_present_fails() {
        let fields = vec!["broker_group_id".to_string()];
        assert!(!universal_fields_match(&trade(None), &trade(Some(1)), &fields));
    }
}
