//! Rule 1: exact matching, every family.
//!
//! Product, contract month, quantity, and price equal, side equal under
//! the family's convention, universal fields equal.

use reconengine_types::{Family, MatchResult, ReconConfig, Result};

use crate::pool::UnmatchedPool;
use crate::rules::pairwise::{exact_signature_matches, find_pairwise_matches};

pub const RULE_NUMBER: u32 = 1;

pub fn find(pool: &mut UnmatchedPool, config: &ReconConfig, family: Family) -> Result<Vec<MatchResult>> {
    find_pairwise_matches(
        pool,
        config,
        family,
        RULE_NUMBER,
        &["product", "contract_month", "quantity", "price", "side"],
        |_trade| true,
        |t| (t.product.clone(), t.contract_month, t.quantity, t.price),
        exact_signature_matches,
    )
}
