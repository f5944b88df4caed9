//! Error types for the reconciliation engine.
//!
//! All errors use the `RECON_ERR_` prefix convention for easy grepping in
//! logs. Codes are grouped by subsystem:
//! - 1xx: Configuration errors
//! - 2xx: Canonicalization / invariant errors on a `Trade`
//! - 3xx: Internal invariant violations (fatal, never reached on correct
//!   rule implementations)

use thiserror::Error;

use crate::TradeId;

/// Central error enum for all reconciliation engine operations.
#[derive(Debug, Error)]
pub enum ReconError {
    // =================================================================
    // Configuration Errors (1xx)
    // =================================================================
    /// A required configuration key was not present.
    #[error("RECON_ERR_100: Missing configuration key: {0}")]
    MissingConfigKey(String),

    /// `rule_order` names a rule number the engine does not implement.
    #[error("RECON_ERR_101: Unknown rule number in rule_order: {0}")]
    UnknownRuleNumber(u32),

    /// A crack rule is enabled but no `crack_hub_product` is configured.
    #[error("RECON_ERR_102: Crack rule enabled but crack_hub_product is undefined")]
    UndefinedCrackHub,

    // =================================================================
    // Canonicalization Errors (2xx)
    // =================================================================
    /// A trade's quantity was not strictly positive.
    #[error("RECON_ERR_200: Non-positive quantity on trade {0}")]
    NonPositiveQuantity(TradeId),

    /// A trade's side was neither Buy nor Sell.
    #[error("RECON_ERR_201: Invalid side on trade {0}")]
    InvalidSide(TradeId),

    /// A trade carried `put_call` without a `strike`, or vice versa.
    #[error("RECON_ERR_202: Options fields inconsistent on trade {0}")]
    InconsistentOptionsFields(TradeId),

    // =================================================================
    // Internal Invariant Violations (3xx, fatal)
    // =================================================================
    /// `commit` was asked to withdraw the same trade id twice within one
    /// request — indicates a programming error in candidate selection, not
    /// an ordinary "candidate no longer available" outcome (which `commit`
    /// reports as `Ok(false)` instead).
    #[error("RECON_ERR_300: Pool invariant violation: trade {0} named more than once in a single commit")]
    PoolInvariantViolation(TradeId),

    /// An accepted match result referenced a trade id that is not (or is no
    /// longer) present in either pool.
    #[error("RECON_ERR_301: Match {0} references an unknown trade id {1}")]
    DanglingMatchReference(String, TradeId),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ReconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = ReconError::UnknownRuleNumber(42);
        let msg = format!("{err}");
        assert!(msg.starts_with("RECON_ERR_101"), "Got: {msg}");
    }

    #[test]
    fn non_positive_quantity_display() {
        let err = ReconError::NonPositiveQuantity(TradeId::new("7"));
        let msg = format!("{err}");
        assert!(msg.contains("RECON_ERR_200"));
        assert!(msg.contains('7'));
    }

    #[test]
    fn all_errors_have_recon_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(ReconError::MissingConfigKey("tolerances".into())),
            Box::new(ReconError::UndefinedCrackHub),
            Box::new(ReconError::PoolInvariantViolation(TradeId::new("9"))),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("RECON_ERR_"),
                "Error missing RECON_ERR_ prefix: {msg}"
            );
        }
    }
}
