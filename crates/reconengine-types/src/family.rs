//! Exchange family tags.
//!
//! Each exchange (ICE, SGX, CME, EEX) has its own rule set and side
//! convention; this is the enum that selects among them, threaded through
//! configuration and the router.

use serde::{Deserialize, Serialize};

/// Which exchange's rule family and conventions apply to a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    Ice,
    Sgx,
    Cme,
    Eex,
}

impl Family {
    /// Short tag used in `MatchId` generation and `remarks` formatting,
    /// e.g. `"ICE"`.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Ice => "ICE",
            Self::Sgx => "SGX",
            Self::Cme => "CME",
            Self::Eex => "EEX",
        }
    }

    /// The rule numbers this family's matcher set implements: twelve for
    /// ICE, three for SGX, one for CME/EEX.
    #[must_use]
    pub fn supported_rules(self) -> &'static [u32] {
        match self {
            Self::Ice => &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
            Self::Sgx => &[1, 2, 3],
            Self::Cme | Self::Eex => &[1],
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_spec_names() {
        assert_eq!(Family::Ice.tag(), "ICE");
        assert_eq!(Family::Sgx.tag(), "SGX");
        assert_eq!(Family::Cme.tag(), "CME");
        assert_eq!(Family::Eex.tag(), "EEX");
    }

    #[test]
    fn rule_counts_match_spec() {
        assert_eq!(Family::Ice.supported_rules().len(), 12);
        assert_eq!(Family::Sgx.supported_rules().len(), 3);
        assert_eq!(Family::Cme.supported_rules().len(), 1);
        assert_eq!(Family::Eex.supported_rules().len(), 1);
    }
}
