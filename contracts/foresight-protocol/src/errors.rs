use soroban_sdk::contracterror;

/// Error enum for the Foresight settlement contract.
///
/// Every public operation either applies fully or returns one of these codes,
/// in which case the host discards all writes and token transfers performed
/// during the invocation.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // Core errors
    Unauthorized = 1,
    AlreadyExists = 2,
    InvalidArgument = 3,
    NotYetEligible = 4,
    AlreadyResolved = 5,
    AlreadyClaimed = 6,
    VaultNotEmpty = 7,
    InsufficientFunds = 8,

    // Lookup errors
    NotInitialized = 101,
    MarketNotFound = 102,
    ProfileNotFound = 103,
    PredictionNotFound = 104,
    ResolverNotFound = 105,
    VoteResultNotFound = 106,
    VoteAuthorityNotFound = 107,
    ProposalNotFound = 108,

    // Lifecycle errors
    StakingClosed = 201,
    MarketNotResolved = 202,
    NotWinningOutcome = 203,
    OutcomeLocked = 204,
    ResolverInactive = 205,
    NotAiResolvable = 206,
    VoteTied = 207,
    AlreadyVoted = 208,
    VotingClosed = 209,
    ResolutionChallenged = 210,
    ChallengeWindowClosed = 211,
    ProposalPending = 212,

    // System errors
    ArithmeticOverflow = 301,
    ReentrancyAttack = 302,
    InvalidConfig = 303,
}

/// Error helper functions for common validation scenarios
pub mod helpers {
    use super::Error;
    use soroban_sdk::{String, Vec};

    /// Outcome indices are positions into the market's outcome list.
    pub fn require_valid_outcome(outcome_index: u32, outcomes: &Vec<String>) -> Result<(), Error> {
        if outcome_index >= outcomes.len() {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }

    pub fn require_positive_amount(amount: i128) -> Result<(), Error> {
        if amount <= 0 {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }

    pub fn require_fee_bps(fee_bps: u32, cap_bps: u32) -> Result<(), Error> {
        if fee_bps > cap_bps {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }

    pub fn require_string_length(s: &String, min: u32, max: u32) -> Result<(), Error> {
        let len = s.len();
        if len < min || len > max {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::{vec, Env, String};

    #[test]
    fn test_outcome_bounds() {
        let env = Env::default();
        let outcomes = vec![
            &env,
            String::from_str(&env, "Yes"),
            String::from_str(&env, "No"),
        ];
        assert!(helpers::require_valid_outcome(1, &outcomes).is_ok());
        assert_eq!(
            helpers::require_valid_outcome(2, &outcomes),
            Err(Error::InvalidArgument)
        );
    }

    #[test]
    fn test_amount_and_fee_guards() {
        assert_eq!(helpers::require_positive_amount(0), Err(Error::InvalidArgument));
        assert_eq!(helpers::require_positive_amount(-5), Err(Error::InvalidArgument));
        assert!(helpers::require_positive_amount(1).is_ok());

        assert!(helpers::require_fee_bps(1_000, 1_000).is_ok());
        assert_eq!(helpers::require_fee_bps(1_001, 1_000), Err(Error::InvalidArgument));
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(Error::Unauthorized as u32, 1);
        assert_eq!(Error::AlreadyClaimed as u32, 6);
        assert_eq!(Error::InsufficientFunds as u32, 8);
        assert_eq!(Error::MarketNotFound as u32, 102);
        assert_eq!(Error::VoteTied as u32, 207);
        assert_eq!(Error::ProposalPending as u32, 212);
    }
}
