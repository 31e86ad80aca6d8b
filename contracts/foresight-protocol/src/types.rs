use soroban_sdk::{contracttype, Address, Env, String, Vec};

use crate::errors::Error;

// ===== IDENTIFIERS =====

/// A market is identified by its creator and the creator's running market index.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarketId {
    pub creator: Address,
    pub index: u32,
}

// ===== PROTOCOL AGGREGATES =====

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProtocolStats {
    pub total_markets: u64,
    pub total_users: u64,
    pub total_stakes: u64,
    pub total_volume: i128,
    pub total_resolved: u64,
    pub total_paid_out: i128,
}

// ===== PROFILES =====

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreatorProfile {
    pub creator: Address,
    pub markets_created: u32,
    pub total_volume: i128,
    pub tier: u32,
    pub created_at: u64,
}

impl CreatorProfile {
    pub fn new(env: &Env, creator: Address) -> Self {
        Self {
            creator,
            markets_created: 0,
            total_volume: 0,
            tier: 0,
            created_at: env.ledger().timestamp(),
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserProfile {
    pub user: Address,
    pub total_predictions: u32,
    pub winning_predictions: u32,
    pub total_winnings: i128,
}

impl UserProfile {
    pub fn new(user: Address) -> Self {
        Self {
            user,
            total_predictions: 0,
            winning_predictions: 0,
            total_winnings: 0,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AiResolver {
    pub authority: Address,
    pub active: bool,
    pub resolutions: u32,
}

// ===== MARKET TYPES =====

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MarketType {
    TimeBound,
    OpenEnded,
}

/// Creation arguments for `create_market`.
///
/// `creator_fee_bps` and `ai_resolvable` are optional: when omitted they are
/// resolved from the creator's tier and the market's AI score respectively.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarketParams {
    pub question: String,
    pub outcomes: Vec<String>,
    pub ai_score: u32,
    pub resolution_time: u64,
    pub market_type: MarketType,
    pub ai_classification: u32,
    pub metadata: String,
    pub creator_fee_bps: Option<u32>,
    pub ai_resolvable: Option<bool>,
    pub token: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Market {
    pub id: MarketId,
    pub question: String,
    pub outcomes: Vec<String>,
    pub market_type: MarketType,
    pub deadline: Option<u64>,
    pub ai_score: u32,
    pub ai_classification: u32,
    pub ai_resolvable: bool,
    pub resolver_authority: Address,
    pub metadata: String,
    pub creator_fee_bps: u32,
    pub protocol_fee_bps: u32,
    pub token: Address,
    pub total_pool: i128,
    pub stakes_per_outcome: Vec<i128>,
    pub staker_count: u32,
    pub resolved: bool,
    pub winning_outcome: Option<u32>,
    pub claimed_winning_stake: i128,
    pub created_at: u64,
}

impl Market {
    pub fn creator(&self) -> &Address {
        &self.id.creator
    }

    pub fn outcome_count(&self) -> u32 {
        self.outcomes.len()
    }

    /// Whether the deadline (if any) has been reached at `now`.
    pub fn deadline_passed(&self, now: u64) -> bool {
        match self.deadline {
            Some(deadline) => now >= deadline,
            None => true,
        }
    }

    pub fn accepts_stakes(&self, now: u64) -> bool {
        if self.resolved {
            return false;
        }
        match self.deadline {
            Some(deadline) => now < deadline,
            None => true,
        }
    }

    pub fn stake_on(&self, outcome_index: u32) -> i128 {
        self.stakes_per_outcome.get(outcome_index).unwrap_or(0)
    }

    pub fn winning_stake(&self) -> Option<i128> {
        self.winning_outcome.map(|w| self.stake_on(w))
    }

    /// Adds `amount` to the pool and to the outcome's accumulator together so
    /// the two never diverge.
    pub fn add_stake(&mut self, outcome_index: u32, amount: i128) -> Result<(), Error> {
        let current = self
            .stakes_per_outcome
            .get(outcome_index)
            .ok_or(Error::InvalidArgument)?;
        let updated = current.checked_add(amount).ok_or(Error::ArithmeticOverflow)?;
        let pool = self
            .total_pool
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;
        self.stakes_per_outcome.set(outcome_index, updated);
        self.total_pool = pool;
        Ok(())
    }
}

/// Custodial share of the contract's token holdings bound to one market.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarketVault {
    pub market: MarketId,
    pub token: Address,
    pub balance: i128,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MarketState {
    Created,
    Staking,
    PendingResolution,
    Resolved,
    Closed,
}

impl MarketState {
    pub fn derive(market: &Market, now: u64, proposal_pending: bool) -> Self {
        if market.resolved {
            MarketState::Resolved
        } else if proposal_pending || !market.accepts_stakes(now) {
            MarketState::PendingResolution
        } else if market.total_pool == 0 {
            MarketState::Created
        } else {
            MarketState::Staking
        }
    }
}

// ===== STAKE LEDGER =====

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Prediction {
    pub market: MarketId,
    pub user: Address,
    pub outcome_index: u32,
    pub amount: i128,
    pub claimed: bool,
    pub staked_at: u64,
}

// ===== GOVERNANCE =====

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoteAuthority {
    pub market: MarketId,
    pub authority: Address,
    pub weight: i128,
    pub voted_outcome: Option<u32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoteResult {
    pub market: MarketId,
    pub tallies: Vec<i128>,
    pub total_weight: i128,
    pub votes_cast: u32,
    pub closed: bool,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProposalStatus {
    Pending,
    Challenged,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolutionProposal {
    pub market: MarketId,
    pub proposer: Address,
    pub outcome: u32,
    pub proposed_at: u64,
    pub challenge_deadline: u64,
    pub status: ProposalStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Challenge {
    pub market: MarketId,
    pub challenger: Address,
    pub bond: i128,
    pub evidence: String,
    pub challenged_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OracleReport {
    pub market: MarketId,
    pub resolver: Address,
    pub outcome: u32,
    pub confidence_bps: u32,
    pub evidence: String,
    pub reported_at: u64,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolutionMethod {
    AdminOverride,
    OracleReport,
    StakeWeightedVote,
    Challenge,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolutionRecord {
    pub market: MarketId,
    pub outcome: u32,
    pub method: ResolutionMethod,
    pub resolved_by: Address,
    pub resolved_at: u64,
}

// ===== PAYOUTS =====

/// Result of a payout computation for one winning prediction.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PayoutQuote {
    pub payout: i128,
    pub creator_cut: i128,
    pub protocol_cut: i128,
}
