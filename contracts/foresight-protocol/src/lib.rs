#![no_std]

mod admin;
mod config;
mod disputes;
mod errors;
mod events;
mod fees;
mod markets;
mod predictions;
mod profiles;
mod reentrancy;
mod resolution;
mod rewards;
mod stats;
mod storage;
mod types;
mod utils;
mod voting;

pub use config::{ContractConfig, Environment, RestakePolicy};
pub use errors::Error;
pub use resolution::OracleSubmission;
pub use storage::DataKey;
pub use types::*;

use soroban_sdk::{contract, contractimpl, symbol_short, Address, BytesN, Env, String, Vec};

use admin::{AdminAccessControl, AdminInitializer};
use config::ConfigManager;
use disputes::DisputeManager;
use markets::{MarketCreator, MarketStateManager, MarketStore, VaultManager};
use predictions::StakeManager;
use profiles::ProfileManager;
use reentrancy::protect_external_call;
use resolution::{ResolutionEngine, ResolutionStrategy};
use rewards::RewardDistributor;
use stats::ProtocolAggregator;
use storage::{AccountLocator, LedgerStore};
use voting::VotingManager;

#[contract]
pub struct ForesightProtocol;

#[contractimpl]
impl ForesightProtocol {
    // ===== SETUP =====

    /// Initializes the contract with an administrator, a fee treasury and one
    /// of the environment presets.
    ///
    /// The admin also becomes the default oracle authority assigned to new
    /// markets. Fails with `AlreadyExists` on a second call.
    pub fn initialize(
        env: Env,
        admin: Address,
        treasury: Address,
        environment: Environment,
    ) -> Result<ContractConfig, Error> {
        admin.require_auth();
        AdminInitializer::initialize(&env, &admin, &treasury, environment)
    }

    /// Same as `initialize` with a fully specified configuration.
    pub fn initialize_with_config(env: Env, admin: Address, config: ContractConfig) -> Result<(), Error> {
        admin.require_auth();
        AdminInitializer::initialize_with_config(&env, &admin, &config)
    }

    pub fn update_config(env: Env, admin: Address, config: ContractConfig) -> Result<(), Error> {
        admin.require_auth();
        AdminAccessControl::update_config(&env, &admin, &config)
    }

    pub fn get_config(env: Env) -> Result<ContractConfig, Error> {
        ConfigManager::get_config(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, Error> {
        AdminAccessControl::get_admin(&env)
    }

    // ===== PROFILES =====

    pub fn create_creator_profile(env: Env, creator: Address) -> Result<CreatorProfile, Error> {
        creator.require_auth();
        ProfileManager::create_creator_profile(&env, &creator)
    }

    /// Creates the user's profile and counts them in `total_users`.
    pub fn initialize_user_profile(env: Env, user: Address) -> Result<UserProfile, Error> {
        user.require_auth();
        ProfileManager::initialize_user_profile(&env, &user)
    }

    pub fn initialize_ai_resolver(env: Env, authority: Address) -> Result<AiResolver, Error> {
        authority.require_auth();
        ProfileManager::initialize_ai_resolver(&env, &authority)
    }

    pub fn set_ai_resolver_active(
        env: Env,
        admin: Address,
        authority: Address,
        active: bool,
    ) -> Result<AiResolver, Error> {
        admin.require_auth();
        AdminAccessControl::require_admin(&env, &admin)?;
        ProfileManager::set_ai_resolver_active(&env, &authority, active)
    }

    pub fn initialize_protocol_stats(env: Env, admin: Address) -> Result<ProtocolStats, Error> {
        admin.require_auth();
        AdminAccessControl::require_admin(&env, &admin)?;
        ProtocolAggregator::initialize(&env)
    }

    /// Raises the creator's tier to what their market count or volume earns.
    /// Never lowers it; returns the resulting tier.
    pub fn update_creator_tier(env: Env, admin: Address, creator: Address) -> Result<u32, Error> {
        admin.require_auth();
        AdminAccessControl::require_admin(&env, &admin)?;
        ProfileManager::update_creator_tier(&env, &creator)
    }

    /// Reconciles protocol counters against the listed live markets. Each
    /// counter becomes the larger of its current value and the recount.
    pub fn update_protocol_stats(
        env: Env,
        admin: Address,
        markets: Vec<MarketId>,
    ) -> Result<ProtocolStats, Error> {
        admin.require_auth();
        AdminAccessControl::require_admin(&env, &admin)?;
        ProtocolAggregator::reconcile(&env, &markets)
    }

    // ===== MARKETS =====

    /// Creates a prediction market and its vault.
    ///
    /// # Parameters
    ///
    /// * `creator` - Market owner. A creator profile is opened on first use and
    ///   the market takes the profile's next index.
    /// * `params` - Question, 2..=`max_outcomes` outcome labels, AI score and
    ///   classification, market type with its deadline, metadata, staking token
    ///   and the optional creator fee / AI-resolvable overrides.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - bad lengths, outcome count, AI score, a deadline
    ///   that is not in the future, or a creator fee above the cap.
    /// * `NotInitialized` - contract or protocol stats not initialized.
    pub fn create_market(env: Env, creator: Address, params: MarketParams) -> Result<MarketId, Error> {
        creator.require_auth();
        MarketCreator::create_market(&env, &creator, params)
    }

    pub fn close_market(env: Env, caller: Address, market: MarketId) -> Result<(), Error> {
        caller.require_auth();
        MarketStateManager::close_market(&env, &caller, &market)
    }

    // ===== STAKING =====

    /// Escrows `amount` of the market's token from `user` on `outcome_index`.
    ///
    /// # Errors
    ///
    /// * `AlreadyResolved` - the market has a winner.
    /// * `StakingClosed` - the deadline passed or a resolution was proposed.
    /// * `InvalidArgument` - outcome out of range, or amount below the minimum.
    /// * `OutcomeLocked` / `AlreadyExists` - restake rejected by the configured policy.
    /// * `InsufficientFunds` - the user's token balance is below `amount`.
    pub fn stake_prediction(
        env: Env,
        user: Address,
        market: MarketId,
        outcome_index: u32,
        amount: i128,
    ) -> Result<Prediction, Error> {
        user.require_auth();
        protect_external_call(&env, symbol_short!("stake"), || {
            StakeManager::stake(&env, &user, &market, outcome_index, amount)
        })
    }

    // ===== RESOLUTION =====

    /// Oracle path: the market's resolver authority reports an outcome with a
    /// confidence score once the deadline has passed.
    pub fn resolve_market_via_ai(
        env: Env,
        resolver: Address,
        market: MarketId,
        outcome: u32,
        confidence_bps: u32,
        evidence: String,
    ) -> Result<u32, Error> {
        resolver.require_auth();
        let submission = OracleSubmission {
            outcome,
            confidence_bps,
            evidence,
        };
        ResolutionEngine::resolve(
            &env,
            &market,
            &resolver,
            ResolutionStrategy::OracleReport(submission),
        )
    }

    /// Admin override. May run before the deadline. With `outcome = None` the
    /// pending proposal is ratified. An open challenge bond is refunded when
    /// the decision differs from the proposal and forfeited otherwise.
    pub fn resolve_market(env: Env, admin: Address, market: MarketId, outcome: Option<u32>) -> Result<u32, Error> {
        admin.require_auth();
        ResolutionEngine::resolve(&env, &market, &admin, ResolutionStrategy::AdminOverride(outcome))
    }

    pub fn register_vote_authority(
        env: Env,
        admin: Address,
        market: MarketId,
        authority: Address,
        weight: i128,
    ) -> Result<VoteAuthority, Error> {
        admin.require_auth();
        AdminAccessControl::require_admin(&env, &admin)?;
        VotingManager::register_vote_authority(&env, &market, &authority, weight)
    }

    pub fn initialize_vote_result(env: Env, admin: Address, market: MarketId) -> Result<VoteResult, Error> {
        admin.require_auth();
        AdminAccessControl::require_admin(&env, &admin)?;
        VotingManager::initialize_vote_result(&env, &market)
    }

    pub fn stake_weighted_vote(
        env: Env,
        authority: Address,
        market: MarketId,
        outcome: u32,
    ) -> Result<VoteResult, Error> {
        authority.require_auth();
        VotingManager::cast_vote(&env, &authority, &market, outcome)
    }

    /// Stops further votes. `finalize_resolution` still tallies after the
    /// deadline; a tie then needs an admin override.
    pub fn close_voting(env: Env, admin: Address, market: MarketId) -> Result<VoteResult, Error> {
        admin.require_auth();
        AdminAccessControl::require_admin(&env, &admin)?;
        VotingManager::close_voting(&env, &market)
    }

    /// Records a tentative outcome that becomes final unless challenged within
    /// the configured window. Admin or a registered vote authority only.
    pub fn propose_resolution(
        env: Env,
        proposer: Address,
        market: MarketId,
        outcome: u32,
    ) -> Result<ResolutionProposal, Error> {
        proposer.require_auth();
        DisputeManager::propose(&env, &proposer, &market, outcome)
    }

    /// Posts the challenge bond against the pending proposal.
    pub fn challenge_resolution(
        env: Env,
        challenger: Address,
        market: MarketId,
        evidence: String,
    ) -> Result<Challenge, Error> {
        challenger.require_auth();
        protect_external_call(&env, symbol_short!("challenge"), || {
            DisputeManager::challenge(&env, &challenger, &market, evidence)
        })
    }

    /// Permissionless. Finalizes the pending proposal once its window has
    /// elapsed or, without a proposal, tallies the stake-weighted vote.
    pub fn finalize_resolution(env: Env, market: MarketId) -> Result<u32, Error> {
        let strategy = if LedgerStore::has(&env, &DataKey::Proposal(market.clone())) {
            ResolutionStrategy::Challenge
        } else {
            ResolutionStrategy::StakeWeightedVote
        };
        let caller = env.current_contract_address();
        ResolutionEngine::resolve(&env, &market, &caller, strategy)
    }

    // ===== PAYOUTS =====

    /// Pays a winning prediction.
    ///
    /// The claimant receives `amount * (P - creator_fee - protocol_fee) / W`,
    /// where `P` is the pool and `W` the winning side's total stake. The
    /// claimant's pro-rata shares of both fees go to the creator and the
    /// treasury in the same call.
    ///
    /// # Errors
    ///
    /// `MarketNotResolved`, `PredictionNotFound`, `AlreadyClaimed`,
    /// `NotWinningOutcome`, checked in that order.
    pub fn claim_reward(env: Env, user: Address, market: MarketId) -> Result<i128, Error> {
        user.require_auth();
        protect_external_call(&env, symbol_short!("claim"), || {
            RewardDistributor::claim(&env, &user, &market)
        })
    }

    /// Sends rounding dust, or the whole pool when no one backed the winner,
    /// to the treasury after every winner has claimed.
    pub fn sweep_vault(env: Env, admin: Address, market: MarketId) -> Result<i128, Error> {
        admin.require_auth();
        AdminAccessControl::require_admin(&env, &admin)?;
        protect_external_call(&env, symbol_short!("sweep"), || {
            RewardDistributor::sweep(&env, &market)
        })
    }

    pub fn quote_payout(env: Env, user: Address, market: MarketId) -> Result<PayoutQuote, Error> {
        RewardDistributor::quote(&env, &user, &market)
    }

    // ===== QUERIES =====

    pub fn get_market(env: Env, market: MarketId) -> Result<Market, Error> {
        MarketStore::load(&env, &market)
    }

    pub fn get_market_state(env: Env, market: MarketId) -> Result<MarketState, Error> {
        MarketStateManager::get_state(&env, &market)
    }

    pub fn get_vault(env: Env, market: MarketId) -> Result<MarketVault, Error> {
        VaultManager::load(&env, &market)
    }

    pub fn get_prediction(env: Env, market: MarketId, user: Address) -> Result<Prediction, Error> {
        StakeManager::get_prediction(&env, &market, &user)
    }

    pub fn get_creator_profile(env: Env, creator: Address) -> Result<CreatorProfile, Error> {
        ProfileManager::get_creator_profile(&env, &creator)
    }

    pub fn get_user_profile(env: Env, user: Address) -> Result<UserProfile, Error> {
        ProfileManager::get_user_profile(&env, &user)
    }

    pub fn get_ai_resolver(env: Env, authority: Address) -> Result<AiResolver, Error> {
        ProfileManager::get_ai_resolver(&env, &authority)
    }

    pub fn get_protocol_stats(env: Env) -> Result<ProtocolStats, Error> {
        ProtocolAggregator::load(&env)
    }

    pub fn get_vote_result(env: Env, market: MarketId) -> Result<VoteResult, Error> {
        VotingManager::get_vote_result(&env, &market)
    }

    pub fn get_vote_authority(env: Env, market: MarketId, authority: Address) -> Result<VoteAuthority, Error> {
        VotingManager::get_vote_authority(&env, &market, &authority)
    }

    pub fn get_proposal(env: Env, market: MarketId) -> Result<ResolutionProposal, Error> {
        DisputeManager::get_proposal(&env, &market)
    }

    pub fn get_challenge(env: Env, market: MarketId) -> Option<Challenge> {
        DisputeManager::get_challenge(&env, &market)
    }

    pub fn get_oracle_report(env: Env, market: MarketId) -> Option<OracleReport> {
        ResolutionEngine::get_oracle_report(&env, &market)
    }

    pub fn get_resolution(env: Env, market: MarketId) -> Option<ResolutionRecord> {
        ResolutionEngine::get_resolution(&env, &market)
    }

    /// 32-byte location of any engine record, for off-chain indexers.
    pub fn derive_location(env: Env, key: DataKey) -> BytesN<32> {
        AccountLocator::locate(&env, &key)
    }
}

mod test;
