use soroban_sdk::{token, Address, Env, String, Vec};

use crate::admin::AdminAccessControl;
use crate::config::{
    ConfigManager, ContractConfig, MAX_AI_SCORE, MAX_METADATA_LENGTH, MAX_OUTCOME_LENGTH,
    MAX_QUESTION_LENGTH, MIN_OUTCOMES,
};
use crate::errors::{helpers, Error};
use crate::events::{EventEmitter, MarketCreatedEvent};
use crate::fees::FeeCalculator;
use crate::profiles::ProfileManager;
use crate::stats::ProtocolAggregator;
use crate::storage::{DataKey, LedgerStore};
use crate::types::{Market, MarketId, MarketParams, MarketState, MarketType, MarketVault};
use crate::utils::{NumericUtils, TimeUtils};

// ===== MARKET CREATION =====

pub struct MarketCreator;

impl MarketCreator {
    /// Creates a market at the creator's next index along with its empty vault.
    pub fn create_market(env: &Env, creator: &Address, params: MarketParams) -> Result<MarketId, Error> {
        let config = ConfigManager::get_config(env)?;
        let now = env.ledger().timestamp();
        MarketValidator::validate_params(&params, &config, now)?;

        let mut profile = ProfileManager::creator_profile_or_new(env, creator)?;
        let creator_fee_bps = FeeCalculator::resolve_creator_fee_bps(
            params.creator_fee_bps,
            profile.tier,
            config.max_creator_fee_bps,
        )?;
        let ai_resolvable = params
            .ai_resolvable
            .unwrap_or(params.ai_score >= config.ai_resolvable_score);
        let deadline = match params.market_type {
            MarketType::TimeBound => Some(params.resolution_time),
            MarketType::OpenEnded => None,
        };

        let id = MarketId {
            creator: creator.clone(),
            index: profile.markets_created,
        };
        if LedgerStore::has(env, &DataKey::Market(id.clone()))
            || LedgerStore::has(env, &DataKey::ClosedMarket(id.clone()))
        {
            return Err(Error::AlreadyExists);
        }

        let mut stakes_per_outcome = Vec::new(env);
        for _ in 0..params.outcomes.len() {
            stakes_per_outcome.push_back(0i128);
        }

        let market = Market {
            id: id.clone(),
            question: params.question,
            outcomes: params.outcomes,
            market_type: params.market_type,
            deadline,
            ai_score: params.ai_score,
            ai_classification: params.ai_classification,
            ai_resolvable,
            resolver_authority: config.oracle_authority.clone(),
            metadata: params.metadata,
            creator_fee_bps,
            protocol_fee_bps: config.protocol_fee_bps,
            token: params.token.clone(),
            total_pool: 0,
            stakes_per_outcome,
            staker_count: 0,
            resolved: false,
            winning_outcome: None,
            claimed_winning_stake: 0,
            created_at: now,
        };
        MarketStore::save(env, &market);
        VaultManager::open(env, &id, &params.token);

        profile.markets_created = profile
            .markets_created
            .checked_add(1)
            .ok_or(Error::ArithmeticOverflow)?;
        ProfileManager::save_creator_profile(env, &profile);
        ProtocolAggregator::record_market_created(env)?;

        EventEmitter::emit_market_created(
            env,
            MarketCreatedEvent {
                market: id.clone(),
                outcome_count: market.outcome_count(),
                deadline,
                creator_fee_bps,
                ai_resolvable,
            },
        );
        Ok(id)
    }
}

// ===== MARKET VALIDATION =====

pub struct MarketValidator;

impl MarketValidator {
    pub fn validate_params(params: &MarketParams, config: &ContractConfig, now: u64) -> Result<(), Error> {
        helpers::require_string_length(&params.question, 1, MAX_QUESTION_LENGTH)?;
        Self::validate_outcomes(&params.outcomes, config.max_outcomes)?;
        helpers::require_string_length(&params.metadata, 0, MAX_METADATA_LENGTH)?;

        if params.ai_score > MAX_AI_SCORE {
            return Err(Error::InvalidArgument);
        }
        if params.market_type == MarketType::TimeBound
            && !TimeUtils::is_future_timestamp(now, params.resolution_time)
        {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }

    pub fn validate_outcomes(outcomes: &Vec<String>, max_outcomes: u32) -> Result<(), Error> {
        if outcomes.len() < MIN_OUTCOMES || outcomes.len() > max_outcomes {
            return Err(Error::InvalidArgument);
        }
        for outcome in outcomes.iter() {
            helpers::require_string_length(&outcome, 1, MAX_OUTCOME_LENGTH)?;
        }
        Ok(())
    }
}

// ===== MARKET STORAGE =====

pub struct MarketStore;

impl MarketStore {
    pub fn load(env: &Env, id: &MarketId) -> Result<Market, Error> {
        LedgerStore::get(env, &DataKey::Market(id.clone())).ok_or(Error::MarketNotFound)
    }

    pub fn save(env: &Env, market: &Market) {
        LedgerStore::set(env, &DataKey::Market(market.id.clone()), market);
    }

    pub fn is_closed(env: &Env, id: &MarketId) -> bool {
        LedgerStore::has(env, &DataKey::ClosedMarket(id.clone()))
    }
}

// ===== MARKET STATE =====

pub struct MarketStateManager;

impl MarketStateManager {
    pub fn get_state(env: &Env, id: &MarketId) -> Result<MarketState, Error> {
        if MarketStore::is_closed(env, id) {
            return Ok(MarketState::Closed);
        }
        let market = MarketStore::load(env, id)?;
        let proposal_pending = LedgerStore::has(env, &DataKey::Proposal(id.clone()));
        Ok(MarketState::derive(&market, env.ledger().timestamp(), proposal_pending))
    }

    /// Deletes a settled market. Only the admin or the market's creator may
    /// close it, and only after the vault has been fully paid out.
    pub fn close_market(env: &Env, caller: &Address, id: &MarketId) -> Result<(), Error> {
        let market = MarketStore::load(env, id)?;
        if market.creator() != caller && !AdminAccessControl::is_admin(env, caller)? {
            return Err(Error::Unauthorized);
        }
        if !market.resolved {
            return Err(Error::MarketNotResolved);
        }
        let vault = VaultManager::load(env, id)?;
        if vault.balance != 0 {
            return Err(Error::VaultNotEmpty);
        }

        // Resolution, Challenge, Prediction and VoteAuthority records stay
        // behind as the audit trail of who staked, voted and disputed.
        for key in [
            DataKey::Market(id.clone()),
            DataKey::MarketVault(id.clone()),
            DataKey::VoteResult(id.clone()),
            DataKey::Proposal(id.clone()),
            DataKey::OracleReport(id.clone()),
        ] {
            LedgerStore::remove(env, &key);
        }
        LedgerStore::set(env, &DataKey::ClosedMarket(id.clone()), &env.ledger().timestamp());

        EventEmitter::emit_market_closed(env, id, caller);
        Ok(())
    }
}

// ===== VAULT CUSTODY =====

/// Per-market share of the tokens held by the contract address.
pub struct VaultManager;

impl VaultManager {
    fn open(env: &Env, id: &MarketId, token: &Address) {
        let vault = MarketVault {
            market: id.clone(),
            token: token.clone(),
            balance: 0,
        };
        LedgerStore::set(env, &DataKey::MarketVault(id.clone()), &vault);
    }

    pub fn load(env: &Env, id: &MarketId) -> Result<MarketVault, Error> {
        LedgerStore::get(env, &DataKey::MarketVault(id.clone())).ok_or(Error::MarketNotFound)
    }

    /// Pulls `amount` from `from` into contract custody and credits the vault.
    pub fn deposit(env: &Env, id: &MarketId, from: &Address, amount: i128) -> Result<MarketVault, Error> {
        let mut vault = Self::load(env, id)?;
        let client = token::Client::new(env, &vault.token);
        if client.balance(from) < amount {
            return Err(Error::InsufficientFunds);
        }
        client.transfer(from, &env.current_contract_address(), &amount);

        vault.balance = NumericUtils::checked_add(vault.balance, amount)?;
        LedgerStore::set(env, &DataKey::MarketVault(id.clone()), &vault);
        Ok(vault)
    }

    /// Debits the vault and pays `amount` out of contract custody.
    pub fn withdraw(env: &Env, id: &MarketId, to: &Address, amount: i128) -> Result<MarketVault, Error> {
        let mut vault = Self::load(env, id)?;
        if amount <= 0 {
            return Ok(vault);
        }
        if vault.balance < amount {
            return Err(Error::InsufficientFunds);
        }
        vault.balance -= amount;
        LedgerStore::set(env, &DataKey::MarketVault(id.clone()), &vault);

        token::Client::new(env, &vault.token).transfer(&env.current_contract_address(), to, &amount);
        Ok(vault)
    }
}
