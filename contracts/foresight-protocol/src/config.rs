use soroban_sdk::{contracttype, Address, Env};

use crate::errors::Error;
use crate::storage::{DataKey, LedgerStore};
use crate::utils::TimeUtils;

// ===== CONSTANTS =====

/// One whole token in base units (Stellar assets carry 7 decimals).
pub const ONE_TOKEN: i128 = 10_000_000;

pub const MAX_QUESTION_LENGTH: u32 = 500;
pub const MAX_OUTCOME_LENGTH: u32 = 100;
pub const MAX_METADATA_LENGTH: u32 = 500;
pub const MIN_OUTCOMES: u32 = 2;
pub const MAX_AI_SCORE: u32 = 100;
pub const MAX_CONFIDENCE_BPS: u32 = 10_000;

pub const DEFAULT_PROTOCOL_FEE_BPS: u32 = 100;
pub const DEFAULT_MAX_CREATOR_FEE_BPS: u32 = 1_000;
pub const DEFAULT_MAX_OUTCOMES: u32 = 10;
pub const DEFAULT_MIN_ORACLE_CONFIDENCE_BPS: u32 = 5_000;
pub const DEFAULT_AI_RESOLVABLE_SCORE: u32 = 70;

/// Upper bound for any fee rate the admin can configure.
pub const FEE_CAP_BPS: u32 = 2_500;
/// Upper bound for `max_outcomes`.
pub const OUTCOME_LIMIT: u32 = 32;

// ===== TYPES =====

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Environment {
    Development,
    Testnet,
    Mainnet,
}

/// What happens when a user stakes a second time on the same market.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RestakePolicy {
    /// Add to the existing prediction if it backs the same outcome.
    AccumulateSameOutcome,
    /// One stake per user per market.
    SingleStake,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractConfig {
    pub environment: Environment,
    pub treasury: Address,
    pub oracle_authority: Address,
    pub protocol_fee_bps: u32,
    pub max_creator_fee_bps: u32,
    pub max_outcomes: u32,
    pub min_stake: i128,
    pub challenge_window: u64,
    pub challenge_bond: i128,
    pub min_oracle_confidence_bps: u32,
    pub ai_resolvable_score: u32,
    pub restake_policy: RestakePolicy,
}

// ===== CONFIG MANAGER =====

pub struct ConfigManager;

impl ConfigManager {
    /// Short challenge window and small bond, for local testing.
    pub fn get_development_config(treasury: &Address, oracle_authority: &Address) -> ContractConfig {
        ContractConfig {
            environment: Environment::Development,
            treasury: treasury.clone(),
            oracle_authority: oracle_authority.clone(),
            protocol_fee_bps: DEFAULT_PROTOCOL_FEE_BPS,
            max_creator_fee_bps: DEFAULT_MAX_CREATOR_FEE_BPS,
            max_outcomes: DEFAULT_MAX_OUTCOMES,
            min_stake: 1,
            challenge_window: TimeUtils::hours_to_seconds(1),
            challenge_bond: ONE_TOKEN,
            min_oracle_confidence_bps: DEFAULT_MIN_ORACLE_CONFIDENCE_BPS,
            ai_resolvable_score: DEFAULT_AI_RESOLVABLE_SCORE,
            restake_policy: RestakePolicy::AccumulateSameOutcome,
        }
    }

    pub fn get_testnet_config(treasury: &Address, oracle_authority: &Address) -> ContractConfig {
        ContractConfig {
            environment: Environment::Testnet,
            min_stake: ONE_TOKEN / 10,
            challenge_window: TimeUtils::hours_to_seconds(24),
            challenge_bond: 10 * ONE_TOKEN,
            ..Self::get_development_config(treasury, oracle_authority)
        }
    }

    pub fn get_mainnet_config(treasury: &Address, oracle_authority: &Address) -> ContractConfig {
        ContractConfig {
            environment: Environment::Mainnet,
            min_stake: ONE_TOKEN,
            challenge_window: TimeUtils::days_to_seconds(3),
            challenge_bond: 100 * ONE_TOKEN,
            min_oracle_confidence_bps: 7_500,
            ..Self::get_development_config(treasury, oracle_authority)
        }
    }

    pub fn for_environment(
        environment: Environment,
        treasury: &Address,
        oracle_authority: &Address,
    ) -> ContractConfig {
        match environment {
            Environment::Development => Self::get_development_config(treasury, oracle_authority),
            Environment::Testnet => Self::get_testnet_config(treasury, oracle_authority),
            Environment::Mainnet => Self::get_mainnet_config(treasury, oracle_authority),
        }
    }

    pub fn validate_config(config: &ContractConfig) -> Result<(), Error> {
        if config.protocol_fee_bps > FEE_CAP_BPS || config.max_creator_fee_bps > FEE_CAP_BPS {
            return Err(Error::InvalidConfig);
        }
        if config.max_outcomes < MIN_OUTCOMES || config.max_outcomes > OUTCOME_LIMIT {
            return Err(Error::InvalidConfig);
        }
        if config.min_stake <= 0 || config.challenge_bond < 0 {
            return Err(Error::InvalidConfig);
        }
        if config.min_oracle_confidence_bps > MAX_CONFIDENCE_BPS
            || config.ai_resolvable_score > MAX_AI_SCORE
        {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }

    pub fn store_config(env: &Env, config: &ContractConfig) -> Result<(), Error> {
        Self::validate_config(config)?;
        LedgerStore::set_instance(env, &DataKey::Config, config);
        Ok(())
    }

    pub fn get_config(env: &Env) -> Result<ContractConfig, Error> {
        LedgerStore::get_instance(env, &DataKey::Config).ok_or(Error::NotInitialized)
    }
}
