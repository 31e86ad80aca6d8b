use soroban_sdk::{Address, Env};

use crate::config::{ConfigManager, RestakePolicy};
use crate::errors::{helpers, Error};
use crate::events::{EventEmitter, StakePlacedEvent};
use crate::markets::{MarketStore, VaultManager};
use crate::profiles::ProfileManager;
use crate::stats::ProtocolAggregator;
use crate::storage::{DataKey, LedgerStore};
use crate::types::{MarketId, Prediction};
use crate::utils::NumericUtils;

// ===== STAKE LEDGER =====

pub struct StakeManager;

impl StakeManager {
    pub fn get_prediction(env: &Env, id: &MarketId, user: &Address) -> Result<Prediction, Error> {
        LedgerStore::get(env, &Self::key(id, user)).ok_or(Error::PredictionNotFound)
    }

    pub fn save_prediction(env: &Env, prediction: &Prediction) {
        LedgerStore::set(env, &Self::key(&prediction.market, &prediction.user), prediction);
    }

    fn key(id: &MarketId, user: &Address) -> DataKey {
        DataKey::Prediction(id.clone(), user.clone())
    }

    /// Escrows `amount` from `user` behind `outcome_index`.
    ///
    /// Checks run before any token moves, in this order: resolved, staking
    /// window, outcome and amount, restake policy, balance.
    pub fn stake(
        env: &Env,
        user: &Address,
        id: &MarketId,
        outcome_index: u32,
        amount: i128,
    ) -> Result<Prediction, Error> {
        let config = ConfigManager::get_config(env)?;
        let mut market = MarketStore::load(env, id)?;
        let now = env.ledger().timestamp();

        if market.resolved {
            return Err(Error::AlreadyResolved);
        }
        if !market.accepts_stakes(now) || LedgerStore::has(env, &DataKey::Proposal(id.clone())) {
            return Err(Error::StakingClosed);
        }
        helpers::require_valid_outcome(outcome_index, &market.outcomes)?;
        helpers::require_positive_amount(amount)?;
        if amount < config.min_stake {
            return Err(Error::InvalidArgument);
        }

        let existing: Option<Prediction> = LedgerStore::get(env, &Self::key(id, user));
        let mut prediction = match existing {
            Some(prediction) => {
                if config.restake_policy == RestakePolicy::SingleStake {
                    return Err(Error::AlreadyExists);
                }
                if prediction.outcome_index != outcome_index {
                    return Err(Error::OutcomeLocked);
                }
                prediction
            }
            None => Prediction {
                market: id.clone(),
                user: user.clone(),
                outcome_index,
                amount: 0,
                claimed: false,
                staked_at: now,
            },
        };
        let first_stake = prediction.amount == 0;

        VaultManager::deposit(env, id, user, amount)?;

        prediction.amount = NumericUtils::checked_add(prediction.amount, amount)?;
        prediction.staked_at = now;
        market.add_stake(outcome_index, amount)?;

        let mut profile = ProfileManager::user_profile_or_new(env, user)?;
        if first_stake {
            market.staker_count = market
                .staker_count
                .checked_add(1)
                .ok_or(Error::ArithmeticOverflow)?;
            profile.total_predictions = profile
                .total_predictions
                .checked_add(1)
                .ok_or(Error::ArithmeticOverflow)?;
            ProfileManager::save_user_profile(env, &profile);
        }

        Self::save_prediction(env, &prediction);
        MarketStore::save(env, &market);
        ProfileManager::add_creator_volume(env, market.creator(), amount)?;
        ProtocolAggregator::record_stake(env, amount)?;

        EventEmitter::emit_stake_placed(
            env,
            StakePlacedEvent {
                market: id.clone(),
                user: user.clone(),
                outcome_index,
                amount,
                total_pool: market.total_pool,
            },
        );
        Ok(prediction)
    }
}
