use soroban_sdk::{Address, Env};

use crate::config::ConfigManager;
use crate::errors::Error;
use crate::events::{ClaimEvent, EventEmitter, VaultSweptEvent};
use crate::fees::FeeCalculator;
use crate::markets::{MarketStore, VaultManager};
use crate::predictions::StakeManager;
use crate::profiles::ProfileManager;
use crate::stats::ProtocolAggregator;
use crate::types::{MarketId, PayoutQuote};
use crate::utils::NumericUtils;

// ===== REWARD DISTRIBUTION =====

pub struct RewardDistributor;

impl RewardDistributor {
    /// What `user` would receive if they claimed now. Zero for losing or
    /// already claimed predictions.
    pub fn quote(env: &Env, user: &Address, id: &MarketId) -> Result<PayoutQuote, Error> {
        let market = MarketStore::load(env, id)?;
        if !market.resolved {
            return Err(Error::MarketNotResolved);
        }
        let prediction = StakeManager::get_prediction(env, id, user)?;
        if prediction.claimed || Some(prediction.outcome_index) != market.winning_outcome {
            return Ok(PayoutQuote::default());
        }
        let vault = VaultManager::load(env, id)?;
        Ok(FeeCalculator::cap_to_balance(
            FeeCalculator::quote(&market, prediction.amount)?,
            vault.balance,
        ))
    }

    /// Pays a winning prediction and its share of the creator and protocol
    /// fees in one batch. Returns the claimant's payout.
    pub fn claim(env: &Env, user: &Address, id: &MarketId) -> Result<i128, Error> {
        let mut market = MarketStore::load(env, id)?;
        if !market.resolved {
            return Err(Error::MarketNotResolved);
        }
        let mut prediction = StakeManager::get_prediction(env, id, user)?;
        if prediction.claimed {
            return Err(Error::AlreadyClaimed);
        }
        if Some(prediction.outcome_index) != market.winning_outcome {
            return Err(Error::NotWinningOutcome);
        }

        let treasury = ConfigManager::get_config(env)?.treasury;
        let vault = VaultManager::load(env, id)?;
        let quote = FeeCalculator::cap_to_balance(
            FeeCalculator::quote(&market, prediction.amount)?,
            vault.balance,
        );

        prediction.claimed = true;
        StakeManager::save_prediction(env, &prediction);
        market.claimed_winning_stake =
            NumericUtils::checked_add(market.claimed_winning_stake, prediction.amount)?;
        MarketStore::save(env, &market);

        VaultManager::withdraw(env, id, user, quote.payout)?;
        VaultManager::withdraw(env, id, market.creator(), quote.creator_cut)?;
        VaultManager::withdraw(env, id, &treasury, quote.protocol_cut)?;

        let mut profile = ProfileManager::user_profile_or_new(env, user)?;
        profile.winning_predictions = profile
            .winning_predictions
            .checked_add(1)
            .ok_or(Error::ArithmeticOverflow)?;
        profile.total_winnings = NumericUtils::checked_add(profile.total_winnings, quote.payout)?;
        ProfileManager::save_user_profile(env, &profile);
        ProtocolAggregator::record_payout(env, quote.payout)?;

        EventEmitter::emit_claim(
            env,
            ClaimEvent {
                market: id.clone(),
                user: user.clone(),
                payout: quote.payout,
                creator_cut: quote.creator_cut,
                protocol_cut: quote.protocol_cut,
            },
        );
        Ok(quote.payout)
    }

    /// Moves what is left in the vault to the treasury once every winning
    /// stake has been paid. With no winning stake at all, that is the whole pool.
    pub fn sweep(env: &Env, id: &MarketId) -> Result<i128, Error> {
        let market = MarketStore::load(env, id)?;
        if !market.resolved {
            return Err(Error::MarketNotResolved);
        }
        let winning_stake = market.winning_stake().ok_or(Error::MarketNotResolved)?;
        if market.claimed_winning_stake < winning_stake {
            return Err(Error::NotYetEligible);
        }

        let treasury = ConfigManager::get_config(env)?.treasury;
        let amount = VaultManager::load(env, id)?.balance;
        VaultManager::withdraw(env, id, &treasury, amount)?;

        EventEmitter::emit_vault_swept(
            env,
            VaultSweptEvent {
                market: id.clone(),
                treasury,
                amount,
            },
        );
        Ok(amount)
    }
}
