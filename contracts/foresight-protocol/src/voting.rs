use soroban_sdk::{Address, Env, Vec};

use crate::errors::{helpers, Error};
use crate::events::{EventEmitter, VoteCastEvent, VotingClosedEvent};
use crate::markets::MarketStore;
use crate::storage::{DataKey, LedgerStore};
use crate::types::{Market, MarketId, VoteAuthority, VoteResult};
use crate::utils::NumericUtils;

// ===== STAKE-WEIGHTED VOTING =====

pub struct VotingManager;

impl VotingManager {
    fn open_market(env: &Env, id: &MarketId) -> Result<Market, Error> {
        let market = MarketStore::load(env, id)?;
        if market.resolved {
            return Err(Error::AlreadyResolved);
        }
        Ok(market)
    }

    pub fn initialize_vote_result(env: &Env, id: &MarketId) -> Result<VoteResult, Error> {
        let market = Self::open_market(env, id)?;
        let key = DataKey::VoteResult(id.clone());
        if LedgerStore::has(env, &key) {
            return Err(Error::AlreadyExists);
        }

        let mut tallies = Vec::new(env);
        for _ in 0..market.outcome_count() {
            tallies.push_back(0i128);
        }
        let result = VoteResult {
            market: id.clone(),
            tallies,
            total_weight: 0,
            votes_cast: 0,
            closed: false,
        };
        LedgerStore::set(env, &key, &result);
        Ok(result)
    }

    pub fn register_vote_authority(
        env: &Env,
        id: &MarketId,
        authority: &Address,
        weight: i128,
    ) -> Result<VoteAuthority, Error> {
        helpers::require_positive_amount(weight)?;
        Self::open_market(env, id)?;
        let key = DataKey::VoteAuthority(id.clone(), authority.clone());
        if LedgerStore::has(env, &key) {
            return Err(Error::AlreadyExists);
        }

        let record = VoteAuthority {
            market: id.clone(),
            authority: authority.clone(),
            weight,
            voted_outcome: None,
        };
        LedgerStore::set(env, &key, &record);
        Ok(record)
    }

    pub fn is_authority(env: &Env, id: &MarketId, authority: &Address) -> bool {
        LedgerStore::has(env, &DataKey::VoteAuthority(id.clone(), authority.clone()))
    }

    pub fn get_vote_authority(env: &Env, id: &MarketId, authority: &Address) -> Result<VoteAuthority, Error> {
        LedgerStore::get(env, &DataKey::VoteAuthority(id.clone(), authority.clone()))
            .ok_or(Error::VoteAuthorityNotFound)
    }

    pub fn get_vote_result(env: &Env, id: &MarketId) -> Result<VoteResult, Error> {
        LedgerStore::get(env, &DataKey::VoteResult(id.clone())).ok_or(Error::VoteResultNotFound)
    }

    /// Records one weighted vote. Each authority votes at most once.
    pub fn cast_vote(env: &Env, authority: &Address, id: &MarketId, outcome: u32) -> Result<VoteResult, Error> {
        let market = Self::open_market(env, id)?;
        let mut result = Self::get_vote_result(env, id)?;
        if result.closed {
            return Err(Error::VotingClosed);
        }
        let mut record = Self::get_vote_authority(env, id, authority)?;
        if record.voted_outcome.is_some() {
            return Err(Error::AlreadyVoted);
        }
        helpers::require_valid_outcome(outcome, &market.outcomes)?;

        let tally = result.tallies.get(outcome).ok_or(Error::InvalidArgument)?;
        result
            .tallies
            .set(outcome, NumericUtils::checked_add(tally, record.weight)?);
        result.total_weight = NumericUtils::checked_add(result.total_weight, record.weight)?;
        result.votes_cast = result
            .votes_cast
            .checked_add(1)
            .ok_or(Error::ArithmeticOverflow)?;
        record.voted_outcome = Some(outcome);

        LedgerStore::set(env, &DataKey::VoteResult(id.clone()), &result);
        LedgerStore::set(env, &DataKey::VoteAuthority(id.clone(), authority.clone()), &record);

        EventEmitter::emit_vote_cast(
            env,
            VoteCastEvent {
                market: id.clone(),
                authority: authority.clone(),
                outcome,
                weight: record.weight,
            },
        );
        Ok(result)
    }

    /// Outcome with strictly the largest tally.
    pub fn leading_outcome(result: &VoteResult) -> Result<u32, Error> {
        if result.total_weight <= 0 {
            return Err(Error::NotYetEligible);
        }
        let mut best: Option<(u32, i128)> = None;
        let mut tied = false;
        for (index, tally) in result.tallies.iter().enumerate() {
            match best {
                Some((_, top)) if tally == top => tied = true,
                Some((_, top)) if tally < top => {}
                _ => {
                    best = Some((index as u32, tally));
                    tied = false;
                }
            }
        }
        match best {
            Some((outcome, _)) if !tied => Ok(outcome),
            _ => Err(Error::VoteTied),
        }
    }

    /// Stops further votes ahead of finalization. The tally is kept as is.
    pub fn close_voting(env: &Env, id: &MarketId) -> Result<VoteResult, Error> {
        Self::open_market(env, id)?;
        let mut result = Self::get_vote_result(env, id)?;
        if result.closed {
            return Err(Error::VotingClosed);
        }
        result.closed = true;
        LedgerStore::set(env, &DataKey::VoteResult(id.clone()), &result);

        EventEmitter::emit_voting_closed(
            env,
            VotingClosedEvent {
                market: id.clone(),
                total_weight: result.total_weight,
                votes_cast: result.votes_cast,
            },
        );
        Ok(result)
    }

    /// Closes voting if still open and returns the winner. Fails without side
    /// effects on a tie or an empty tally.
    pub fn close_and_tally(env: &Env, id: &MarketId) -> Result<u32, Error> {
        let mut result = Self::get_vote_result(env, id)?;
        let outcome = Self::leading_outcome(&result)?;
        if !result.closed {
            result.closed = true;
            LedgerStore::set(env, &DataKey::VoteResult(id.clone()), &result);
        }
        Ok(outcome)
    }
}
