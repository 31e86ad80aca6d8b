use soroban_sdk::{token, Address, Env, String};

use crate::admin::AdminAccessControl;
use crate::config::{ConfigManager, MAX_METADATA_LENGTH};
use crate::errors::{helpers, Error};
use crate::events::{BondSettledEvent, ChallengeEvent, EventEmitter, ProposalEvent};
use crate::markets::MarketStore;
use crate::storage::{DataKey, LedgerStore};
use crate::types::{Challenge, MarketId, ProposalStatus, ResolutionProposal};
use crate::utils::TimeUtils;
use crate::voting::VotingManager;

// ===== PROPOSE / CHALLENGE =====

/// Optimistic resolution: a tentative outcome stands unless someone posts a
/// bond against it before the challenge deadline.
pub struct DisputeManager;

impl DisputeManager {
    pub fn get_proposal(env: &Env, id: &MarketId) -> Result<ResolutionProposal, Error> {
        LedgerStore::get(env, &DataKey::Proposal(id.clone())).ok_or(Error::ProposalNotFound)
    }

    pub fn get_challenge(env: &Env, id: &MarketId) -> Option<Challenge> {
        LedgerStore::get(env, &DataKey::Challenge(id.clone()))
    }

    pub fn propose(
        env: &Env,
        proposer: &Address,
        id: &MarketId,
        outcome: u32,
    ) -> Result<ResolutionProposal, Error> {
        let config = ConfigManager::get_config(env)?;
        let market = MarketStore::load(env, id)?;
        if market.resolved {
            return Err(Error::AlreadyResolved);
        }
        if !AdminAccessControl::is_admin(env, proposer)? && !VotingManager::is_authority(env, id, proposer) {
            return Err(Error::Unauthorized);
        }
        let now = env.ledger().timestamp();
        if !market.deadline_passed(now) {
            return Err(Error::NotYetEligible);
        }
        helpers::require_valid_outcome(outcome, &market.outcomes)?;

        let key = DataKey::Proposal(id.clone());
        if LedgerStore::has(env, &key) {
            return Err(Error::AlreadyExists);
        }

        let proposal = ResolutionProposal {
            market: id.clone(),
            proposer: proposer.clone(),
            outcome,
            proposed_at: now,
            challenge_deadline: TimeUtils::add_window(now, config.challenge_window)?,
            status: ProposalStatus::Pending,
        };
        LedgerStore::set(env, &key, &proposal);

        EventEmitter::emit_proposal(
            env,
            ProposalEvent {
                market: id.clone(),
                proposer: proposer.clone(),
                outcome,
                challenge_deadline: proposal.challenge_deadline,
            },
        );
        Ok(proposal)
    }

    /// Posts the configured bond against a pending proposal.
    pub fn challenge(
        env: &Env,
        challenger: &Address,
        id: &MarketId,
        evidence: String,
    ) -> Result<Challenge, Error> {
        let config = ConfigManager::get_config(env)?;
        let market = MarketStore::load(env, id)?;
        if market.resolved {
            return Err(Error::AlreadyResolved);
        }
        let mut proposal = Self::get_proposal(env, id)?;
        if proposal.status == ProposalStatus::Challenged {
            return Err(Error::AlreadyExists);
        }
        let now = env.ledger().timestamp();
        if TimeUtils::is_deadline_passed(now, proposal.challenge_deadline) {
            return Err(Error::ChallengeWindowClosed);
        }
        helpers::require_string_length(&evidence, 0, MAX_METADATA_LENGTH)?;

        let bond = config.challenge_bond;
        if bond > 0 {
            let client = token::Client::new(env, &market.token);
            if client.balance(challenger) < bond {
                return Err(Error::InsufficientFunds);
            }
            client.transfer(challenger, &env.current_contract_address(), &bond);
        }

        let challenge = Challenge {
            market: id.clone(),
            challenger: challenger.clone(),
            bond,
            evidence,
            challenged_at: now,
        };
        LedgerStore::set(env, &DataKey::Challenge(id.clone()), &challenge);
        proposal.status = ProposalStatus::Challenged;
        LedgerStore::set(env, &DataKey::Proposal(id.clone()), &proposal);

        EventEmitter::emit_challenge(
            env,
            ChallengeEvent {
                market: id.clone(),
                challenger: challenger.clone(),
                bond,
            },
        );
        Ok(challenge)
    }

    /// Outcome of an unchallenged proposal whose window has elapsed.
    pub fn finalizable_outcome(env: &Env, id: &MarketId) -> Result<ResolutionProposal, Error> {
        let proposal = Self::get_proposal(env, id)?;
        if proposal.status == ProposalStatus::Challenged {
            return Err(Error::ResolutionChallenged);
        }
        if !TimeUtils::is_deadline_passed(env.ledger().timestamp(), proposal.challenge_deadline) {
            return Err(Error::NotYetEligible);
        }
        Ok(proposal)
    }

    /// Settles an open bond once the admin has decided the market. The bond goes
    /// back to the challenger if the proposal was overturned, and to the
    /// treasury otherwise. Returns whether a bond was refunded.
    pub fn settle_bond(env: &Env, id: &MarketId, decided_outcome: u32) -> Result<bool, Error> {
        let proposal: Option<ResolutionProposal> = LedgerStore::get(env, &DataKey::Proposal(id.clone()));
        let (proposal, challenge) = match (proposal, Self::get_challenge(env, id)) {
            (Some(p), Some(c)) if p.status == ProposalStatus::Challenged => (p, c),
            _ => return Ok(false),
        };

        let refunded = proposal.outcome != decided_outcome;
        if challenge.bond > 0 {
            let market = MarketStore::load(env, id)?;
            let recipient = if refunded {
                challenge.challenger.clone()
            } else {
                ConfigManager::get_config(env)?.treasury
            };
            token::Client::new(env, &market.token).transfer(
                &env.current_contract_address(),
                &recipient,
                &challenge.bond,
            );
        }

        EventEmitter::emit_bond_settled(
            env,
            BondSettledEvent {
                market: id.clone(),
                challenger: challenge.challenger,
                bond: challenge.bond,
                refunded,
            },
        );
        Ok(refunded)
    }
}
