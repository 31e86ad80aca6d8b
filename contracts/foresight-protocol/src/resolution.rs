use soroban_sdk::{contracttype, Address, Env, String};

use crate::admin::AdminAccessControl;
use crate::config::{ConfigManager, MAX_CONFIDENCE_BPS, MAX_METADATA_LENGTH};
use crate::disputes::DisputeManager;
use crate::errors::{helpers, Error};
use crate::events::{EventEmitter, MarketResolvedEvent};
use crate::markets::MarketStore;
use crate::profiles::ProfileManager;
use crate::stats::ProtocolAggregator;
use crate::storage::{DataKey, LedgerStore};
use crate::types::{
    Market, MarketId, OracleReport, ProposalStatus, ResolutionMethod, ResolutionProposal,
    ResolutionRecord,
};
use crate::voting::VotingManager;

// ===== RESOLUTION STRATEGIES =====

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OracleSubmission {
    pub outcome: u32,
    pub confidence_bps: u32,
    pub evidence: String,
}

/// The ways a market can be decided. Exactly one of them writes the winner.
#[derive(Clone, Debug)]
pub enum ResolutionStrategy {
    /// Admin picks the outcome, or ratifies the pending proposal with `None`.
    AdminOverride(Option<u32>),
    OracleReport(OracleSubmission),
    StakeWeightedVote,
    /// Finalize an unchallenged proposal after its window.
    Challenge,
}

impl ResolutionStrategy {
    pub fn method(&self) -> ResolutionMethod {
        match self {
            ResolutionStrategy::AdminOverride(_) => ResolutionMethod::AdminOverride,
            ResolutionStrategy::OracleReport(_) => ResolutionMethod::OracleReport,
            ResolutionStrategy::StakeWeightedVote => ResolutionMethod::StakeWeightedVote,
            ResolutionStrategy::Challenge => ResolutionMethod::Challenge,
        }
    }
}

// ===== RESOLUTION ENGINE =====

pub struct ResolutionEngine;

impl ResolutionEngine {
    /// Decides the market through `strategy` and commits the result.
    ///
    /// `caller` must already have authorized the invocation where the
    /// strategy needs an identity (admin override, oracle report).
    pub fn resolve(
        env: &Env,
        id: &MarketId,
        caller: &Address,
        strategy: ResolutionStrategy,
    ) -> Result<u32, Error> {
        let mut market = MarketStore::load(env, id)?;
        if market.resolved {
            return Err(Error::AlreadyResolved);
        }
        let method = strategy.method();

        let (outcome, resolved_by) = match strategy {
            ResolutionStrategy::AdminOverride(outcome) => {
                Self::decide_by_admin(env, &market, caller, outcome)?
            }
            ResolutionStrategy::OracleReport(submission) => {
                Self::decide_by_oracle(env, &market, caller, submission)?
            }
            ResolutionStrategy::StakeWeightedVote => Self::decide_by_vote(env, &market, caller)?,
            ResolutionStrategy::Challenge => {
                let proposal = DisputeManager::finalizable_outcome(env, id)?;
                (proposal.outcome, proposal.proposer)
            }
        };

        Self::commit(env, &mut market, outcome, method, resolved_by)?;
        Ok(outcome)
    }

    fn pending_proposal(env: &Env, id: &MarketId) -> Option<ResolutionProposal> {
        LedgerStore::get(env, &DataKey::Proposal(id.clone()))
    }

    fn decide_by_admin(
        env: &Env,
        market: &Market,
        admin: &Address,
        outcome: Option<u32>,
    ) -> Result<(u32, Address), Error> {
        AdminAccessControl::require_admin(env, admin)?;
        let outcome = match outcome {
            Some(outcome) => outcome,
            None => {
                Self::pending_proposal(env, &market.id)
                    .ok_or(Error::InvalidArgument)?
                    .outcome
            }
        };
        helpers::require_valid_outcome(outcome, &market.outcomes)?;
        DisputeManager::settle_bond(env, &market.id, outcome)?;
        Ok((outcome, admin.clone()))
    }

    fn decide_by_oracle(
        env: &Env,
        market: &Market,
        resolver: &Address,
        submission: OracleSubmission,
    ) -> Result<(u32, Address), Error> {
        let config = ConfigManager::get_config(env)?;
        let mut record = ProfileManager::get_ai_resolver(env, resolver)?;
        if !record.active {
            return Err(Error::ResolverInactive);
        }
        if market.resolver_authority != *resolver {
            return Err(Error::Unauthorized);
        }
        if !market.ai_resolvable {
            return Err(Error::NotAiResolvable);
        }
        let now = env.ledger().timestamp();
        if !market.deadline_passed(now) {
            return Err(Error::NotYetEligible);
        }
        // A proposal settles only through its challenge window or the admin.
        if let Some(proposal) = Self::pending_proposal(env, &market.id) {
            return Err(match proposal.status {
                ProposalStatus::Challenged => Error::ResolutionChallenged,
                ProposalStatus::Pending => Error::ProposalPending,
            });
        }
        if submission.confidence_bps > MAX_CONFIDENCE_BPS
            || submission.confidence_bps < config.min_oracle_confidence_bps
        {
            return Err(Error::InvalidArgument);
        }
        helpers::require_valid_outcome(submission.outcome, &market.outcomes)?;
        helpers::require_string_length(&submission.evidence, 0, MAX_METADATA_LENGTH)?;

        let report = OracleReport {
            market: market.id.clone(),
            resolver: resolver.clone(),
            outcome: submission.outcome,
            confidence_bps: submission.confidence_bps,
            evidence: submission.evidence,
            reported_at: now,
        };
        LedgerStore::set(env, &DataKey::OracleReport(market.id.clone()), &report);

        record.resolutions = record.resolutions.saturating_add(1);
        ProfileManager::save_ai_resolver(env, &record);
        Ok((report.outcome, resolver.clone()))
    }

    fn decide_by_vote(env: &Env, market: &Market, caller: &Address) -> Result<(u32, Address), Error> {
        if !market.deadline_passed(env.ledger().timestamp()) {
            return Err(Error::NotYetEligible);
        }
        let outcome = VotingManager::close_and_tally(env, &market.id)?;
        Ok((outcome, caller.clone()))
    }

    /// Single writer of `winning_outcome`.
    fn commit(
        env: &Env,
        market: &mut Market,
        outcome: u32,
        method: ResolutionMethod,
        resolved_by: Address,
    ) -> Result<(), Error> {
        if market.resolved {
            return Err(Error::AlreadyResolved);
        }
        helpers::require_valid_outcome(outcome, &market.outcomes)?;

        market.resolved = true;
        market.winning_outcome = Some(outcome);
        MarketStore::save(env, market);

        let record = ResolutionRecord {
            market: market.id.clone(),
            outcome,
            method,
            resolved_by: resolved_by.clone(),
            resolved_at: env.ledger().timestamp(),
        };
        LedgerStore::set(env, &DataKey::Resolution(market.id.clone()), &record);
        ProtocolAggregator::record_resolution(env)?;

        EventEmitter::emit_market_resolved(
            env,
            MarketResolvedEvent {
                market: market.id.clone(),
                outcome,
                method,
                resolved_by,
            },
        );
        Ok(())
    }

    pub fn get_resolution(env: &Env, id: &MarketId) -> Option<ResolutionRecord> {
        LedgerStore::get(env, &DataKey::Resolution(id.clone()))
    }

    pub fn get_oracle_report(env: &Env, id: &MarketId) -> Option<OracleReport> {
        LedgerStore::get(env, &DataKey::OracleReport(id.clone()))
    }
}
