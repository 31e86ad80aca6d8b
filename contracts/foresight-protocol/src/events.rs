use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::config::ContractConfig;
use crate::types::{MarketId, ResolutionMethod};

// ===== EVENT PAYLOADS =====
//
// Topics are `(name, market creator, market index)` for per-market events so
// indexers can filter on a single market without decoding the payload.

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub treasury: Address,
    pub protocol_fee_bps: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VotingClosedEvent {
    pub market: MarketId,
    pub total_weight: i128,
    pub votes_cast: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarketCreatedEvent {
    pub market: MarketId,
    pub outcome_count: u32,
    pub deadline: Option<u64>,
    pub creator_fee_bps: u32,
    pub ai_resolvable: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakePlacedEvent {
    pub market: MarketId,
    pub user: Address,
    pub outcome_index: u32,
    pub amount: i128,
    pub total_pool: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarketResolvedEvent {
    pub market: MarketId,
    pub outcome: u32,
    pub method: ResolutionMethod,
    pub resolved_by: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProposalEvent {
    pub market: MarketId,
    pub proposer: Address,
    pub outcome: u32,
    pub challenge_deadline: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChallengeEvent {
    pub market: MarketId,
    pub challenger: Address,
    pub bond: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BondSettledEvent {
    pub market: MarketId,
    pub challenger: Address,
    pub bond: i128,
    pub refunded: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoteCastEvent {
    pub market: MarketId,
    pub authority: Address,
    pub outcome: u32,
    pub weight: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimEvent {
    pub market: MarketId,
    pub user: Address,
    pub payout: i128,
    pub creator_cut: i128,
    pub protocol_cut: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultSweptEvent {
    pub market: MarketId,
    pub treasury: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TierUpdatedEvent {
    pub creator: Address,
    pub previous_tier: u32,
    pub tier: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatsReconciledEvent {
    pub markets_scanned: u32,
    pub total_markets: u64,
    pub total_stakes: u64,
    pub total_volume: i128,
}

// ===== EMITTER =====

pub struct EventEmitter;

impl EventEmitter {
    fn market_topics(name: Symbol, market: &MarketId) -> (Symbol, Address, u32) {
        (name, market.creator.clone(), market.index)
    }

    pub fn emit_initialized(env: &Env, admin: &Address, config: &ContractConfig) {
        env.events().publish(
            (symbol_short!("init"),),
            InitializedEvent {
                admin: admin.clone(),
                treasury: config.treasury.clone(),
                protocol_fee_bps: config.protocol_fee_bps,
            },
        );
    }

    pub fn emit_config_updated(env: &Env, admin: &Address, config: &ContractConfig) {
        env.events()
            .publish((symbol_short!("cfg_upd"), admin.clone()), config.clone());
    }

    pub fn emit_profile_created(env: &Env, kind: Symbol, owner: &Address) {
        env.events()
            .publish((symbol_short!("profile"), kind), owner.clone());
    }

    pub fn emit_resolver_status(env: &Env, authority: &Address, active: bool) {
        env.events()
            .publish((symbol_short!("resolver"), authority.clone()), active);
    }

    pub fn emit_market_created(env: &Env, event: MarketCreatedEvent) {
        let topics = Self::market_topics(symbol_short!("mkt_new"), &event.market);
        env.events().publish(topics, event);
    }

    pub fn emit_stake_placed(env: &Env, event: StakePlacedEvent) {
        let topics = Self::market_topics(symbol_short!("stake"), &event.market);
        env.events().publish(topics, event);
    }

    pub fn emit_market_resolved(env: &Env, event: MarketResolvedEvent) {
        let topics = Self::market_topics(symbol_short!("resolved"), &event.market);
        env.events().publish(topics, event);
    }

    pub fn emit_proposal(env: &Env, event: ProposalEvent) {
        let topics = Self::market_topics(symbol_short!("proposal"), &event.market);
        env.events().publish(topics, event);
    }

    pub fn emit_challenge(env: &Env, event: ChallengeEvent) {
        let topics = Self::market_topics(symbol_short!("challenge"), &event.market);
        env.events().publish(topics, event);
    }

    pub fn emit_bond_settled(env: &Env, event: BondSettledEvent) {
        let topics = Self::market_topics(symbol_short!("bond"), &event.market);
        env.events().publish(topics, event);
    }

    pub fn emit_vote_cast(env: &Env, event: VoteCastEvent) {
        let topics = Self::market_topics(symbol_short!("vote"), &event.market);
        env.events().publish(topics, event);
    }

    pub fn emit_voting_closed(env: &Env, event: VotingClosedEvent) {
        let topics = Self::market_topics(symbol_short!("vote_end"), &event.market);
        env.events().publish(topics, event);
    }

    pub fn emit_claim(env: &Env, event: ClaimEvent) {
        let topics = Self::market_topics(symbol_short!("claim"), &event.market);
        env.events().publish(topics, event);
    }

    pub fn emit_vault_swept(env: &Env, event: VaultSweptEvent) {
        let topics = Self::market_topics(symbol_short!("sweep"), &event.market);
        env.events().publish(topics, event);
    }

    pub fn emit_market_closed(env: &Env, market: &MarketId, closed_by: &Address) {
        let topics = Self::market_topics(symbol_short!("closed"), market);
        env.events().publish(topics, closed_by.clone());
    }

    pub fn emit_tier_updated(env: &Env, event: TierUpdatedEvent) {
        env.events()
            .publish((symbol_short!("tier"), event.creator.clone()), event);
    }

    pub fn emit_stats_reconciled(env: &Env, event: StatsReconciledEvent) {
        env.events().publish((symbol_short!("stats"),), event);
    }
}
