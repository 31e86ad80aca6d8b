use soroban_sdk::{symbol_short, Address, Env};

use crate::config::ONE_TOKEN;
use crate::errors::Error;
use crate::events::{EventEmitter, TierUpdatedEvent};
use crate::stats::ProtocolAggregator;
use crate::storage::{DataKey, LedgerStore};
use crate::types::{AiResolver, CreatorProfile, UserProfile};
use crate::utils::NumericUtils;

// ===== TIER THRESHOLDS =====

/// Markets a creator must have opened to reach tiers 1..=3.
pub const TIER_MARKET_THRESHOLDS: [u32; 3] = [5, 25, 100];
/// Volume (in whole tokens) a creator must have attracted to reach tiers 1..=3.
pub const TIER_VOLUME_THRESHOLDS: [i128; 3] = [1_000, 10_000, 100_000];

// ===== CREATOR TIERS =====

pub struct TierCalculator;

impl TierCalculator {
    /// Highest tier whose market-count OR volume threshold is met.
    pub fn compute(markets_created: u32, total_volume: i128) -> u32 {
        let mut tier = 0;
        for i in 0..TIER_MARKET_THRESHOLDS.len() {
            let volume_threshold = TIER_VOLUME_THRESHOLDS[i].saturating_mul(ONE_TOKEN);
            if markets_created >= TIER_MARKET_THRESHOLDS[i] || total_volume >= volume_threshold {
                tier = i as u32 + 1;
            }
        }
        tier
    }
}

// ===== PROFILE MANAGER =====

pub struct ProfileManager;

impl ProfileManager {
    pub fn create_creator_profile(env: &Env, creator: &Address) -> Result<CreatorProfile, Error> {
        let key = DataKey::CreatorProfile(creator.clone());
        if LedgerStore::has(env, &key) {
            return Err(Error::AlreadyExists);
        }
        let profile = CreatorProfile::new(env, creator.clone());
        LedgerStore::set(env, &key, &profile);
        EventEmitter::emit_profile_created(env, symbol_short!("creator"), creator);
        Ok(profile)
    }

    pub fn get_creator_profile(env: &Env, creator: &Address) -> Result<CreatorProfile, Error> {
        LedgerStore::get(env, &DataKey::CreatorProfile(creator.clone())).ok_or(Error::ProfileNotFound)
    }

    pub fn creator_profile_or_new(env: &Env, creator: &Address) -> Result<CreatorProfile, Error> {
        match LedgerStore::get(env, &DataKey::CreatorProfile(creator.clone())) {
            Some(profile) => Ok(profile),
            None => Self::create_creator_profile(env, creator),
        }
    }

    pub fn save_creator_profile(env: &Env, profile: &CreatorProfile) {
        LedgerStore::set(env, &DataKey::CreatorProfile(profile.creator.clone()), profile);
    }

    pub fn add_creator_volume(env: &Env, creator: &Address, amount: i128) -> Result<(), Error> {
        let mut profile = Self::creator_profile_or_new(env, creator)?;
        profile.total_volume = NumericUtils::checked_add(profile.total_volume, amount)?;
        Self::save_creator_profile(env, &profile);
        Ok(())
    }

    /// Raises the stored tier to the computed one. A tier never goes down.
    pub fn update_creator_tier(env: &Env, creator: &Address) -> Result<u32, Error> {
        let mut profile = Self::get_creator_profile(env, creator)?;
        let previous_tier = profile.tier;
        let computed = TierCalculator::compute(profile.markets_created, profile.total_volume);
        profile.tier = previous_tier.max(computed);

        if profile.tier != previous_tier {
            Self::save_creator_profile(env, &profile);
            EventEmitter::emit_tier_updated(
                env,
                TierUpdatedEvent {
                    creator: creator.clone(),
                    previous_tier,
                    tier: profile.tier,
                },
            );
        }
        Ok(profile.tier)
    }

    pub fn initialize_user_profile(env: &Env, user: &Address) -> Result<UserProfile, Error> {
        let key = DataKey::UserProfile(user.clone());
        if LedgerStore::has(env, &key) {
            return Err(Error::AlreadyExists);
        }
        let profile = UserProfile::new(user.clone());
        LedgerStore::set(env, &key, &profile);
        ProtocolAggregator::record_user(env)?;
        EventEmitter::emit_profile_created(env, symbol_short!("user"), user);
        Ok(profile)
    }

    pub fn get_user_profile(env: &Env, user: &Address) -> Result<UserProfile, Error> {
        LedgerStore::get(env, &DataKey::UserProfile(user.clone())).ok_or(Error::ProfileNotFound)
    }

    pub fn user_profile_or_new(env: &Env, user: &Address) -> Result<UserProfile, Error> {
        match LedgerStore::get(env, &DataKey::UserProfile(user.clone())) {
            Some(profile) => Ok(profile),
            None => Self::initialize_user_profile(env, user),
        }
    }

    pub fn save_user_profile(env: &Env, profile: &UserProfile) {
        LedgerStore::set(env, &DataKey::UserProfile(profile.user.clone()), profile);
    }

    pub fn initialize_ai_resolver(env: &Env, authority: &Address) -> Result<AiResolver, Error> {
        let key = DataKey::AiResolver(authority.clone());
        if LedgerStore::has(env, &key) {
            return Err(Error::AlreadyExists);
        }
        let resolver = AiResolver {
            authority: authority.clone(),
            active: true,
            resolutions: 0,
        };
        LedgerStore::set(env, &key, &resolver);
        EventEmitter::emit_resolver_status(env, authority, true);
        Ok(resolver)
    }

    pub fn get_ai_resolver(env: &Env, authority: &Address) -> Result<AiResolver, Error> {
        LedgerStore::get(env, &DataKey::AiResolver(authority.clone())).ok_or(Error::ResolverNotFound)
    }

    pub fn save_ai_resolver(env: &Env, resolver: &AiResolver) {
        LedgerStore::set(env, &DataKey::AiResolver(resolver.authority.clone()), resolver);
    }

    pub fn set_ai_resolver_active(env: &Env, authority: &Address, active: bool) -> Result<AiResolver, Error> {
        let mut resolver = Self::get_ai_resolver(env, authority)?;
        resolver.active = active;
        Self::save_ai_resolver(env, &resolver);
        EventEmitter::emit_resolver_status(env, authority, active);
        Ok(resolver)
    }
}
