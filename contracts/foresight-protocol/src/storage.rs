use soroban_sdk::{contracttype, xdr::ToXdr, Address, Bytes, BytesN, Env, IntoVal, TryFromVal, Val};

use crate::types::MarketId;

/// Ledger TTL management, in ledgers (~5s each).
pub const DAY_IN_LEDGERS: u32 = 17280;
pub const BUMP_THRESHOLD: u32 = 14 * DAY_IN_LEDGERS;
pub const BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;

// ===== ACCOUNT ADDRESSING =====

/// Deterministic location of every engine entity.
///
/// The variant is the namespace tag and its fields are the key tuple. The host
/// stores each entry under the XDR encoding of the key, so two keys collide only
/// if namespace and every component are equal. No directory of accounts is kept:
/// any caller holding the identities recomputes the same key.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Admin,
    Config,
    ReentrancyLock,
    ProtocolStats,
    CreatorProfile(Address),
    UserProfile(Address),
    AiResolver(Address),
    Market(MarketId),
    MarketVault(MarketId),
    Prediction(MarketId, Address),
    VoteAuthority(MarketId, Address),
    VoteResult(MarketId),
    Proposal(MarketId),
    Challenge(MarketId),
    OracleReport(MarketId),
    Resolution(MarketId),
    ClosedMarket(MarketId),
}

impl DataKey {
    pub fn namespace(&self) -> &'static str {
        match self {
            DataKey::Admin => "admin",
            DataKey::Config => "config",
            DataKey::ReentrancyLock => "reentrancy_lock",
            DataKey::ProtocolStats => "protocol_stats",
            DataKey::CreatorProfile(_) => "creator_profile",
            DataKey::UserProfile(_) => "user_profile",
            DataKey::AiResolver(_) => "ai_resolver",
            DataKey::Market(_) => "market",
            DataKey::MarketVault(_) => "market_vault",
            DataKey::Prediction(_, _) => "prediction",
            DataKey::VoteAuthority(_, _) => "vote_authority",
            DataKey::VoteResult(_) => "vote_result",
            DataKey::Proposal(_) => "proposal",
            DataKey::Challenge(_) => "challenge",
            DataKey::OracleReport(_) => "oracle_report",
            DataKey::Resolution(_) => "resolution",
            DataKey::ClosedMarket(_) => "closed_market",
        }
    }
}

pub struct AccountLocator;

impl AccountLocator {
    /// 32-byte location of a key: `sha256(namespace || xdr(key))`.
    ///
    /// Indexers use this to name entities without reading contract storage.
    /// There is no private key behind a location, so nothing but this contract
    /// can write to it.
    pub fn locate(env: &Env, key: &DataKey) -> BytesN<32> {
        let mut preimage = Bytes::from_slice(env, key.namespace().as_bytes());
        preimage.append(&key.clone().to_xdr(env));
        env.crypto().sha256(&preimage).to_bytes()
    }
}

// ===== LEDGER ACCESS =====

pub struct LedgerStore;

impl LedgerStore {
    pub fn get<V: TryFromVal<Env, Val>>(env: &Env, key: &DataKey) -> Option<V> {
        let value = env.storage().persistent().get(key);
        if value.is_some() {
            Self::extend_persistent(env, key);
        }
        value
    }

    pub fn set<V: IntoVal<Env, Val>>(env: &Env, key: &DataKey, value: &V) {
        env.storage().persistent().set(key, value);
        Self::extend_persistent(env, key);
    }

    pub fn has(env: &Env, key: &DataKey) -> bool {
        env.storage().persistent().has(key)
    }

    pub fn remove(env: &Env, key: &DataKey) {
        env.storage().persistent().remove(key);
    }

    pub fn get_instance<V: TryFromVal<Env, Val>>(env: &Env, key: &DataKey) -> Option<V> {
        let value = env.storage().instance().get(key);
        Self::extend_instance(env);
        value
    }

    pub fn set_instance<V: IntoVal<Env, Val>>(env: &Env, key: &DataKey, value: &V) {
        env.storage().instance().set(key, value);
        Self::extend_instance(env);
    }

    pub fn has_instance(env: &Env, key: &DataKey) -> bool {
        env.storage().instance().has(key)
    }

    fn extend_persistent(env: &Env, key: &DataKey) {
        env.storage()
            .persistent()
            .extend_ttl(key, BUMP_THRESHOLD, BUMP_AMOUNT);
    }

    fn extend_instance(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(BUMP_THRESHOLD, BUMP_AMOUNT);
    }
}
