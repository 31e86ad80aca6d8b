use soroban_sdk::{Env, Vec};

use crate::errors::Error;
use crate::events::{EventEmitter, StatsReconciledEvent};
use crate::storage::{DataKey, LedgerStore};
use crate::types::{Market, MarketId, ProtocolStats};
use crate::utils::NumericUtils;

/// Protocol-wide counters. Every counter only ever grows.
pub struct ProtocolAggregator;

impl ProtocolAggregator {
    pub fn initialize(env: &Env) -> Result<ProtocolStats, Error> {
        if LedgerStore::has(env, &DataKey::ProtocolStats) {
            return Err(Error::AlreadyExists);
        }
        let stats = ProtocolStats::default();
        Self::save(env, &stats);
        Ok(stats)
    }

    pub fn load(env: &Env) -> Result<ProtocolStats, Error> {
        LedgerStore::get(env, &DataKey::ProtocolStats).ok_or(Error::NotInitialized)
    }

    fn save(env: &Env, stats: &ProtocolStats) {
        LedgerStore::set(env, &DataKey::ProtocolStats, stats);
    }

    fn update<F>(env: &Env, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut ProtocolStats) -> Result<(), Error>,
    {
        let mut stats = Self::load(env)?;
        f(&mut stats)?;
        Self::save(env, &stats);
        Ok(())
    }

    pub fn record_market_created(env: &Env) -> Result<(), Error> {
        Self::update(env, |s| {
            s.total_markets = s.total_markets.checked_add(1).ok_or(Error::ArithmeticOverflow)?;
            Ok(())
        })
    }

    pub fn record_user(env: &Env) -> Result<(), Error> {
        Self::update(env, |s| {
            s.total_users = s.total_users.checked_add(1).ok_or(Error::ArithmeticOverflow)?;
            Ok(())
        })
    }

    pub fn record_stake(env: &Env, amount: i128) -> Result<(), Error> {
        Self::update(env, |s| {
            s.total_stakes = s.total_stakes.checked_add(1).ok_or(Error::ArithmeticOverflow)?;
            s.total_volume = NumericUtils::checked_add(s.total_volume, amount)?;
            Ok(())
        })
    }

    pub fn record_resolution(env: &Env) -> Result<(), Error> {
        Self::update(env, |s| {
            s.total_resolved = s.total_resolved.checked_add(1).ok_or(Error::ArithmeticOverflow)?;
            Ok(())
        })
    }

    pub fn record_payout(env: &Env, payout: i128) -> Result<(), Error> {
        Self::update(env, |s| {
            s.total_paid_out = NumericUtils::checked_add(s.total_paid_out, payout)?;
            Ok(())
        })
    }

    /// Raise counters to at least what the listed live markets account for.
    ///
    /// Unknown or closed ids are skipped. Duplicate ids are counted once.
    pub fn reconcile(env: &Env, markets: &Vec<MarketId>) -> Result<ProtocolStats, Error> {
        let mut seen: Vec<MarketId> = Vec::new(env);
        let mut market_count: u64 = 0;
        let mut staker_count: u64 = 0;
        let mut volume: i128 = 0;

        for id in markets.iter() {
            if seen.contains(&id) {
                continue;
            }
            let market: Option<Market> = LedgerStore::get(env, &DataKey::Market(id.clone()));
            seen.push_back(id);
            if let Some(market) = market {
                market_count += 1;
                staker_count += market.staker_count as u64;
                volume = NumericUtils::checked_add(volume, market.total_pool)?;
            }
        }

        let mut stats = Self::load(env)?;
        stats.total_markets = stats.total_markets.max(market_count);
        stats.total_stakes = stats.total_stakes.max(staker_count);
        stats.total_volume = stats.total_volume.max(volume);
        Self::save(env, &stats);

        EventEmitter::emit_stats_reconciled(
            env,
            StatsReconciledEvent {
                markets_scanned: markets.len(),
                total_markets: stats.total_markets,
                total_stakes: stats.total_stakes,
                total_volume: stats.total_volume,
            },
        );
        Ok(stats)
    }
}
