use soroban_sdk::{Address, Env};

use crate::config::{ConfigManager, ContractConfig, Environment};
use crate::errors::Error;
use crate::events::EventEmitter;
use crate::storage::{DataKey, LedgerStore};

// ===== ADMIN INITIALIZATION =====

pub struct AdminInitializer;

impl AdminInitializer {
    /// One-time setup with an environment preset. The admin doubles as the
    /// default oracle authority for newly created markets.
    pub fn initialize(
        env: &Env,
        admin: &Address,
        treasury: &Address,
        environment: Environment,
    ) -> Result<ContractConfig, Error> {
        let config = ConfigManager::for_environment(environment, treasury, admin);
        Self::initialize_with_config(env, admin, &config)?;
        Ok(config)
    }

    pub fn initialize_with_config(
        env: &Env,
        admin: &Address,
        config: &ContractConfig,
    ) -> Result<(), Error> {
        if LedgerStore::has_instance(env, &DataKey::Admin) {
            return Err(Error::AlreadyExists);
        }
        ConfigManager::store_config(env, config)?;
        LedgerStore::set_instance(env, &DataKey::Admin, admin);
        EventEmitter::emit_initialized(env, admin, config);
        Ok(())
    }
}

// ===== ADMIN ACCESS CONTROL =====

pub struct AdminAccessControl;

impl AdminAccessControl {
    pub fn get_admin(env: &Env) -> Result<Address, Error> {
        LedgerStore::get_instance(env, &DataKey::Admin).ok_or(Error::NotInitialized)
    }

    pub fn is_admin(env: &Env, caller: &Address) -> Result<bool, Error> {
        Ok(Self::get_admin(env)? == *caller)
    }

    /// Signature is checked by the caller; this only checks identity.
    pub fn require_admin(env: &Env, caller: &Address) -> Result<(), Error> {
        if !Self::is_admin(env, caller)? {
            return Err(Error::Unauthorized);
        }
        Ok(())
    }

    pub fn update_config(env: &Env, admin: &Address, config: &ContractConfig) -> Result<(), Error> {
        Self::require_admin(env, admin)?;
        ConfigManager::store_config(env, config)?;
        EventEmitter::emit_config_updated(env, admin, config);
        Ok(())
    }
}
