use soroban_sdk::{Env, Symbol};

use crate::errors::Error;
use crate::storage::{DataKey, LedgerStore};

/// Instance-storage lock held for the duration of an operation that moves
/// tokens. The stored value is the name of the operation holding it.
pub struct ReentrancyGuard {
    env: Env,
    released: bool,
}

impl ReentrancyGuard {
    pub fn enter(env: &Env, operation: &Symbol) -> Result<Self, Error> {
        validate_no_reentrancy(env)?;
        LedgerStore::set_instance(env, &DataKey::ReentrancyLock, operation);
        Ok(Self {
            env: env.clone(),
            released: false,
        })
    }

    pub fn is_locked(env: &Env) -> bool {
        LedgerStore::has_instance(env, &DataKey::ReentrancyLock)
    }

    pub fn release(mut self) {
        self.unlock();
    }

    fn unlock(&mut self) {
        if !self.released {
            self.env
                .storage()
                .instance()
                .remove(&DataKey::ReentrancyLock);
            self.released = true;
        }
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        self.unlock();
    }
}

/// Runs `operation` while holding the lock. The lock is released whether or
/// not the operation succeeds.
pub fn protect_external_call<T, F>(
    env: &Env,
    function_name: Symbol,
    operation: F,
) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error>,
{
    let guard = ReentrancyGuard::enter(env, &function_name)?;
    let result = operation();
    guard.release();
    result
}

pub fn validate_no_reentrancy(env: &Env) -> Result<(), Error> {
    if ReentrancyGuard::is_locked(env) {
        return Err(Error::ReentrancyAttack);
    }
    Ok(())
}
