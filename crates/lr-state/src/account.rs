//! Account persistence contract
//!
//! Exactly two keys are persisted: the credit balance and the seed string.
//! Read or write failures never abort the session. The first failure is
//! logged, the store is marked degraded, and from then on the caller's
//! in-memory values are authoritative for the rest of the session.

use serde::{Deserialize, Serialize};

use crate::store::{KeyValueStore, MemoryStore, StoreError};

/// Key holding the credit balance (decimal integer)
pub const CREDITS_KEY: &str = "slot_credits";
/// Key holding the seed string
pub const SEED_KEY: &str = "slot_seed";
/// Credits granted when nothing usable is stored
pub const DEFAULT_CREDITS: u64 = 1000;

/// Values restored at session start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedAccount {
    pub credits: u64,
    pub seed: String,
}

/// Load/save wrapper around a key-value substrate
pub struct AccountStore {
    store: Box<dyn KeyValueStore>,
    degraded: bool,
}

impl AccountStore {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            degraded: false,
        }
    }

    /// Store backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// True once any read or write has failed
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Restore the account.
    ///
    /// Credits fall back to `default_credits` when absent or unparseable.
    /// A missing or blank seed is replaced by `fresh_seed()` and written back.
    pub fn load(
        &mut self,
        default_credits: u64,
        fresh_seed: impl FnOnce() -> String,
    ) -> PersistedAccount {
        let credits = match self.read(CREDITS_KEY) {
            Some(raw) => parse_credits(&raw).unwrap_or_else(|| {
                log::warn!("Stored credits {:?} unparseable, using {}", raw, default_credits);
                default_credits
            }),
            None => default_credits,
        };

        let seed = match self.read(SEED_KEY) {
            Some(seed) if !seed.trim().is_empty() => seed,
            _ => {
                let seed = fresh_seed();
                self.save_seed(&seed);
                seed
            }
        };

        PersistedAccount { credits, seed }
    }

    pub fn save_credits(&mut self, credits: u64) {
        self.write(CREDITS_KEY, &credits.to_string());
    }

    pub fn save_seed(&mut self, seed: &str) {
        self.write(SEED_KEY, seed);
    }

    fn read(&mut self, key: &str) -> Option<String> {
        if self.degraded {
            return None;
        }
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                self.degrade(key, &e);
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) {
        if self.degraded {
            return;
        }
        if let Err(e) = self.store.set(key, value) {
            self.degrade(key, &e);
        }
    }

    fn degrade(&mut self, key: &str, error: &StoreError) {
        log::warn!(
            "Persistence unavailable ({} on {:?}), continuing in memory",
            error,
            key
        );
        self.degraded = true;
    }
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStore")
            .field("degraded", &self.degraded)
            .finish_non_exhaustive()
    }
}

fn parse_credits(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}
