//! Typed record accessors
//!
//! `Records` is the one place that decides what happens when the store
//! misbehaves: the read yields the record's default, a warning is logged,
//! and (for backend failures) the handle stops touching the store for the
//! rest of the session.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::store::{MemoryStore, RecordStore, StoreError};

/// Store shared by the host and every session it starts
pub type SharedStore = Rc<RefCell<dyn RecordStore>>;

/// Record keys (namespaced per mode)
pub mod keys {
    pub const SETTINGS: &str = "arena_modes_settings";

    pub const HORDE_HIGHEST_WAVE: &str = "arena_modes_horde_highest_wave";

    pub const BOSS_RUSH_UNLOCKED: &str = "arena_modes_boss_rush_unlocked";
    pub const BOSS_RUSH_BEST_TOTAL: &str = "arena_modes_boss_rush_best_total";
    pub const BOSS_RUSH_BEST_TIMES: &str = "arena_modes_boss_rush_best_times";

    pub const ONE_HIT_BEST_RUN: &str = "arena_modes_one_hit_best_run";
    pub const ONE_HIT_UNLOCKED_REWARDS: &str = "arena_modes_one_hit_unlocked_rewards";

    pub const TIME_ATTACK_BEST_TIMES: &str = "arena_modes_time_attack_best_times";
    pub const TIME_ATTACK_GHOSTS: &str = "arena_modes_time_attack_ghosts";
}

/// Typed, failure-tolerant view of a record store
#[derive(Clone)]
pub struct Records {
    store: SharedStore,
    degraded: Cell<bool>,
}

impl Records {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            degraded: Cell::new(false),
        }
    }

    /// Records backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Rc::new(RefCell::new(MemoryStore::new())))
    }

    /// Fresh handle for a new session (clears any previous degradation)
    pub fn for_session(&self) -> Self {
        Self::new(Rc::clone(&self.store))
    }

    /// True once a backend failure has disabled persistence for this handle
    pub fn is_degraded(&self) -> bool {
        self.degraded.get()
    }

    /// Load a record, falling back to its default on any failure
    pub fn load<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        if self.degraded.get() {
            return T::default();
        }

        let value = match self.store.borrow().get(key) {
            Ok(Some(value)) => value,
            Ok(None) => return T::default(),
            Err(err @ StoreError::Corrupt { .. }) => {
                log::warn!("{err}; using default");
                return T::default();
            }
            Err(err) => {
                self.degrade(key, &err);
                return T::default();
            }
        };

        match serde_json::from_value(value) {
            Ok(record) => record,
            Err(source) => {
                let err = StoreError::Corrupt {
                    key: key.to_string(),
                    source,
                };
                log::warn!("{err}; using default");
                T::default()
            }
        }
    }

    /// Write a record through to the store. Returns whether it was persisted.
    pub fn save<T>(&self, key: &str, record: &T) -> bool
    where
        T: Serialize + ?Sized,
    {
        if self.degraded.get() {
            return false;
        }

        let value = match serde_json::to_value(record) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Could not encode record `{key}`: {err}");
                return false;
            }
        };

        match self.store.borrow_mut().set(key, value) {
            Ok(()) => true,
            Err(err) => {
                self.degrade(key, &err);
                false
            }
        }
    }

    fn degrade(&self, key: &str, err: &StoreError) {
        log::warn!("Record `{key}`: {err}; persistence disabled for this session");
        self.degraded.set(true);
    }
}

impl fmt::Debug for Records {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Records")
            .field("degraded", &self.degraded.get())
            .finish_non_exhaustive()
    }
}
