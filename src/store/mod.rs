//! In-memory key/value store with owner-bound entries.
//!
//! ## Architecture
//!
//! - **Table (`table.rs`)**: map from key to value plus optional owner pid.
//! - **Watcher (`watcher.rs`)**: one task per owner-bound entry that removes
//!   the entry once its owner process exits.
//! - **Liveness (`liveness.rs`)**: the "is this pid alive" probes.
//!
//! The table sits behind a single reader/writer lock. `get` and `list` share
//! it; `set` and a watcher's final delete take it exclusively.
//!
//! A `set` that replaces an owner-bound entry aborts the old watcher. Watchers
//! also re-check the owner before deleting, so a late watcher can never remove
//! an entry it no longer owns.

pub mod liveness;
mod table;
mod watcher;

#[cfg(test)]
pub(crate) mod fake_probe;

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod store_tests;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::StoreConfig;
use table::{Entry, EntryTable};
use watcher::LivenessWatcher;

pub use liveness::{Liveness, LivenessProbe, ProbeKind};

/// A listed entry. Owners are reclamation state and stay inside the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

/// Shared handle to the store. Clones refer to the same table.
#[derive(Debug, Clone)]
pub struct Store {
    table: Arc<RwLock<EntryTable>>,
    config: StoreConfig,
}

impl Store {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            table: Arc::new(RwLock::new(EntryTable::default())),
            config,
        }
    }

    /// Returns the value under `key`. Missing and reclaimed keys look the same.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.table.read().await.get(key).map(str::to_owned)
    }

    /// Inserts or replaces the entry for `key`.
    ///
    /// With an owner (`0` counts as none) a watcher is started that removes
    /// the entry once that process exits. Any watcher of the replaced entry
    /// is stopped.
    pub async fn set(&self, key: String, value: String, owner: Option<u32>) {
        let owner = owner.filter(|pid| *pid != 0);
        let mut table = self.table.write().await;

        // Spawned under the lock: the watcher cannot delete before the entry
        // it guards is installed.
        let watcher = owner.map(|pid| {
            LivenessWatcher::new(
                key.clone(),
                pid,
                self.table.clone(),
                self.config.probe.clone(),
                self.config.poll_interval,
            )
            .spawn()
        });

        let replaced = table.insert(key.clone(), Entry::new(value, owner, watcher));
        debug!(
            key = %key,
            owner = ?owner,
            replaced_owner = ?replaced.flatten(),
            entries = table.len(),
            "Entry set"
        );
    }

    /// Point-in-time snapshot of all pairs, in no particular order.
    pub async fn list(&self) -> Vec<KeyValue> {
        self.table.read().await.snapshot()
    }

    pub async fn entry_count(&self) -> usize {
        self.table.read().await.len()
    }
}
