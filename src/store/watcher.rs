//! Liveness watchers: one background task per owner-bound entry.
//!
//! A watcher polls its owner pid on a fixed interval and, once the owner is
//! gone, deletes the entry it was started for. The delete is guarded: if the
//! key has been rebound to another owner (or unbound) since, nothing happens.
//! The table lock is only taken for that delete, never across the sleep.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::liveness::{Liveness, LivenessProbe};
use super::table::EntryTable;

pub(crate) struct LivenessWatcher {
    key: String,
    owner: u32,
    table: Arc<RwLock<EntryTable>>,
    probe: Arc<dyn LivenessProbe>,
    poll_interval: Duration,
}

impl LivenessWatcher {
    pub(crate) fn new(
        key: String,
        owner: u32,
        table: Arc<RwLock<EntryTable>>,
        probe: Arc<dyn LivenessProbe>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            key,
            owner,
            table,
            probe,
            poll_interval,
        }
    }

    /// Starts polling in the background.
    pub(crate) fn spawn(self) -> AbortHandle {
        tokio::spawn(self.run()).abort_handle()
    }

    /// Polls until the owner is gone, then reclaims. Returns whether the
    /// entry was removed.
    pub(crate) async fn run(self) -> bool {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match self.probe.probe(self.owner) {
                Liveness::Alive => continue,
                Liveness::Dead => break,
                Liveness::Unknown(reason) => {
                    warn!(
                        target: "glod::watcher",
                        key = %self.key,
                        owner = self.owner,
                        "Liveness check failed, treating owner as gone: {}",
                        reason
                    );
                    break;
                }
            }
        }

        self.reclaim().await
    }

    async fn reclaim(&self) -> bool {
        let removed = self
            .table
            .write()
            .await
            .remove_if_owned_by(&self.key, self.owner);

        if removed {
            info!(
                target: "glod::watcher",
                key = %self.key,
                owner = self.owner,
                "Owner exited, entry reclaimed"
            );
        } else {
            debug!(
                target: "glod::watcher",
                key = %self.key,
                owner = self.owner,
                "Owner exited, entry already rebound"
            );
        }
        removed
    }
}
