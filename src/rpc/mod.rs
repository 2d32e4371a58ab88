//! RPC service definitions for the glod daemon.
//!
//! Clients reach the daemon over a Unix socket using tarpc with bincode
//! framing. The service mirrors the store: `get`, `set`, `list`.

pub mod store_service;

use serde::{Deserialize, Serialize};

pub use crate::store::KeyValue;

/// A `set` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub key: String,
    pub value: String,
    /// PID of the owning process, `0` when the entry is unbound.
    /// The daemon drops the entry once this process exits.
    pub pid: u32,
}

impl Item {
    pub fn new(key: String, value: String, pid: Option<u32>) -> Self {
        Self {
            key,
            value,
            pid: pid.unwrap_or(0),
        }
    }

    /// The owner pid, if the entry is bound to one.
    pub fn owner(&self) -> Option<u32> {
        (self.pid != 0).then_some(self.pid)
    }
}

#[cfg(test)]
#[path = "tests/rpc_tests.rs"]
mod tests;
