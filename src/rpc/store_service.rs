//! Store service definition for client ↔ daemon RPC.

use crate::rpc::{Item, KeyValue};

/// Service exposed by the glod daemon.
#[tarpc::service]
pub trait StoreService {
    /// Returns the value stored under `key`, or an empty string when there
    /// is none (never set, or reclaimed after its owner exited).
    async fn get(key: String) -> String;

    /// Inserts or replaces an entry, binding it to `item.pid` when non-zero.
    async fn set(item: Item);

    /// Lists all key/value pairs. Order is unspecified.
    async fn list() -> Vec<KeyValue>;
}
