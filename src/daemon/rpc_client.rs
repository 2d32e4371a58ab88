//! RPC client for the glod daemon using tarpc.
//!
//! Every call is bounded by the configured request timeout so a wedged
//! daemon can't hang a caller.

use crate::config::ClientConfig;
use crate::rpc::store_service::StoreServiceClient;
use crate::rpc::{Item, KeyValue};
use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;
use tarpc::client::{self, RpcError};
use tarpc::tokio_serde::formats::Bincode;

/// RPC client for the glod daemon.
pub struct RpcClient {
    client: StoreServiceClient,
    request_timeout: Duration,
}

impl RpcClient {
    /// Connects to the daemon socket named in `config`.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        use tarpc::serde_transport::unix;

        let transport = unix::connect(&config.socket_path, Bincode::default)
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to glod daemon at {}",
                    config.socket_path.display()
                )
            })?;
        let client = StoreServiceClient::new(client::Config::default(), transport).spawn();

        Ok(Self {
            client,
            request_timeout: config.request_timeout,
        })
    }

    /// Returns the value for `key`, empty when the key is absent.
    pub async fn get(&self, key: &str) -> Result<String> {
        self.call(
            "get",
            self.client.get(tarpc::context::current(), key.to_string()),
        )
        .await
    }

    /// Stores an item.
    pub async fn set(&self, item: Item) -> Result<()> {
        self.call("set", self.client.set(tarpc::context::current(), item))
            .await
    }

    /// Lists all pairs.
    pub async fn list(&self) -> Result<Vec<KeyValue>> {
        self.call("list", self.client.list(tarpc::context::current()))
            .await
    }

    async fn call<T>(
        &self,
        method: &str,
        request: impl Future<Output = Result<T, RpcError>>,
    ) -> Result<T> {
        tokio::time::timeout(self.request_timeout, request)
            .await
            .with_context(|| {
                format!(
                    "Request '{}' timed out after {}ms",
                    method,
                    self.request_timeout.as_millis()
                )
            })?
            .with_context(|| format!("Request '{}' failed", method))
    }
}
