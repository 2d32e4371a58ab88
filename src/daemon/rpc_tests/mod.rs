//! Integration tests for the tarpc RPC implementation.
//!
//! These tests spin up real RPC servers on temporary Unix sockets and talk to
//! them with real clients. Liveness is scripted through `FakeProbe` unless a
//! test needs a real process.


use crate::config::{ClientConfig, StoreConfig};
use crate::daemon::rpc_client::RpcClient;
use crate::daemon::rpc_server::run_store_server;
use crate::rpc::store_service::StoreServiceClient;
use crate::store::fake_probe::FakeProbe;
use crate::store::Store;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tarpc::client;
use tarpc::tokio_serde::formats::Bincode;
use tokio::sync::broadcast;

/// Polling interval used by test servers.
pub const TEST_POLL: Duration = Duration::from_millis(5);

/// Test harness that manages a real RPC server for testing.
pub struct TestServer {
    pub socket_path: PathBuf,
    pub store: Store,
    pub probe: Arc<FakeProbe>,
    pub shutdown_tx: broadcast::Sender<()>,
    server_handle: Option<tokio::task::JoinHandle<anyhow::Result<()>>>,
    _dir: tempfile::TempDir,
}

impl TestServer {
    /// Start a real RPC server backed by a scripted probe.
    pub async fn start() -> Self {
        let probe = Arc::new(FakeProbe::default());
        let config = StoreConfig::new(TEST_POLL, probe.clone());
        Self::start_with(config, probe).await
    }

    pub async fn start_with(config: StoreConfig, probe: Arc<FakeProbe>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("glod.sock");
        let store = Store::new(config);
        let (shutdown_tx, _) = broadcast::channel(1);

        let server_handle = {
            let store = store.clone();
            let socket_path = socket_path.clone();
            let shutdown_tx = shutdown_tx.clone();
            tokio::spawn(async move { run_store_server(store, &socket_path, shutdown_tx).await })
        };

        wait_for_socket(&socket_path).await;

        Self {
            socket_path,
            store,
            probe,
            shutdown_tx,
            server_handle: Some(server_handle),
            _dir: dir,
        }
    }

    /// Create a raw tarpc client connected to this server.
    pub async fn create_client(&self) -> StoreServiceClient {
        use tarpc::serde_transport::unix;

        let transport = unix::connect(&self.socket_path, Bincode::default)
            .await
            .unwrap();
        StoreServiceClient::new(client::Config::default(), transport).spawn()
    }

    /// Create the CLI-facing client connected to this server.
    pub async fn rpc_client(&self) -> RpcClient {
        RpcClient::connect(&self.client_config()).await.unwrap()
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            socket_path: self.socket_path.clone(),
            request_timeout: Duration::from_secs(2),
        }
    }

    /// Shutdown the server and wait for the accept loop to exit.
    pub async fn stop(&mut self) -> anyhow::Result<()> {
        let _ = self.shutdown_tx.send(());
        match self.server_handle.take() {
            Some(handle) => tokio::time::timeout(Duration::from_secs(2), handle)
                .await
                .expect("server did not stop")
                .expect("server task panicked"),
            None => Ok(()),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Waits for a server to bind `socket_path`.
pub async fn wait_for_socket(socket_path: &std::path::Path) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !socket_path.exists() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "server never bound {}",
            socket_path.display()
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Polls `get` over RPC until `key` is empty, failing after two seconds.
pub async fn wait_until_reclaimed(client: &StoreServiceClient, key: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let value = client
            .get(tarpc::context::current(), key.to_string())
            .await
            .unwrap();
        if value.is_empty() {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "'{}' still holds '{}'",
            key,
            value
        );
        tokio::time::sleep(TEST_POLL).await;
    }
}
