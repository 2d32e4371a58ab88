//! RPC server implementation for the glod daemon.
//!
//! Implements the tarpc StoreService trait on top of the shared [`Store`].

use crate::config::DaemonConfig;
use crate::glod_paths;
use crate::rpc::store_service::StoreService;
use crate::rpc::{Item, KeyValue};
use crate::store::Store;
use anyhow::{Context, Result};
use futures::StreamExt;
use std::os::unix::fs::FileTypeExt;
use std::path::Path;
use tarpc::server::{self, Channel};
use tarpc::tokio_serde::formats::Bincode;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Server implementation for StoreService.
#[derive(Clone)]
pub struct StoreServer {
    store: Store,
}

impl StoreServer {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl StoreService for StoreServer {
    async fn get(self, _: tarpc::context::Context, key: String) -> String {
        self.store.get(&key).await.unwrap_or_default()
    }

    async fn set(self, _: tarpc::context::Context, item: Item) {
        let owner = item.owner();
        self.store.set(item.key, item.value, owner).await;
    }

    async fn list(self, _: tarpc::context::Context) -> Vec<KeyValue> {
        self.store.list().await
    }
}

/// Run the store RPC server on `socket_path` until `shutdown_tx` fires.
///
/// The socket file must not exist; see [`prepare_socket`].
pub async fn run_store_server(
    store: Store,
    socket_path: &Path,
    shutdown_tx: broadcast::Sender<()>,
) -> Result<()> {
    use tarpc::serde_transport::unix;

    let mut shutdown_rx = shutdown_tx.subscribe();
    let mut listener = unix::listen(socket_path, Bincode::default)
        .await
        .with_context(|| format!("Failed to bind socket {}", socket_path.display()))?;

    info!("RPC server listening on {}", socket_path.display());

    loop {
        tokio::select! {
            Some(result) = listener.next() => {
                match result {
                    Ok(transport) => {
                        let server = StoreServer::new(store.clone());
                        let channel = server::BaseChannel::with_defaults(transport);

                        tokio::spawn(async move {
                            channel.execute(server.serve()).for_each(|response| async {
                                tokio::spawn(response);
                            }).await;
                        });
                    }
                    Err(e) => {
                        warn!("Accept error: {}", e);
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                break;
            }
        }
    }

    Ok(())
}

/// Makes `socket_path` bindable.
///
/// Fails if a daemon already answers on it or if the path is not a socket;
/// a stale socket file left by a crashed daemon is removed.
pub async fn prepare_socket(socket_path: &Path) -> Result<()> {
    if let Ok(metadata) = std::fs::symlink_metadata(socket_path) {
        if !metadata.file_type().is_socket() {
            anyhow::bail!(
                "Refusing to replace {}: it exists and is not a socket",
                socket_path.display()
            );
        }
        if tokio::net::UnixStream::connect(socket_path).await.is_ok() {
            anyhow::bail!(
                "Another glod daemon is already listening on {}",
                socket_path.display()
            );
        }
        std::fs::remove_file(socket_path).context("Failed to remove stale socket")?;
        warn!("Removed stale socket {}", socket_path.display());
    }

    glod_paths::ensure_socket_dir(socket_path)
}

/// Main entry point for the daemon.
///
/// Serves until SIGINT or SIGTERM, then removes the socket file.
pub async fn run_daemon(config: DaemonConfig) -> Result<()> {
    let socket_path = config.socket_path;
    prepare_socket(&socket_path).await?;

    let mut sigterm = signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received {}, shutting down", name);
        let _ = signal_tx.send(());
    });

    info!(
        poll_interval_ms = config.store.poll_interval.as_millis() as u64,
        probe = ?config.store.probe,
        "Daemon starting"
    );

    let store = Store::new(config.store);
    let result = run_store_server(store.clone(), &socket_path, shutdown_tx).await;

    let entries = store.entry_count().await;
    info!(entries, "Daemon stopped, dropping in-memory entries");

    // Cleanup on exit
    let _ = std::fs::remove_file(&socket_path);

    result
}
