//! The glod daemon and its client.
//!
//! ## Architecture
//!
//! - **Server (`rpc_server.rs`)**: tarpc server on a Unix socket. Every
//!   connection gets a `StoreServer` sharing the one `Store`.
//! - **Client (`rpc_client.rs`)**: connects to the socket and bounds each call
//!   with a request timeout.
//!
//! Nothing is persisted; a restarted daemon starts empty.

pub mod rpc_client;
pub mod rpc_server;

#[cfg(test)]
pub(crate) mod rpc_tests;

pub use rpc_client::RpcClient;
pub use rpc_server::run_daemon;
