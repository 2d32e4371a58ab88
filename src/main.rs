#[cfg(not(unix))]
compile_error!("glod only supports Unix platforms");

mod config;
mod daemon;
mod daemon_log;
mod glod_paths;
mod rpc;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{ClientConfig, DaemonConfig, StoreConfig};
use daemon::RpcClient;
use rpc::Item;
use rpc::KeyValue;
use std::io::{self, Write};
use std::path::PathBuf;
use store::ProbeKind;

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;

#[derive(Parser)]
#[command(name = "glod")]
#[command(about = "Local key/value daemon; entries can die with the process that owns them")]
#[command(version)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Path to the daemon socket [default: $XDG_RUNTIME_DIR/glod.sock]
    #[arg(short, long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the daemon
    Server {
        /// How owner processes are checked for liveness
        #[arg(long, value_enum)]
        probe: Option<ProbeKind>,

        /// Owner polling interval in milliseconds
        #[arg(long)]
        poll_interval_ms: Option<u64>,
    },
    /// Store a value; with --pid it is flushed when that process dies
    Set {
        key: String,
        value: String,

        /// Owner of the data
        #[arg(short, long)]
        pid: Option<u32>,
    },
    /// Print the value stored under a key
    Get { key: String },
    /// Print all keys and values
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Server {
            probe,
            poll_interval_ms,
        } => {
            daemon_log::init_logging("info");
            let config = DaemonConfig {
                socket_path: config::socket_path(cli.socket),
                store: StoreConfig::resolve(probe, poll_interval_ms),
            };
            daemon::run_daemon(config).await
        }
        command => {
            daemon_log::init_logging("warn");
            run_client(ClientConfig::resolve(cli.socket), command).await
        }
    }
}

async fn run_client(config: ClientConfig, command: Command) -> Result<()> {
    let client = RpcClient::connect(&config).await?;

    match command {
        Command::Set { key, value, pid } => {
            client.set(Item::new(key, value, pid)).await?;
        }
        Command::Get { key } => {
            let value = client.get(&key).await?;
            write_value(&mut io::stdout().lock(), &value)?;
        }
        Command::List => {
            let pairs = client.list().await?;
            write_pairs(&mut io::stdout().lock(), &pairs)?;
        }
        Command::Server { .. } => anyhow::bail!("server is not a client command"),
    }

    Ok(())
}

/// A missing key reads as the empty string and prints nothing.
fn write_value(out: &mut impl Write, value: &str) -> io::Result<()> {
    if !value.is_empty() {
        writeln!(out, "{}", value)?;
    }
    Ok(())
}

fn write_pairs(out: &mut impl Write, pairs: &[KeyValue]) -> io::Result<()> {
    for pair in pairs {
        writeln!(out, "{} {}", pair.key, pair.value)?;
    }
    Ok(())
}
