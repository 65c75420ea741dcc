//! Regstore RPC Server - JSON-RPC front end for the register store.
//!
//! Serves JSON-RPC 2.0 over HTTP (`POST /rpc`) and, optionally, over
//! length-prefixed TCP frames for programmatic clients.

mod handler;
mod server;

use anyhow::Result;
use clap::Parser;
use regstore_core::{HttpConfig, RegisterService, RegisterStore, ServerConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "regstore-rpc")]
#[command(about = "JSON-RPC server for named register arrays")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = HttpConfig::DEFAULT_HOST)]
    host: String,

    /// Also serve framed JSON-RPC over TCP
    #[arg(long)]
    ipc: bool,

    /// TCP IPC port (0 = auto-assign); implies --ipc
    #[arg(long)]
    ipc_port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        let ipc_port = match (self.ipc, self.ipc_port) {
            (_, Some(port)) => Some(port),
            (true, None) => Some(0),
            (false, None) => None,
        };
        ServerConfig {
            host: self.host.clone(),
            http_port: self.port,
            ipc_port,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the level flags.
fn init_logging(debug: bool, json: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug, args.json_logs);

    info!("Starting Regstore RPC Server");

    let store = Arc::new(RegisterStore::new());
    let service = Arc::new(RegisterService::new(store));

    let mut running = server::start_server(service, &args.server_config()).await?;

    // Print ports for supervisors to read (intentional stdout)
    println!("RPC_PORT={}", running.http_addr.port());
    if let Some(addr) = running.ipc_addr() {
        println!("IPC_PORT={}", addr.port());
    }

    info!("RPC server running on {}", running.http_addr);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");
    running.shutdown();

    Ok(())
}
