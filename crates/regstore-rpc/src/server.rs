//! HTTP server implementation using Axum, plus the optional TCP IPC listener.

use crate::handler::{handle_health, handle_rpc};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use regstore_core::{HttpConfig, IpcServer, IpcServerHandle, RegisterService, ServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Application state shared across handlers.
pub struct AppState {
    pub service: Arc<RegisterService>,
}

/// Listeners started by [`start_server`].
pub struct RunningServer {
    pub http_addr: SocketAddr,
    pub ipc: Option<IpcServerHandle>,
    http_shutdown: Option<oneshot::Sender<()>>,
}

impl RunningServer {
    pub fn ipc_addr(&self) -> Option<SocketAddr> {
        self.ipc.as_ref().map(|handle| handle.addr())
    }

    /// Stop accepting requests on both listeners.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.http_shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(ipc) = self.ipc.as_mut() {
            ipc.shutdown();
        }
    }
}

/// Build the JSON-RPC router over `service`.
pub fn build_router(service: Arc<RegisterService>) -> Router {
    let state = Arc::new(AppState { service });

    Router::new()
        .route("/health", get(handle_health))
        .route("/rpc", post(handle_rpc))
        .layer(DefaultBodyLimit::max(HttpConfig::MAX_BODY_BYTES))
        .layer(ConcurrencyLimitLayer::new(HttpConfig::MAX_CONCURRENT_REQUESTS))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the JSON-RPC HTTP server and, if configured, the TCP IPC server.
///
/// Both transports share one `RegisterService`. Returns the actual bound
/// addresses (useful when a port of 0 was requested).
pub async fn start_server(
    service: Arc<RegisterService>,
    config: &ServerConfig,
) -> anyhow::Result<RunningServer> {
    let ipc = match config.ipc_bind_addr() {
        Some(bind_addr) => Some(IpcServer::start(service.clone(), &bind_addr).await?),
        None => None,
    };

    let app = build_router(service);

    let addr: SocketAddr = config.http_bind_addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let http_addr = listener.local_addr()?;

    info!("Server listening on {}", http_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    // Spawn the server in the background
    tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await;
        if let Err(e) = result {
            error!("HTTP server error: {}", e);
        }
    });

    Ok(RunningServer {
        http_addr,
        ipc,
        http_shutdown: Some(shutdown_tx),
    })
}
