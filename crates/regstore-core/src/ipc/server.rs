//! TCP IPC server.
//!
//! Accepts connections, reads framed JSON-RPC requests, and hands each one to
//! an [`IpcDispatch`] implementation.
//!
//! # Thread Safety
//!
//! The server runs on the tokio runtime. Each connection is handled in its own
//! spawned task. The dispatcher is shared via `Arc` and is responsible for its
//! own synchronization.

use super::protocol::{
    check_frame_len, read_frame, write_frame, IpcRequest, IpcResponse, JSONRPC_VERSION,
};
use crate::config::IpcConfig;
use crate::{RegisterError, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Handle to a running IPC server. Dropping shuts down the server.
pub struct IpcServerHandle {
    pub addr: SocketAddr,
    pub port: u16,
    stop_tx: watch::Sender<bool>,
    accept_task: Option<JoinHandle<()>>,
}

impl IpcServerHandle {
    /// Get the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and close idle ones.
    ///
    /// A request already being dispatched runs to completion and its
    /// response is written before the connection closes.
    pub fn shutdown(&mut self) {
        let _ = self.stop_tx.send(true);
    }
}

impl Drop for IpcServerHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
    }
}

/// Routes a JSON-RPC method call to its implementation.
#[async_trait::async_trait]
pub trait IpcDispatch: Send + Sync + 'static {
    /// Dispatch a JSON-RPC method call and return the result.
    async fn dispatch(&self, method: &str, params: serde_json::Value)
        -> Result<serde_json::Value>;
}

/// IPC server that listens for client connections.
pub struct IpcServer;

impl IpcServer {
    /// Start the IPC server on `bind_addr` (e.g. `127.0.0.1:0`).
    ///
    /// Returns a handle carrying the bound port. The server runs in background
    /// tokio tasks until the handle is shut down or dropped.
    pub async fn start<D: IpcDispatch>(dispatch: Arc<D>, bind_addr: &str) -> Result<IpcServerHandle> {
        let listener = TcpListener::bind(bind_addr).await?;
        let addr = listener.local_addr()?;

        info!("IPC server listening on {}", addr);

        let (stop_tx, stop_rx) = watch::channel(false);
        let slots = Arc::new(Semaphore::new(IpcConfig::MAX_IPC_CONNECTIONS));
        let accept_task = tokio::spawn(accept_connections(listener, dispatch, slots, stop_rx));

        Ok(IpcServerHandle {
            addr,
            port: addr.port(),
            stop_tx,
            accept_task: Some(accept_task),
        })
    }
}

async fn accept_connections<D: IpcDispatch>(
    listener: TcpListener,
    dispatch: Arc<D>,
    slots: Arc<Semaphore>,
    mut stop_rx: watch::Receiver<bool>,
) {
    loop {
        let (stream, peer) = tokio::select! {
            _ = stop_rx.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    error!("IPC accept error: {}", e);
                    continue;
                }
            },
        };

        // Over the cap the stream is dropped, which closes it
        let Ok(permit) = slots.clone().try_acquire_owned() else {
            warn!(
                "Rejecting IPC connection from {}: at max capacity ({})",
                peer,
                IpcConfig::MAX_IPC_CONNECTIONS
            );
            continue;
        };

        tokio::spawn(serve_connection(stream, peer, dispatch.clone(), stop_rx.clone(), permit));
    }
    info!("IPC server shutting down");
}

async fn serve_connection<D: IpcDispatch>(
    stream: TcpStream,
    peer: SocketAddr,
    dispatch: Arc<D>,
    stop_rx: watch::Receiver<bool>,
    _permit: OwnedSemaphorePermit,
) {
    debug!("IPC connection from {}", peer);
    match request_loop(stream, dispatch.as_ref(), stop_rx).await {
        Ok(()) => debug!("IPC connection {} closed", peer),
        Err(e) => debug!("IPC connection {} ended: {}", peer, e),
    }
}

async fn request_loop<D: IpcDispatch>(
    mut stream: TcpStream,
    dispatch: &D,
    mut stop_rx: watch::Receiver<bool>,
) -> Result<()> {
    let (mut reader, mut writer) = stream.split();

    while !*stop_rx.borrow() {
        let frame = tokio::select! {
            _ = stop_rx.changed() => break,
            frame = read_frame(&mut reader) => match frame? {
                Some(frame) => frame,
                None => break,
            },
        };

        let body = String::from_utf8(frame).map_err(|_| RegisterError::Validation {
            field: "ipc_payload".to_string(),
            message: "Invalid UTF-8 in IPC frame".to_string(),
        })?;

        let response = process_request(&body, dispatch).await;
        write_frame(&mut writer, &encode_response(response)?).await?;
    }
    Ok(())
}

/// Serialize a response for the wire.
///
/// A result that does not fit in one frame is replaced by an error response
/// carrying the same id, so the connection stays usable.
fn encode_response(response: IpcResponse) -> Result<Vec<u8>> {
    let err = match serde_json::to_vec(&response) {
        Ok(bytes) => match check_frame_len(bytes.len()) {
            Ok(()) => return Ok(bytes),
            Err(e) => e,
        },
        Err(e) => RegisterError::from(e),
    };

    warn!("Replacing unsendable IPC response: {}", err);
    let fallback = IpcResponse::from_error(response.id, &err);
    Ok(serde_json::to_vec(&fallback)?)
}

/// Parse, validate, and dispatch one JSON-RPC request body.
///
/// Shared by the TCP transport and any other front end that receives raw
/// request text.
pub async fn process_request<D: IpcDispatch + ?Sized>(request_str: &str, dispatch: &D) -> IpcResponse {
    let request: IpcRequest = match serde_json::from_str(request_str) {
        Ok(req) => req,
        Err(e) => {
            return IpcResponse::error(None, -32700, format!("Parse error: {}", e));
        }
    };

    process_parsed(request, dispatch).await
}

/// Validate and dispatch an already-parsed JSON-RPC request.
pub async fn process_parsed<D: IpcDispatch + ?Sized>(request: IpcRequest, dispatch: &D) -> IpcResponse {
    if request.jsonrpc != JSONRPC_VERSION {
        return IpcResponse::error(
            request.id,
            -32600,
            format!("Invalid Request: expected jsonrpc {}", JSONRPC_VERSION),
        );
    }

    let params = request
        .params
        .unwrap_or(serde_json::Value::Object(Default::default()));

    match dispatch.dispatch(&request.method, params).await {
        Ok(result) => IpcResponse::success(request.id, result),
        Err(e) => IpcResponse::from_error(request.id, &e),
    }
}
