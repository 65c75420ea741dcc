//! JSON-RPC request handlers.

use crate::server::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use regstore_core::ipc::server::process_parsed;
use regstore_core::ipc::{IpcRequest, IpcResponse};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Main JSON-RPC handler.
///
/// Always answers HTTP 200; protocol and store failures travel in the
/// JSON-RPC error object.
pub async fn handle_rpc(State(state): State<Arc<AppState>>, body: String) -> impl IntoResponse {
    let request: IpcRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejecting unparsable RPC body: {}", e);
            return (
                StatusCode::OK,
                Json(IpcResponse::error(None, -32700, format!("Parse error: {}", e))),
            );
        }
    };

    // Handle built-in methods
    if request.method == "health_check" {
        return (
            StatusCode::OK,
            Json(IpcResponse::success(request.id, json!({"status": "ok"}))),
        );
    }

    // Failures are logged once, by the service's dispatch
    let response = process_parsed(request, state.service.as_ref()).await;
    (StatusCode::OK, Json(response))
}
