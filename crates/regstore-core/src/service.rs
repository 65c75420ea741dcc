//! RPC method routing onto the register store.
//!
//! `RegisterService` is the dispatcher used by every transport. Each method
//! decodes its params into a typed request, calls the store, and encodes the
//! result.

use crate::ipc::server::IpcDispatch;
use crate::store::{RegisterArraySnapshot, RegisterStore};
use crate::{RegisterError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// RPC method names.
pub mod methods {
    pub const CREATE: &str = "CreateRegisterArray";
    pub const DELETE: &str = "DeleteRegisterArray";
    pub const GET: &str = "GetRegisterArray";
    pub const GET_ALL: &str = "GetAllRegisterArrays";
    pub const READ_VALUE: &str = "ReadValue";
    pub const WRITE_VALUE: &str = "WriteValue";
    pub const PING: &str = "ping";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    pub name: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadItemRequest {
    pub name: String,
    pub index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteItemRequest {
    pub name: String,
    pub index: u32,
    pub value: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadItemResponse {
    pub value: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAllResponse {
    pub arrays: Vec<RegisterArraySnapshot>,
}

fn parse_params<T: DeserializeOwned>(method: &str, params: Value) -> Result<T> {
    serde_json::from_value(params).map_err(|e| RegisterError::InvalidParams {
        message: format!("{}: {}", method, e),
    })
}

/// Dispatcher that exposes a [`RegisterStore`] over JSON-RPC.
#[derive(Debug, Clone)]
pub struct RegisterService {
    store: Arc<RegisterStore>,
}

impl RegisterService {
    pub fn new(store: Arc<RegisterStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<RegisterStore> {
        &self.store
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        match method {
            methods::CREATE => {
                let req: CreateRequest = parse_params(method, params)?;
                self.store.create(&req.name, req.capacity).await?;
                Ok(json!({}))
            }
            methods::DELETE => {
                let req: DeleteRequest = parse_params(method, params)?;
                self.store.delete(&req.name).await?;
                Ok(json!({}))
            }
            methods::GET => {
                let req: GetRequest = parse_params(method, params)?;
                let snapshot = self.store.get(&req.name).await?;
                Ok(serde_json::to_value(snapshot)?)
            }
            methods::GET_ALL => {
                let arrays = self.store.get_all().await;
                Ok(serde_json::to_value(GetAllResponse { arrays })?)
            }
            methods::READ_VALUE => {
                let req: ReadItemRequest = parse_params(method, params)?;
                let value = self.store.read_item(&req.name, req.index).await?;
                Ok(serde_json::to_value(ReadItemResponse { value })?)
            }
            methods::WRITE_VALUE => {
                let req: WriteItemRequest = parse_params(method, params)?;
                self.store
                    .write_item(&req.name, req.index, req.value)
                    .await?;
                Ok(json!({}))
            }
            methods::PING => Ok(json!("pong")),
            _ => Err(RegisterError::MethodNotFound {
                method: method.to_string(),
            }),
        }
    }
}

#[async_trait::async_trait]
impl IpcDispatch for RegisterService {
    async fn dispatch(&self, method: &str, params: Value) -> Result<Value> {
        debug!("RPC call: {}({})", method, params);

        let result = self.call(method, params).await;
        if let Err(e) = &result {
            match e.kind() {
                // Rejected store requests are routine caller errors
                Some(kind) => debug!("{} rejected ({}): {}", method, kind, e),
                None => warn!("RPC error for {}: {}", method, e),
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn service() -> RegisterService {
        RegisterService::new(Arc::new(RegisterStore::new()))
    }

    #[tokio::test]
    async fn test_create_returns_empty_ack() {
        let svc = service();
        let result = svc
            .dispatch(methods::CREATE, json!({"name": "test", "capacity": 16}))
            .await
            .unwrap();
        assert_eq!(result, json!({}));
        assert!(svc.store().contains("test").await);
    }

    #[tokio::test]
    async fn test_get_returns_snapshot_shape() {
        let svc = service();
        svc.dispatch(methods::CREATE, json!({"name": "a", "capacity": 2}))
            .await
            .unwrap();
        svc.dispatch(methods::WRITE_VALUE, json!({"name": "a", "index": 1, "value": 7}))
            .await
            .unwrap();

        let result = svc.dispatch(methods::GET, json!({"name": "a"})).await.unwrap();
        assert_eq!(
            result,
            json!({"name": "a", "capacity": 2, "size": 1, "items": [0, 7]})
        );
    }

    #[tokio::test]
    async fn test_get_all_wraps_arrays() {
        let svc = service();
        let result = svc.dispatch(methods::GET_ALL, Value::Null).await.unwrap();
        assert_eq!(result, json!({"arrays": []}));
    }

    #[tokio::test]
    async fn test_read_value_shape() {
        let svc = service();
        svc.dispatch(methods::CREATE, json!({"name": "a", "capacity": 1}))
            .await
            .unwrap();
        let result = svc
            .dispatch(methods::READ_VALUE, json!({"name": "a", "index": 0}))
            .await
            .unwrap();
        assert_eq!(result, json!({"value": 0}));
    }

    #[tokio::test]
    async fn test_store_errors_pass_through() {
        let svc = service();
        let err = svc
            .dispatch(methods::DELETE, json!({"name": "test1"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_missing_params_are_invalid() {
        let svc = service();
        let err = svc
            .dispatch(methods::CREATE, json!({"name": "a"}))
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::InvalidParams { .. }));
        assert_eq!(err.to_rpc_error_code(), -32602);
    }

    #[tokio::test]
    async fn test_negative_index_is_invalid_params() {
        let svc = service();
        svc.dispatch(methods::CREATE, json!({"name": "a", "capacity": 1}))
            .await
            .unwrap();
        let err = svc
            .dispatch(methods::READ_VALUE, json!({"name": "a", "index": -1}))
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::InvalidParams { .. }));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let err = service().dispatch("ResizeRegisterArray", json!({})).await.unwrap_err();
        assert_eq!(err.to_rpc_error_code(), -32601);
    }
}
