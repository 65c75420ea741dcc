//! TCP IPC client for a register server.
//!
//! Establishes a TCP connection to the server's IPC listener and provides a
//! raw `call()` plus typed helpers for each register operation.
//!
//! # Thread Safety
//!
//! The client uses a tokio `Mutex` to serialize access to the TCP stream,
//! allowing safe concurrent use from multiple async tasks.

use super::protocol::{read_frame, write_frame, IpcRequest, IpcResponse};
use crate::config::IpcConfig;
use crate::service::{
    methods, CreateRequest, DeleteRequest, GetAllResponse, GetRequest, ReadItemRequest,
    ReadItemResponse, WriteItemRequest,
};
use crate::store::RegisterArraySnapshot;
use crate::{RegisterError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::debug;

/// Client connected to a register server's IPC listener.
#[derive(Debug)]
pub struct RegisterClient {
    stream: Mutex<TcpStream>,
    addr: SocketAddr,
    next_id: AtomicU64,
}

impl RegisterClient {
    /// Connect to a register server.
    ///
    /// Uses the configured connection timeout from `IpcConfig`.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = tokio::time::timeout(IpcConfig::IPC_CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| RegisterError::ConnectionLost { addr })?
            .map_err(|_| RegisterError::ConnectionLost { addr })?;

        debug!("IPC client connected to {}", addr);

        Ok(Self {
            stream: Mutex::new(stream),
            addr,
            next_id: AtomicU64::new(1),
        })
    }

    /// Call a JSON-RPC method on the server.
    ///
    /// A broken connection yields `ConnectionLost`. An error object from the
    /// server yields `Remote`, keeping its code and kind.
    pub async fn call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = IpcRequest::new(method, params, id);
        let request_bytes = serde_json::to_vec(&request)?;
        let lost = || RegisterError::ConnectionLost { addr: self.addr };

        let mut stream = self.stream.lock().await;
        let (mut reader, mut writer) = stream.split();

        write_frame(&mut writer, &request_bytes)
            .await
            .map_err(|_| lost())?;

        let response_bytes = read_frame(&mut reader)
            .await
            .map_err(|_| lost())?
            .ok_or_else(lost)?;

        let response: IpcResponse =
            serde_json::from_slice(&response_bytes).map_err(|e| RegisterError::Json {
                message: format!("Failed to parse IPC response: {}", e),
                source: Some(e),
            })?;

        if let Some(err) = response.error {
            return Err(err.into());
        }

        response
            .result
            .ok_or_else(|| RegisterError::Other("IPC response missing result".to_string()))
    }

    async fn call_typed<P: Serialize, T: DeserializeOwned>(&self, method: &str, params: &P) -> Result<T> {
        let value = self.call(method, serde_json::to_value(params)?).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn create_register_array(&self, name: &str, capacity: u32) -> Result<()> {
        let params = CreateRequest {
            name: name.to_string(),
            capacity,
        };
        self.call(methods::CREATE, serde_json::to_value(params)?)
            .await
            .map(|_| ())
    }

    pub async fn delete_register_array(&self, name: &str) -> Result<()> {
        let params = DeleteRequest {
            name: name.to_string(),
        };
        self.call(methods::DELETE, serde_json::to_value(params)?)
            .await
            .map(|_| ())
    }

    pub async fn get_register_array(&self, name: &str) -> Result<RegisterArraySnapshot> {
        let params = GetRequest {
            name: name.to_string(),
        };
        self.call_typed(methods::GET, &params).await
    }

    pub async fn get_all_register_arrays(&self) -> Result<Vec<RegisterArraySnapshot>> {
        let response: GetAllResponse = self
            .call_typed(methods::GET_ALL, &serde_json::json!({}))
            .await?;
        Ok(response.arrays)
    }

    pub async fn read_value(&self, name: &str, index: u32) -> Result<u32> {
        let params = ReadItemRequest {
            name: name.to_string(),
            index,
        };
        let response: ReadItemResponse = self.call_typed(methods::READ_VALUE, &params).await?;
        Ok(response.value)
    }

    pub async fn write_value(&self, name: &str, index: u32, value: u32) -> Result<()> {
        let params = WriteItemRequest {
            name: name.to_string(),
            index,
            value,
        };
        self.call(methods::WRITE_VALUE, serde_json::to_value(params)?)
            .await
            .map(|_| ())
    }

    /// Get the address of the connected server.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}
