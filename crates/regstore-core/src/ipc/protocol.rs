//! Shared IPC protocol types and framing.
//!
//! Defines the wire format for the TCP transport: 4-byte big-endian length
//! prefix followed by a UTF-8 JSON-RPC 2.0 payload.
//!
//! ```text
//! [u32 BE: len][UTF-8 JSON bytes of len]
//! ```

use crate::config::IpcConfig;
use crate::{RegisterError, Result};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Protocol version every request and response carries.
pub const JSONRPC_VERSION: &str = "2.0";

fn jsonrpc_version() -> String {
    JSONRPC_VERSION.to_string()
}

/// A register call as it travels on either transport.
///
/// `params` may be omitted; the server then dispatches with an empty object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
    pub id: Option<serde_json::Value>,
}

impl IpcRequest {
    pub fn new(method: impl Into<String>, params: serde_json::Value, id: u64) -> Self {
        Self {
            jsonrpc: jsonrpc_version(),
            method: method.into(),
            params: Some(params),
            id: Some(id.into()),
        }
    }
}

/// Reply to one [`IpcRequest`]. Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<IpcError>,
    pub id: Option<serde_json::Value>,
}

impl IpcResponse {
    fn reply(
        id: Option<serde_json::Value>,
        outcome: std::result::Result<serde_json::Value, IpcError>,
    ) -> Self {
        let (result, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(err) => (None, Some(err)),
        };
        Self {
            jsonrpc: jsonrpc_version(),
            result,
            error,
            id,
        }
    }

    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self::reply(id, Ok(result))
    }

    /// Protocol-level failure with no register error behind it.
    pub fn error(id: Option<serde_json::Value>, code: i32, message: impl Into<String>) -> Self {
        Self::reply(
            id,
            Err(IpcError {
                code,
                message: message.into(),
                data: None,
            }),
        )
    }

    /// Failure carrying the code, message and `data.kind` of `err`.
    pub fn from_error(id: Option<serde_json::Value>, err: &RegisterError) -> Self {
        Self::reply(id, Err(IpcError::from(err)))
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl From<&RegisterError> for IpcError {
    fn from(err: &RegisterError) -> Self {
        Self {
            code: err.to_rpc_error_code(),
            message: err.to_string(),
            data: err.to_rpc_error_data(),
        }
    }
}

impl From<IpcError> for RegisterError {
    fn from(err: IpcError) -> Self {
        let kind = err
            .data
            .as_ref()
            .and_then(|data| data.get("kind"))
            .and_then(|kind| serde_json::from_value(kind.clone()).ok())
            .or_else(|| crate::ErrorKind::from_rpc_code(err.code));
        RegisterError::Remote {
            kind,
            code: err.code,
            message: err.message,
        }
    }
}

/// Reject payloads larger than the frame limit.
pub(crate) fn check_frame_len(len: usize) -> Result<()> {
    if len > IpcConfig::MAX_IPC_MESSAGE_SIZE {
        return Err(RegisterError::Validation {
            field: "ipc_frame".to_string(),
            message: format!(
                "frame of {} bytes exceeds the {} byte limit",
                len,
                IpcConfig::MAX_IPC_MESSAGE_SIZE
            ),
        });
    }
    Ok(())
}

/// Read one frame. `None` means the peer closed the connection between frames.
pub async fn read_frame<R: AsyncReadExt + Unpin>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    check_frame_len(len)?;

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload))
}

/// Write one frame and flush it.
pub async fn write_frame<W: AsyncWriteExt + Unpin>(writer: &mut W, payload: &[u8]) -> Result<()> {
    check_frame_len(payload.len())?;

    writer.write_u32(payload.len() as u32).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}
