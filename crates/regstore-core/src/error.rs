//! Error types for the register store.
//!
//! Store failures are always caller errors: the referenced array is missing,
//! a create collides with a live name, or an index falls outside capacity.
//! Transport and protocol errors share the same enum so that every layer can
//! report through one `Result` alias and one JSON-RPC code mapping.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;

/// Machine-checkable kind of a rejected store request.
///
/// Serialized by variant name (`"NotFound"`, `"AlreadyExists"`,
/// `"OutOfRange"`) in the `data.kind` field of JSON-RPC error objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    OutOfRange,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::AlreadyExists => "AlreadyExists",
            ErrorKind::OutOfRange => "OutOfRange",
        }
    }

    /// Map an application error code back to its kind.
    pub fn from_rpc_code(code: i32) -> Option<Self> {
        match code {
            -32001 => Some(ErrorKind::NotFound),
            -32002 => Some(ErrorKind::AlreadyExists),
            -32003 => Some(ErrorKind::OutOfRange),
            _ => None,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for register store operations and their transports.
#[derive(Debug, Error)]
pub enum RegisterError {
    // Store errors
    #[error("Register array not found: {name}")]
    NotFound { name: String },

    #[error("Register array already exists: {name}")]
    AlreadyExists { name: String },

    #[error("Index {index} out of range for register array {name} (capacity {capacity})")]
    OutOfRange {
        name: String,
        index: u32,
        capacity: u32,
    },

    // Request errors
    #[error("Invalid params: {message}")]
    InvalidParams { message: String },

    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    // Transport errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Connection to register server at {addr} lost")]
    ConnectionLost { addr: SocketAddr },

    #[error("{message}")]
    Remote {
        kind: Option<ErrorKind>,
        code: i32,
        message: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for register store operations.
pub type Result<T> = std::result::Result<T, RegisterError>;

impl From<std::io::Error> for RegisterError {
    fn from(err: std::io::Error) -> Self {
        RegisterError::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for RegisterError {
    fn from(err: serde_json::Error) -> Self {
        RegisterError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl RegisterError {
    pub fn not_found(name: impl Into<String>) -> Self {
        RegisterError::NotFound { name: name.into() }
    }

    pub fn already_exists(name: impl Into<String>) -> Self {
        RegisterError::AlreadyExists { name: name.into() }
    }

    /// The machine-checkable kind, if this error is a rejected store request.
    ///
    /// Remote errors report the kind the server sent along with them.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            RegisterError::NotFound { .. } => Some(ErrorKind::NotFound),
            RegisterError::AlreadyExists { .. } => Some(ErrorKind::AlreadyExists),
            RegisterError::OutOfRange { .. } => Some(ErrorKind::OutOfRange),
            RegisterError::Remote { kind, .. } => *kind,
            _ => None,
        }
    }

    /// Convert to a JSON-RPC error code.
    ///
    /// Standard JSON-RPC error codes:
    /// - -32700: Parse error
    /// - -32600: Invalid Request
    /// - -32601: Method not found
    /// - -32602: Invalid params
    /// - -32603: Internal error
    ///
    /// Custom error codes (application-defined, -32000 to -32099):
    /// - -32001: Register array not found
    /// - -32002: Register array already exists
    /// - -32003: Index out of range
    /// - -32005: Validation error
    pub fn to_rpc_error_code(&self) -> i32 {
        match self {
            RegisterError::NotFound { .. } => -32001,
            RegisterError::AlreadyExists { .. } => -32002,
            RegisterError::OutOfRange { .. } => -32003,
            RegisterError::Validation { .. } => -32005,
            RegisterError::InvalidParams { .. } => -32602,
            RegisterError::MethodNotFound { .. } => -32601,
            RegisterError::Remote { code, .. } => *code,

            // All other errors are internal errors
            _ => -32603,
        }
    }

    /// Structured `data` for a JSON-RPC error object.
    pub fn to_rpc_error_data(&self) -> Option<serde_json::Value> {
        self.kind()
            .map(|kind| serde_json::json!({ "kind": kind.as_str() }))
    }
}
