//! Centralized configuration for the register store and its transports.
//!
//! Compile-time limits live on constant holder structs. Runtime values
//! (bind address, ports) are collected into [`ServerConfig`].

use std::time::Duration;

/// Local TCP IPC limits.
pub struct IpcConfig;

impl IpcConfig {
    /// Largest accepted frame payload. A full snapshot of a large array must fit.
    pub const MAX_IPC_MESSAGE_SIZE: usize = 64 * 1024 * 1024; // 64MB
    pub const MAX_IPC_CONNECTIONS: usize = 64;
    pub const IPC_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
}

/// HTTP JSON-RPC front end limits.
pub struct HttpConfig;

impl HttpConfig {
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";
    pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024; // 4MB
    pub const MAX_CONCURRENT_REQUESTS: usize = 256;
}

/// Runtime server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface both listeners bind to.
    pub host: String,
    /// HTTP port (0 = auto-assign).
    pub http_port: u16,
    /// TCP IPC port, `None` when the IPC listener is disabled.
    pub ipc_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: HttpConfig::DEFAULT_HOST.to_string(),
            http_port: 0,
            ipc_port: None,
        }
    }
}

impl ServerConfig {
    /// `host:port` string for the HTTP listener.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    /// `host:port` string for the IPC listener, if enabled.
    pub fn ipc_bind_addr(&self) -> Option<String> {
        self.ipc_port.map(|port| format!("{}:{}", self.host, port))
    }
}
