//! Framed TCP IPC for the register service.
//!
//! Length-prefixed JSON-RPC 2.0 over TCP connections.
//!
//! # Architecture
//!
//! - **Server**: Accepts connections, dispatches method calls
//! - **Client**: Connects to a server, exposes typed register operations
//! - **Protocol**: Shared framing and JSON-RPC types used by both

pub mod client;
pub mod protocol;
pub mod server;

pub use client::RegisterClient;
pub use protocol::{IpcError, IpcRequest, IpcResponse};
pub use server::{IpcDispatch, IpcServer, IpcServerHandle};
