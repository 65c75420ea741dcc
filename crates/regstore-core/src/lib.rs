//! Regstore Core - named, fixed-capacity `u32` register arrays.
//!
//! This crate provides the register store, the JSON-RPC method routing on top
//! of it, and a framed TCP transport. It can be used programmatically without
//! any RPC layer.
//!
//! # Example
//!
//! ```rust
//! use regstore_core::RegisterStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> regstore_core::Result<()> {
//! let store = RegisterStore::new();
//! store.create("test", 16).await?;
//! store.write_item("test", 0, 100).await?;
//!
//! assert_eq!(store.read_item("test", 0).await?, 100);
//! assert_eq!(store.get("test").await?.size, 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod ipc;
pub mod service;
pub mod store;

pub use config::{HttpConfig, IpcConfig, ServerConfig};
pub use error::{ErrorKind, RegisterError, Result};
pub use ipc::{IpcDispatch, IpcServer, IpcServerHandle, RegisterClient};
pub use service::RegisterService;
pub use store::{RegisterArray, RegisterArraySnapshot, RegisterStore};
