//! Host connection for keydeck plugins.
//!
//! This crate turns a set of action definitions into a running plugin process:
//!
//! - [`config`]: the launch flags the host passes (`-port`, `-pluginUUID`, ...)
//! - [`connection`]: WebSocket dial, registration handshake and the receive loop
//! - [`logging`]: tracing setup writing to stderr and a temp-dir log file
//! - [`error`]: connection and configuration errors
//!
//! # Example
//!
//! ```no_run
//! use keydeck_rpc::{LaunchConfig, serve};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = LaunchConfig::from_env()?;
//! let shutdown = CancellationToken::new();
//! serve(&config, Vec::new(), shutdown).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod logging;

pub use config::LaunchConfig;
pub use connection::{run, serve};
pub use error::{ConfigError, ConnectionError, Result};
