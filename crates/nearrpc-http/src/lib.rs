//! nearrpc-http — HTTP JSON-RPC transport for nearrpc.
//!
//! # Quick start
//! ```rust,no_run
//! use std::sync::Arc;
//! use nearrpc_core::{ClientConfig, RpcClient};
//! use nearrpc_http::HttpTransport;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::default_for("https://rpc.testnet.near.org")?;
//! let client = RpcClient::new(Arc::new(transport), ClientConfig::default());
//! let status = client.status().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::{HttpTransport, HttpTransportConfig};
