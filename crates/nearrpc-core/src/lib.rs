//! nearrpc-core — the JSON-RPC request pipeline for NEAR nodes.
//!
//! # Overview
//!
//! Every call goes through one chokepoint, [`RpcClient::send_request`], which:
//!
//! - stamps a fresh id from a [`RequestIdGenerator`] on each attempt
//! - hands the envelope to a pluggable [`RpcTransport`]
//! - unwraps the reply ([`response`]) and classifies node errors ([`classify`])
//! - retries node timeouts and transient transport failures with exponential
//!   backoff ([`policy`]), everything else fails immediately
//!
//! ```text
//! caller → RpcClient → [id] → transport → unwrap → classify → backoff? → result | RpcError
//! ```

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod id;
pub mod methods;
pub mod policy;
pub mod request;
pub mod response;
pub mod server_error;
pub mod transport;

pub use classify::classify;
pub use client::RpcClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ClassifiedError, RpcError, TransportError};
pub use id::RequestIdGenerator;
pub use methods::{BlockId, BlockReference, ChunkId, Finality};
pub use policy::{BackoffConfig, BackoffPolicy};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId, RpcReply};
pub use server_error::{parse_server_error, ServerError};
pub use tokio_util::sync::CancellationToken;
pub use transport::RpcTransport;
