//! The `RpcTransport` trait — the boundary between the request pipeline and
//! whatever physically delivers bytes (HTTP endpoint, wallet bridge, ...).

use async_trait::async_trait;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, RpcReply};

/// The async trait every transport must implement.
///
/// A transport delivers exactly one request per call and reports what came
/// back; retrying, classification and unwrapping happen in
/// [`RpcClient`](crate::client::RpcClient).
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn RpcTransport>`.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Send a single JSON-RPC request and return the raw reply.
    async fn send(&self, req: JsonRpcRequest) -> Result<RpcReply, TransportError>;

    /// Return the transport's identifier (URL or name).
    fn url(&self) -> &str;
}
