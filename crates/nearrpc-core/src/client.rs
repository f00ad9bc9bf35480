//! The request pipeline: id stamping, transport round-trip, unwrapping,
//! classification and backoff, all behind [`RpcClient::send_request`].

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::RpcError;
use crate::id::RequestIdGenerator;
use crate::policy::BackoffPolicy;
use crate::request::JsonRpcRequest;
use crate::response::{unwrap_reply, Outcome};
use crate::transport::RpcTransport;

/// JSON-RPC client for a NEAR node.
///
/// Cheap to share behind an `Arc`; every method takes `&self`, and any
/// number of requests may be in flight at once. The only state they share
/// is the request id counter.
pub struct RpcClient {
    transport: Option<Arc<dyn RpcTransport>>,
    ids: RequestIdGenerator,
    backoff: BackoffPolicy,
    account_id: Option<String>,
    suppress_retry_logs: bool,
}

impl RpcClient {
    /// Create a client bound to `transport`.
    pub fn new(transport: Arc<dyn RpcTransport>, config: ClientConfig) -> Self {
        let mut client = Self::unbound(config);
        client.transport = Some(transport);
        client
    }

    /// Create with default configuration plus environment overrides.
    pub fn default_for(transport: Arc<dyn RpcTransport>) -> Self {
        Self::new(transport, ClientConfig::default().with_env_overrides())
    }

    /// Create a client with no transport. Every request fails with
    /// [`RpcError::ProviderUnavailable`] until one is bound.
    pub fn unbound(config: ClientConfig) -> Self {
        Self {
            transport: None,
            ids: RequestIdGenerator::new(),
            backoff: BackoffPolicy::new(config.backoff()),
            account_id: config.account_id,
            suppress_retry_logs: config.suppress_retry_logs,
        }
    }

    /// Bind (or replace) the transport.
    pub fn bind(&mut self, transport: Arc<dyn RpcTransport>) {
        self.transport = Some(transport);
    }

    /// Draw ids from `ids` instead of the client's own counter.
    pub fn with_id_generator(mut self, ids: RequestIdGenerator) -> Self {
        self.ids = ids;
        self
    }

    pub fn id_generator(&self) -> &RequestIdGenerator {
        &self.ids
    }

    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    /// Account used to resolve bare transaction-hash replies.
    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// Send `method` with `params` (a JSON object or positional array) and
    /// deserialize the result into `T`.
    pub async fn send_request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: impl Serialize,
    ) -> Result<T, RpcError> {
        self.send_request_with_cancel(method, params, &CancellationToken::new())
            .await
    }

    /// Like [`send_request`](Self::send_request), but gives up with
    /// [`RpcError::Cancelled`] as soon as `cancel` fires, whether the request
    /// is on the wire or waiting out a backoff.
    pub async fn send_request_with_cancel<T: DeserializeOwned>(
        &self,
        method: &str,
        params: impl Serialize,
        cancel: &CancellationToken,
    ) -> Result<T, RpcError> {
        let params = serde_json::to_value(params).map_err(|source| RpcError::Deserialization {
            method: method.to_string(),
            source,
        })?;
        let result = self.send_value(method, params, cancel, true).await?;
        serde_json::from_value(result).map_err(|source| RpcError::Deserialization {
            method: method.to_string(),
            source,
        })
    }

    fn send_value<'a>(
        &'a self,
        method: &'a str,
        params: Value,
        cancel: &'a CancellationToken,
        resolve_bare_hash: bool,
    ) -> BoxFuture<'a, Result<Value, RpcError>> {
        Box::pin(async move {
            let transport = self.transport.as_ref().ok_or(RpcError::ProviderUnavailable)?;
            let cancelled = || RpcError::Cancelled {
                method: method.to_string(),
            };

            let max_attempts = self.backoff.max_attempts();
            let mut last_error = None;

            for attempt in 0..max_attempts {
                let req = JsonRpcRequest::new(self.ids.next(), method, params.clone());
                tracing::debug!(method, id = %req.id, attempt, url = transport.url(), "sending request");

                let sent = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(cancelled()),
                    sent = transport.send(req) => sent,
                };

                let reason = match sent {
                    Ok(reply) => match unwrap_reply(method, reply, self.account_id()) {
                        Outcome::Success(result) => return Ok(result),
                        Outcome::Fail(e) => return Err(e),
                        Outcome::TxStatusLookup { tx_hash, .. } if !resolve_bare_hash => {
                            return Err(RpcError::malformed(
                                method,
                                format!("tx lookup answered with another bare hash {tx_hash}"),
                            ));
                        }
                        Outcome::TxStatusLookup { tx_hash, sender_id } => {
                            tracing::debug!(method, %tx_hash, %sender_id, "resolving bare transaction hash");
                            return self
                                .send_value("tx", json!([tx_hash, sender_id]), cancel, false)
                                .await;
                        }
                        Outcome::Retry(timeout) => {
                            if !self.suppress_retry_logs {
                                tracing::warn!(
                                    method,
                                    attempt,
                                    params = %params,
                                    "Retrying request to {method} as it has timed out"
                                );
                            }
                            timeout.to_string()
                        }
                    },
                    Err(e) if e.is_retryable() => {
                        tracing::warn!(
                            method,
                            attempt,
                            error = %e,
                            url = transport.url(),
                            "transport failure, retrying request"
                        );
                        e.to_string()
                    }
                    Err(source) => {
                        return Err(RpcError::Transport {
                            method: method.to_string(),
                            source,
                        })
                    }
                };
                last_error = Some(reason);

                if !self.backoff.should_retry(attempt) {
                    break;
                }
                let delay = self.backoff.delay_for(attempt);
                tracing::debug!(method, attempt, delay_ms = delay.as_millis() as u64, "backing off");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(cancelled()),
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            tracing::error!(method, attempts = max_attempts, "max retries exceeded");
            Err(RpcError::RetriesExceeded {
                method: method.to_string(),
                attempts: max_attempts,
                last_error,
            })
        })
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("url", &self.transport.as_ref().map(|t| t.url()))
            .field("backoff", &self.backoff.config)
            .field("account_id", &self.account_id)
            .finish()
    }
}
