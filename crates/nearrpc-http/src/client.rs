//! HTTP JSON-RPC transport backed by `reqwest`.
//!
//! One POST per request. Retrying, classification and unwrapping are left to
//! [`RpcClient`](nearrpc_core::RpcClient).

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use nearrpc_core::error::TransportError;
use nearrpc_core::request::{JsonRpcRequest, RpcReply};
use nearrpc_core::transport::RpcTransport;

/// Configuration for `HttpTransport`.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    pub request_timeout: Duration,
    /// Extra headers sent with every request (e.g. an API key).
    pub headers: HashMap<String, String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            headers: HashMap::new(),
        }
    }
}

/// HTTP JSON-RPC transport.
pub struct HttpTransport {
    url: String,
    http: reqwest::Client,
    request_timeout: Duration,
}

impl HttpTransport {
    /// Create a new transport for the given JSON-RPC endpoint URL.
    pub fn new(url: impl Into<String>, config: HttpTransportConfig) -> Result<Self, TransportError> {
        let mut headers = reqwest::header::HeaderMap::new();
        for (name, value) in &config.headers {
            let name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::Other(format!("invalid header name {name}: {e}")))?;
            let value = reqwest::header::HeaderValue::from_str(value)
                .map_err(|e| TransportError::Other(format!("invalid header value: {e}")))?;
            headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            http,
            request_timeout: config.request_timeout,
        })
    }

    /// Create with default configuration.
    pub fn default_for(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::new(url, HttpTransportConfig::default())
    }

    fn map_send_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else {
            TransportError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn send(&self, req: JsonRpcRequest) -> Result<RpcReply, TransportError> {
        let resp = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_send_error(e))?;

        if status.is_success() {
            return serde_json::from_str::<RpcReply>(&body).map_err(TransportError::from);
        }

        // Nodes answer some failures with a 4xx/5xx that still carries a
        // JSON-RPC error envelope; hand those to the classifier.
        if let Ok(RpcReply::Envelope(envelope)) = serde_json::from_str::<RpcReply>(&body) {
            if envelope.error.is_some() {
                tracing::debug!(status = status.as_u16(), url = %self.url, "error envelope on non-success status");
                return Ok(RpcReply::Envelope(envelope));
            }
        }

        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn url(&self) -> &str {
        &self.url
    }
}
