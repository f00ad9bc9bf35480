//! Error types for the transport boundary and the request pipeline.

use serde_json::Value;
use thiserror::Error;

use crate::server_error::ServerError;

/// Errors that can occur while a transport delivers one request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, reset, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The endpoint answered with a non-success status and no JSON-RPC body.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if this error is retryable (transient).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout { .. } => true,
            Self::Status { status, .. } => is_retryable_status(*status),
            Self::Deserialization(_) | Self::Other(_) => false,
        }
    }
}

/// 408, 429 and every 5xx are worth another try.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=599)
}

/// A node-reported error after classification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifiedError {
    /// Old-format node error: `data` carried `error_message` + `error_type`.
    #[error("{message}")]
    LegacyTyped { message: String, error_type: String },

    /// New-format node error: `data` was a structured object.
    #[error("{0}")]
    Structured(ServerError),

    /// The node reported a timeout. The only retryable classification.
    #[error("{message}")]
    Timeout { message: String },

    /// Anything else.
    #[error("{message}")]
    Generic {
        code: i64,
        message: String,
        data: Option<Value>,
        name: Option<String>,
    },
}

impl ClassifiedError {
    /// Returns `true` if the request should be attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// A short discriminator, e.g. `"TimeoutError"` or the legacy/structured type.
    pub fn error_type(&self) -> &str {
        match self {
            Self::LegacyTyped { error_type, .. } => error_type,
            Self::Structured(e) => &e.kind,
            Self::Timeout { .. } => "TimeoutError",
            Self::Generic { name, .. } => name.as_deref().unwrap_or("UntypedError"),
        }
    }
}

/// Everything `RpcClient::send_request` can fail with.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The node reported an error that is not retried.
    #[error(transparent)]
    Node(#[from] ClassifiedError),

    /// The attempt ceiling was reached without a result.
    #[error("Exceeded {attempts} attempts for request to {method}.")]
    RetriesExceeded {
        method: String,
        attempts: u32,
        last_error: Option<String>,
    },

    /// No transport is bound to the client.
    #[error("No provider bound to the RPC client")]
    ProviderUnavailable,

    /// The reply had neither or both of `result` / `error`, or was not a
    /// recognised shape.
    #[error("Malformed response to {method}: {reason}")]
    EnvelopeMalformed { method: String, reason: String },

    /// The caller's cancellation token fired.
    #[error("Request to {method} cancelled")]
    Cancelled { method: String },

    /// A transport failure that is not worth retrying.
    #[error("Transport error on {method}: {source}")]
    Transport {
        method: String,
        #[source]
        source: TransportError,
    },

    /// Params could not be serialized or the result did not fit the
    /// requested type.
    #[error("Deserialization error on {method}: {source}")]
    Deserialization {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RpcError {
    pub(crate) fn malformed(method: &str, reason: impl Into<String>) -> Self {
        Self::EnvelopeMalformed {
            method: method.to_string(),
            reason: reason.into(),
        }
    }

    /// The classified node error, if that is what this is.
    pub fn as_node_error(&self) -> Option<&ClassifiedError> {
        match self {
            Self::Node(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_retryability() {
        assert!(TransportError::Http("connection refused".into()).is_retryable());
        assert!(TransportError::Timeout { ms: 30_000 }.is_retryable());
        assert!(TransportError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(TransportError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(!TransportError::Status { status: 400, body: String::new() }.is_retryable());
        assert!(!TransportError::Other("boom".into()).is_retryable());
    }

    #[test]
    fn only_timeout_classification_is_retryable() {
        assert!(ClassifiedError::Timeout { message: "t".into() }.is_retryable());
        assert!(!ClassifiedError::LegacyTyped {
            message: "m".into(),
            error_type: "T".into()
        }
        .is_retryable());
        assert!(!ClassifiedError::Generic {
            code: -32000,
            message: "m".into(),
            data: None,
            name: None
        }
        .is_retryable());
    }

    #[test]
    fn retries_exceeded_message_names_method() {
        let err = RpcError::RetriesExceeded {
            method: "block".into(),
            attempts: 12,
            last_error: None,
        };
        assert_eq!(err.to_string(), "Exceeded 12 attempts for request to block.");
    }
}
