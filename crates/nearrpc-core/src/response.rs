//! Turns a raw transport reply into the next step of the request loop.

use serde_json::Value;

use crate::classify::classify;
use crate::error::{ClassifiedError, RpcError};
use crate::request::{JsonRpcResponse, RpcReply};

/// What the request loop should do with one reply.
#[derive(Debug)]
pub enum Outcome {
    /// The call produced a result.
    Success(Value),
    /// The node timed out; wait and try again.
    Retry(ClassifiedError),
    /// Terminal failure.
    Fail(RpcError),
    /// The reply was a bare `[tx_hash]`; the result is the status of that
    /// transaction as seen by `sender_id`.
    TxStatusLookup { tx_hash: String, sender_id: String },
}

/// Classify `reply` to the request for `method`.
///
/// `account_id` is the account a bare transaction hash belongs to.
pub fn unwrap_reply(method: &str, reply: RpcReply, account_id: Option<&str>) -> Outcome {
    match reply {
        RpcReply::Bare(items) => unwrap_bare(method, items, account_id),
        RpcReply::Envelope(resp) => unwrap_envelope(method, resp),
    }
}

fn unwrap_bare(method: &str, items: Vec<Value>, account_id: Option<&str>) -> Outcome {
    let tx_hash = match items.into_iter().next() {
        Some(Value::String(hash)) => hash,
        Some(other) => {
            return Outcome::Fail(RpcError::malformed(
                method,
                format!("expected a transaction hash, got {other}"),
            ))
        }
        None => return Outcome::Fail(RpcError::malformed(method, "empty array reply")),
    };
    match account_id {
        Some(sender) => Outcome::TxStatusLookup {
            tx_hash,
            sender_id: sender.to_string(),
        },
        None => Outcome::Fail(RpcError::malformed(
            method,
            format!("transaction hash {tx_hash} returned but no account id is bound"),
        )),
    }
}

fn unwrap_envelope(method: &str, resp: JsonRpcResponse) -> Outcome {
    match (resp.result, resp.error) {
        (Some(result), None) => Outcome::Success(result),
        (None, Some(error)) => {
            let classified = classify(&error);
            if classified.is_retryable() {
                Outcome::Retry(classified)
            } else {
                Outcome::Fail(RpcError::Node(classified))
            }
        }
        (Some(_), Some(_)) => {
            Outcome::Fail(RpcError::malformed(method, "both result and error present"))
        }
        (None, None) => {
            Outcome::Fail(RpcError::malformed(method, "neither result nor error present"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{JsonRpcError, RpcId};
    use serde_json::json;

    fn envelope(v: Value) -> RpcReply {
        RpcReply::Envelope(serde_json::from_value(v).unwrap())
    }

    #[test]
    fn success_envelope() {
        let reply = envelope(json!({"jsonrpc": "2.0", "id": 1, "result": {"chain_id": "testnet"}}));
        match unwrap_reply("status", reply, None) {
            Outcome::Success(v) => assert_eq!(v, json!({"chain_id": "testnet"})),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn null_result_is_success() {
        let reply = envelope(json!({"jsonrpc": "2.0", "id": 1, "result": null}));
        assert!(matches!(
            unwrap_reply("status", reply, None),
            Outcome::Success(Value::Null)
        ));
    }

    #[test]
    fn timeout_error_is_retry() {
        let reply = RpcReply::Envelope(JsonRpcResponse::failure(
            RpcId::Number(1),
            JsonRpcError::new(-32000, "timeout", Some(json!("Timeout"))),
        ));
        assert!(matches!(
            unwrap_reply("block", reply, None),
            Outcome::Retry(ClassifiedError::Timeout { .. })
        ));
    }

    #[test]
    fn other_error_is_fail() {
        let reply = envelope(json!({
            "jsonrpc": "2.0", "id": 1,
            "error": {"code": -32000, "message": "Server error",
                      "data": {"error_message": "no such key", "error_type": "AccessKeyDoesNotExist"}}
        }));
        match unwrap_reply("query", reply, None) {
            Outcome::Fail(RpcError::Node(ClassifiedError::LegacyTyped { error_type, .. })) => {
                assert_eq!(error_type, "AccessKeyDoesNotExist")
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn neither_result_nor_error_is_malformed() {
        let reply = envelope(json!({"jsonrpc": "2.0", "id": 1}));
        assert!(matches!(
            unwrap_reply("status", reply, None),
            Outcome::Fail(RpcError::EnvelopeMalformed { .. })
        ));
    }

    #[test]
    fn both_result_and_error_is_malformed() {
        let reply = envelope(json!({
            "jsonrpc": "2.0", "id": 1, "result": {},
            "error": {"code": 1, "message": "x"}
        }));
        assert!(matches!(
            unwrap_reply("status", reply, None),
            Outcome::Fail(RpcError::EnvelopeMalformed { .. })
        ));
    }

    #[test]
    fn bare_hash_requests_lookup() {
        let reply = RpcReply::Bare(vec![json!("H9k2abc")]);
        match unwrap_reply("broadcast_tx_async", reply, Some("alice.near")) {
            Outcome::TxStatusLookup { tx_hash, sender_id } => {
                assert_eq!(tx_hash, "H9k2abc");
                assert_eq!(sender_id, "alice.near");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn bare_hash_without_account_fails() {
        let reply = RpcReply::Bare(vec![json!("H9k2abc")]);
        assert!(matches!(
            unwrap_reply("broadcast_tx_async", reply, None),
            Outcome::Fail(RpcError::EnvelopeMalformed { .. })
        ));
    }

    #[test]
    fn empty_or_non_string_array_fails() {
        assert!(matches!(
            unwrap_reply("x", RpcReply::Bare(vec![]), Some("a.near")),
            Outcome::Fail(RpcError::EnvelopeMalformed { .. })
        ));
        assert!(matches!(
            unwrap_reply("x", RpcReply::Bare(vec![json!(5)]), Some("a.near")),
            Outcome::Fail(RpcError::EnvelopeMalformed { .. })
        ));
    }
}
