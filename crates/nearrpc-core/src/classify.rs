//! Maps a node-reported JSON-RPC error onto [`ClassifiedError`].

use serde_json::{Map, Value};

use crate::error::ClassifiedError;
use crate::request::JsonRpcError;
use crate::server_error::parse_server_error;

/// `data` value some nodes use to report a timeout.
const TIMEOUT_DATA: &str = "Timeout";

/// Substrings of the composed message that also mean "timed out".
const TIMEOUT_MARKERS: [&str; 2] = ["Timeout error", "query has timed out"];

/// Classify a JSON-RPC error payload.
///
/// 1. `data` is `{error_message: string, error_type: string}` → legacy.
/// 2. `data` is any other object → structured.
/// 3. Otherwise (string, number, array, null or absent) → timeout
///    (heuristic) or generic. Arrays are rendered as JSON into the message.
pub fn classify(error: &JsonRpcError) -> ClassifiedError {
    match &error.data {
        Some(Value::Object(data)) => match legacy_fields(data) {
            Some((message, error_type)) => ClassifiedError::LegacyTyped {
                message: message.to_string(),
                error_type: error_type.to_string(),
            },
            None => ClassifiedError::Structured(parse_server_error(data)),
        },
        scalar => classify_scalar(error, scalar.as_ref()),
    }
}

fn legacy_fields(data: &Map<String, Value>) -> Option<(&str, &str)> {
    let message = data.get("error_message")?.as_str()?;
    let error_type = data.get("error_type")?.as_str()?;
    Some((message, error_type))
}

fn classify_scalar(error: &JsonRpcError, data: Option<&Value>) -> ClassifiedError {
    let message = compose_message(error.code, &error.message, data);

    // Nodes do not report timeouts with a dedicated code yet; all three
    // checks are needed to catch the variants seen in the wild.
    let data_is_timeout = matches!(data, Some(Value::String(s)) if s == TIMEOUT_DATA);
    if data_is_timeout || TIMEOUT_MARKERS.iter().any(|m| message.contains(m)) {
        return ClassifiedError::Timeout { message };
    }

    ClassifiedError::Generic {
        code: error.code,
        message,
        data: data.filter(|d| !d.is_null()).cloned(),
        name: error.name.clone(),
    }
}

/// `"[{code}] {message}: {data}"`, without the data suffix when there is none.
fn compose_message(code: i64, message: &str, data: Option<&Value>) -> String {
    match data {
        None | Some(Value::Null) => format!("[{code}] {message}"),
        Some(Value::String(s)) => format!("[{code}] {message}: {s}"),
        Some(other) => format!("[{code}] {message}: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn err(code: i64, message: &str, data: Option<Value>) -> JsonRpcError {
        JsonRpcError::new(code, message, data)
    }

    #[test]
    fn legacy_format() {
        let e = err(
            -32000,
            "Server error",
            Some(json!({"error_message": "account not found", "error_type": "AccountDoesNotExist"})),
        );
        assert_eq!(
            classify(&e),
            ClassifiedError::LegacyTyped {
                message: "account not found".into(),
                error_type: "AccountDoesNotExist".into(),
            }
        );
    }

    #[test]
    fn legacy_requires_string_fields() {
        let e = err(
            -32000,
            "Server error",
            Some(json!({"error_message": 5, "error_type": "X"})),
        );
        assert!(matches!(classify(&e), ClassifiedError::Structured(_)));
    }

    #[test]
    fn structured_format() {
        let e = err(
            -32000,
            "Server error",
            Some(json!({"TxExecutionError": {"InvalidTxError": {"InvalidSignature": {}}}})),
        );
        match classify(&e) {
            ClassifiedError::Structured(s) => assert_eq!(s.kind, "InvalidSignature"),
            other => panic!("expected structured, got {other:?}"),
        }
    }

    #[test]
    fn structured_never_timeout() {
        // Even a "Timeout"-looking message goes down the structured branch.
        let e = err(-32000, "Timeout error", Some(json!({"foo": "bar"})));
        assert!(matches!(classify(&e), ClassifiedError::Structured(_)));
    }

    #[test]
    fn timeout_by_data() {
        let e = err(-32000, "Server error", Some(json!("Timeout")));
        assert_eq!(
            classify(&e),
            ClassifiedError::Timeout {
                message: "[-32000] Server error: Timeout".into()
            }
        );
    }

    #[test]
    fn timeout_by_message_marker() {
        let e = err(-32000, "Timeout error while waiting", None);
        assert!(classify(&e).is_retryable());
    }

    #[test]
    fn timeout_by_data_marker() {
        let e = err(-32000, "Server error", Some(json!("the query has timed out, retry")));
        assert!(matches!(classify(&e), ClassifiedError::Timeout { .. }));
    }

    #[test]
    fn lowercase_timeout_data_is_generic() {
        let e = err(-32000, "timeout", Some(json!("timeout")));
        assert!(matches!(classify(&e), ClassifiedError::Generic { .. }));
    }

    #[test]
    fn generic_keeps_code_data_and_name() {
        let mut e = err(-32602, "Invalid params", Some(json!("missing field `block_id`")));
        e.name = Some("REQUEST_VALIDATION_ERROR".into());
        assert_eq!(
            classify(&e),
            ClassifiedError::Generic {
                code: -32602,
                message: "[-32602] Invalid params: missing field `block_id`".into(),
                data: Some(json!("missing field `block_id`")),
                name: Some("REQUEST_VALIDATION_ERROR".into()),
            }
        );
    }

    #[test]
    fn generic_without_data() {
        match classify(&err(-32601, "Method not found", None)) {
            ClassifiedError::Generic { message, data, .. } => {
                assert_eq!(message, "[-32601] Method not found");
                assert!(data.is_none());
            }
            other => panic!("expected generic, got {other:?}"),
        }
    }

    #[test]
    fn numeric_data_is_rendered() {
        match classify(&err(-32000, "Server error", Some(json!(42)))) {
            ClassifiedError::Generic { message, .. } => {
                assert_eq!(message, "[-32000] Server error: 42")
            }
            other => panic!("expected generic, got {other:?}"),
        }
    }

    #[test]
    fn array_data_is_generic() {
        let e = err(-32000, "Server error", Some(json!(["a", 1])));
        match classify(&e) {
            ClassifiedError::Generic { message, data, .. } => {
                assert_eq!(message, r#"[-32000] Server error: ["a",1]"#);
                assert_eq!(data, Some(json!(["a", 1])));
            }
            other => panic!("expected generic, got {other:?}"),
        }
    }

    #[test]
    fn array_data_can_still_match_timeout_marker() {
        let e = err(-32000, "Server error", Some(json!(["query has timed out"])));
        assert!(matches!(classify(&e), ClassifiedError::Timeout { .. }));
    }
}
