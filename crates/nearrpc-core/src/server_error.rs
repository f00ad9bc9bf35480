//! Parser for structured (new-format) NEAR server errors.
//!
//! Nodes nest the error as a chain of single-variant objects, e.g.
//!
//! ```json
//! {"TxExecutionError": {"ActionError": {"index": 0, "kind": {"AccountDoesNotExist": {"account_id": "bob.near"}}}}}
//! ```
//!
//! The parser follows that chain down to the innermost variant, which becomes
//! the error's `kind`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind reported when no variant name can be found.
pub const UNTYPED_ERROR: &str = "UntypedError";

/// A structured server error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerError {
    /// Innermost variant name, e.g. `"AccountDoesNotExist"`.
    pub kind: String,
    /// Every variant name from the outermost down, `kind` last.
    pub path: Vec<String>,
    /// The object the innermost variant carried.
    pub details: Value,
    /// Human-readable rendering of `kind` and its scalar fields.
    pub message: String,
}

impl ServerError {
    /// Returns `true` if any level of the chain is named `name`.
    pub fn has_variant(&self, name: &str) -> bool {
        self.path.iter().any(|p| p == name)
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Parse the `data` object of a JSON-RPC error into a [`ServerError`].
pub fn parse_server_error(data: &Map<String, Value>) -> ServerError {
    let mut path = Vec::new();
    let mut current = data;

    while let Some((key, next)) = next_variant(current) {
        if key != "kind" {
            path.push(key.to_string());
        }
        match next {
            Value::Object(inner) => current = inner,
            Value::String(leaf) => {
                path.push(leaf.clone());
                break;
            }
            _ => break,
        }
    }

    let kind = path
        .last()
        .cloned()
        .unwrap_or_else(|| UNTYPED_ERROR.to_string());
    let message = render_message(&kind, current);

    ServerError {
        kind,
        path,
        details: Value::Object(current.clone()),
        message,
    }
}

fn next_variant(obj: &Map<String, Value>) -> Option<(&str, &Value)> {
    let descendable = |v: &Value| v.is_object() || v.is_string();
    obj.iter()
        .find(|&(k, v)| is_variant_name(k) && descendable(v))
        .map(|(k, v)| (k.as_str(), v))
        .or_else(|| obj.get("kind").filter(|&v| descendable(v)).map(|v| ("kind", v)))
}

fn is_variant_name(key: &str) -> bool {
    key.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && key.chars().all(|c| c.is_ascii_alphanumeric())
}

fn render_message(kind: &str, details: &Map<String, Value>) -> String {
    let fields: Vec<String> = details
        .iter()
        .filter_map(|(k, v)| match v {
            Value::String(s) => Some(format!("{k}={s}")),
            Value::Number(n) => Some(format!("{k}={n}")),
            Value::Bool(b) => Some(format!("{k}={b}")),
            _ => None,
        })
        .collect();

    if fields.is_empty() {
        kind.to_string()
    } else {
        format!("{kind}: {}", fields.join(", "))
    }
}
