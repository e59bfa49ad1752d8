//! Domain-specific assertions for Reader MCP tests

use predicates::prelude::*;
use serde_json::Value;

/// Assert that stderr does NOT contain any of the given strings
///
/// # Example
///
/// ```rust
/// use reader_test_helpers::assertions::stderr_not_contains;
/// use predicates::prelude::*;
///
/// assert!(stderr_not_contains(&["supersecret"]).eval("token check passed"));
/// ```
pub fn stderr_not_contains(values: &[&str]) -> impl Predicate<str> {
    let owned_values: Vec<String> = values.iter().map(|&s| s.to_string()).collect();
    predicate::function(move |s: &str| !owned_values.iter().any(|v| s.contains(v.as_str())))
}

/// Predicate for one line of server output being a JSON-RPC 2.0 response.
///
/// The line must parse as JSON, carry `"jsonrpc": "2.0"` and an `id` member,
/// and hold exactly one of `result` and `error`.
///
/// ```rust
/// use reader_test_helpers::assertions::valid_jsonrpc_response;
/// use predicates::prelude::*;
///
/// assert!(valid_jsonrpc_response().eval(r#"{"jsonrpc":"2.0","id":1,"result":{}}"#));
/// ```
pub fn valid_jsonrpc_response() -> impl Predicate<str> {
    predicate::function(|line: &str| {
        let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(line) else {
            return false;
        };
        obj.get("jsonrpc") == Some(&Value::from("2.0"))
            && obj.contains_key("id")
            && (obj.contains_key("result") != obj.contains_key("error"))
    })
}

/// Parse newline-delimited JSON-RPC output into values, skipping blank lines
pub fn jsonrpc_lines(output: &str) -> Vec<Value> {
    output
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("not JSON: {} ({})", l, e)))
        .collect()
}

/// Find the response carrying `id`
pub fn response_with_id(responses: &[Value], id: i64) -> Option<&Value> {
    responses.iter().find(|r| r["id"] == Value::from(id))
}
