use anyhow::Context as _;
use axum::http::StatusCode;
use serde_json::Value;

/// Assert that a response has the expected status code
pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(
        actual, expected,
        "{context}: expected status {expected}, got {actual}"
    );
}

/// Assert an error body of the given kind, e.g. `not_found` or `validation_failure`
pub fn assert_error_kind(body: &Value, kind: &str) {
    assert_eq!(
        body.get("error").and_then(Value::as_str),
        Some(kind),
        "expected error kind {kind} in {body}"
    );
}

/// Assert a validation failure names `field`
pub fn assert_field_error(body: &Value, field: &str) {
    assert_error_kind(body, "validation_failure");
    assert!(
        body["fields"].get(field).is_some(),
        "expected a message for {field} in {body}"
    );
}

/// Numeric `id` of a response object
pub fn id_of(body: &Value) -> anyhow::Result<i64> {
    body.get("id")
        .and_then(Value::as_i64)
        .with_context(|| format!("body has no numeric id: {body}"))
}

/// Array of a response body
pub fn items(body: &Value) -> anyhow::Result<&Vec<Value>> {
    body.as_array()
        .with_context(|| format!("expected a JSON array, got {body}"))
}

/// Ids of the objects in a response array, in response order
pub fn ids(body: &Value) -> anyhow::Result<Vec<i64>> {
    items(body)?.iter().map(id_of).collect()
}

/// Integer array field of a response object
pub fn id_list(body: &Value, field: &str) -> anyhow::Result<Vec<i64>> {
    body.get(field)
        .and_then(Value::as_array)
        .with_context(|| format!("{field} is not an array in {body}"))?
        .iter()
        .map(|v| v.as_i64().with_context(|| format!("{field} holds a non-integer")))
        .collect()
}
