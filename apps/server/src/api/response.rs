//! Success envelope of the registry API

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

/// Tagged success result; failures travel as [`crate::Error`].
#[derive(Debug)]
pub enum Reply<T> {
    /// 200 with a JSON body
    Ok(T),
    /// 201 with a JSON body
    Created(T),
    /// 200 with an XML document
    Xml(String),
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        match self {
            Reply::Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Reply::Created(body) => (StatusCode::CREATED, Json(body)).into_response(),
            Reply::Xml(document) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
                document,
            )
                .into_response(),
        }
    }
}

/// `{"deleted": true}`
pub fn deleted() -> Reply<JsonValue> {
    Reply::Ok(json!({ "deleted": true }))
}

/// `{"deleted": true}` merged with the fields of `details`.
pub fn deleted_with<T: Serialize>(details: &T) -> crate::Result<Reply<JsonValue>> {
    let mut body = serde_json::to_value(details)
        .map_err(|e| crate::Error::Internal(format!("cannot serialize delete report: {e}")))?;
    match body.as_object_mut() {
        Some(fields) => {
            fields.insert("deleted".into(), JsonValue::Bool(true));
            Ok(Reply::Ok(body))
        }
        None => Ok(deleted()),
    }
}
