//! Extractors whose rejections use the registry error body.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::Error;

/// JSON request body. Malformed or mistyped input is a validation failure on `body`.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| Error::invalid("body", rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Reporting module document sent as the raw request body.
///
/// Any content type is accepted as long as the body is non-empty UTF-8; the XML
/// itself is checked by the module parser.
pub struct XmlBody(pub String);

#[async_trait]
impl<S> FromRequest<S> for XmlBody
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| Error::invalid("body", format!("failed to read request body: {e}")))?;
        let text = String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::invalid("body", "request body is not valid UTF-8"))?;
        if text.trim().is_empty() {
            return Err(Error::invalid("body", "a module document is required"));
        }
        Ok(Self(text))
    }
}

/// Path parameters; an unparsable id is a validation failure on `path`.
pub struct PathParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| Error::invalid("path", rejection.body_text()))?;
        Ok(Self(value))
    }
}
