pub mod assertions;
pub mod builders;

use std::sync::Arc;

use anyhow::Context as _;
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use cde_module_source::ModuleSource;
use cde_registry::{api::create_router, state::AppStateOptions, AppState, Config};
use serde_json::Value;
use tower::ServiceExt as _;

// Re-export commonly used items
pub use assertions::*;
pub use builders::*;

/// The real router over seeded in-memory storage.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_options(AppStateOptions::in_memory()).await
    }

    pub async fn with_module_source(source: Arc<dyn ModuleSource>) -> anyhow::Result<Self> {
        Self::with_options(AppStateOptions::in_memory().with_module_source(source)).await
    }

    pub async fn with_options(options: AppStateOptions) -> anyhow::Result<Self> {
        let state = AppState::new_with_options(Config::default(), options)
            .await
            .context("initialize AppState")?;
        let router = create_router(state.clone());
        Ok(Self { router, state })
    }

    pub async fn request(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Bytes>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        self.request_with_extra_headers(method, path_and_query, body, &[])
            .await
    }

    pub async fn request_with_extra_headers(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Bytes>,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let mut request = Request::builder()
            .method(method)
            .uri(path_and_query)
            .header("host", "example.org")
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .body(match body {
                Some(bytes) => Body::from(bytes),
                None => Body::empty(),
            })
            .context("build request")?;

        for (name, value) in extra_headers {
            request.headers_mut().insert(
                name.parse::<HeaderName>().context("parse header name")?,
                value.parse::<HeaderValue>().context("parse header value")?,
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("dispatch request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("read response body")?;

        Ok((status, headers, body))
    }

    /// Send a request and decode the JSON response body (`Null` when empty).
    pub async fn json(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<&Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let body = body.map(to_json_body).transpose()?;
        let (status, _headers, bytes) = self.request(method, path_and_query, body).await?;
        Ok((status, parse_json(&bytes)?))
    }

    pub async fn get(&self, path_and_query: &str) -> anyhow::Result<(StatusCode, Value)> {
        self.json(Method::GET, path_and_query, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> anyhow::Result<(StatusCode, Value)> {
        self.json(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> anyhow::Result<(StatusCode, Value)> {
        self.json(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<(StatusCode, Value)> {
        self.json(Method::DELETE, path, None).await
    }

    /// Send an XML module document.
    pub async fn send_xml(
        &self,
        method: Method,
        path: &str,
        xml: &str,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let (status, _headers, bytes) = self
            .request_with_extra_headers(
                method,
                path,
                Some(Bytes::from(xml.to_string())),
                &[("content-type", "application/xml")],
            )
            .await?;
        Ok((status, parse_json(&bytes)?))
    }

    /// Create an element set and return its id.
    pub async fn create_set(&self, name: &str) -> anyhow::Result<i64> {
        let (status, body) = self.post("/sets", &set_body(name)).await?;
        assert_status(status, StatusCode::CREATED, "create set");
        id_of(&body)
    }

    /// Create an element in a set and return the element body.
    pub async fn create_element(&self, set_id: i64, body: &Value) -> anyhow::Result<Value> {
        let (status, element) = self
            .post(&format!("/sets/{set_id}/elements"), body)
            .await?;
        assert_status(status, StatusCode::CREATED, "create element");
        Ok(element)
    }
}

fn parse_json(bytes: &Bytes) -> anyhow::Result<Value> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).context("response body is not JSON")
}
