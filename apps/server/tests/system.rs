//! Operational endpoints and cross-cutting response headers

#[allow(unused)]
mod support;

use axum::http::{Method, StatusCode};
use support::{assert_status, TestApp};

#[tokio::test]
async fn health_reports_storage_backend() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, body) = app.get("/health").await?;
    assert_status(status, StatusCode::OK, "health");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"]["backend"], "memory");
    Ok(())
}

#[tokio::test]
async fn root_describes_the_server() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, body) = app.get("/").await?;
    assert_status(status, StatusCode::OK, "root");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["moduleSource"], false);
    Ok(())
}

#[tokio::test]
async fn responses_carry_request_ids() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (_, headers, _) = app.request(Method::GET, "/sets", None).await?;
    assert!(headers.get("x-request-id").is_some());
    assert!(headers.get("x-content-type-options").is_some());

    let (_, headers, _) = app
        .request_with_extra_headers(
            Method::GET,
            "/sets",
            None,
            &[("x-request-id", "client-abc")],
        )
        .await?;
    assert_eq!(
        headers.get("x-correlation-id").and_then(|v| v.to_str().ok()),
        Some("client-abc")
    );
    assert_ne!(
        headers.get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("client-abc")
    );
    Ok(())
}

#[tokio::test]
async fn metrics_are_exposed_with_sanitized_paths() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    app.get("/sets/12345").await?;

    let (status, _, body) = app.request(Method::GET, "/metrics", None).await?;
    assert_status(status, StatusCode::OK, "metrics");
    let text = String::from_utf8(body.to_vec())?;
    assert!(text.contains("http_requests_total"));
    assert!(!text.contains("/sets/12345"), "ids must not become labels");
    Ok(())
}
