//! HTTP client for the external module service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::error::{Error, Result};
use crate::{check_module_id, ModuleSource};

const REQUESTER_HEADER: &str = "X-Requester";

/// Fetches module XML with `GET {base_url}/modules/{module_id}`.
pub struct HttpModuleSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpModuleSource {
    pub fn new(base_url: &str, api_key: Option<String>, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn module_url(&self, module_id: &str) -> String {
        format!(
            "{}/modules/{}",
            self.base_url,
            urlencoding::encode(module_id)
        )
    }
}

#[async_trait]
impl ModuleSource for HttpModuleSource {
    async fn fetch_module(&self, module_id: &str, requester: &str) -> Result<Option<String>> {
        let module_id = check_module_id(module_id)?;
        let url = self.module_url(module_id);

        let mut request = self
            .client
            .get(&url)
            .header(REQUESTER_HEADER, requester)
            .header(reqwest::header::ACCEPT, "application/xml");
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(module_id, "Module not found at source");
            return Ok(None);
        }
        if !status.is_success() {
            tracing::warn!(module_id, status = status.as_u16(), "Module source request failed");
            return Err(Error::Upstream {
                module_id: module_id.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_url_encodes_identifier_and_trims_base() {
        let source = HttpModuleSource::new("https://modules.example.org/api/", None, 5).unwrap();
        assert_eq!(source.base_url(), "https://modules.example.org/api");
        assert_eq!(
            source.module_url("lung nodule"),
            "https://modules.example.org/api/modules/lung%20nodule"
        );
    }

    #[tokio::test]
    async fn rejects_path_like_module_ids() {
        let source = HttpModuleSource::new("http://127.0.0.1:9", None, 1).unwrap();
        let err = source.fetch_module("../admin", "tester").await.unwrap_err();
        assert!(matches!(err, Error::InvalidModuleId(_)));
    }
}
