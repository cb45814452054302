//! Transport seam between the API client and the backend.
//!
//! [`ApiTransport`] is the only place requests leave the process. The client
//! speaks to it in path segments plus query pairs, and gets parsed JSON back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::ApiConfig;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("API {status}: {reason}")]
    Status { status: u16, reason: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("no backend configured and no static player index available")]
    NotConfigured,
    #[error("failed to load static player index: {0}")]
    StaticIndex(String),
    #[error("pagination stopped after {limit} pages")]
    PageLimit { limit: usize },
    #[error("page {page} reported more rows but no cursor")]
    MissingCursor { page: usize },
    #[error("backend repeated cursor {cursor}")]
    CursorLoop { cursor: String },
}

#[async_trait]
pub trait ApiTransport: Send + Sync + 'static {
    fn is_configured(&self) -> bool;

    async fn get_json(&self, path: &[String], query: &[(&str, String)]) -> Result<Value, ApiError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = config.frontend_token.as_deref() {
            let value = HeaderValue::from_str(token)
                .map_err(|err| ApiError::Transport(format!("invalid frontend token: {err}")))?;
            headers.insert("X-Frontend-Token", value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        let base_url = config
            .base_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw)
                    .map_err(|err| ApiError::Transport(format!("invalid base url {raw}: {err}")))
            })
            .transpose()?;

        Ok(Self { client, base_url })
    }

    fn url_for(&self, path: &[String], query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone().ok_or(ApiError::NotConfigured)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport("base url cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(path);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        Ok(url)
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    async fn get_json(&self, path: &[String], query: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = self.url_for(path, query)?;
        debug!(component = "api_client", event = "api.request", url = %url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        let status = response.status();
        debug!(
            component = "api_client",
            event = "api.response",
            status = status.as_u16()
        );
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }
}
