//! Knowledge-base HTTP client.
//!
//! # Responsibilities
//! - Build upstream URLs from the configured base
//! - Attach the bearer token to every call
//! - Enforce the per-attempt timeout
//! - Classify failures into not-found vs. transient

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use url::Url;

use crate::config::UpstreamConfig;
use crate::upstream::types::{UpstreamError, UpstreamResult};

/// Client for the knowledge-base service.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct KbClient {
    http: reqwest::Client,
    base_url: Url,
    liveness_path: String,
}

impl KbClient {
    /// Build a client for `config`.
    ///
    /// Returns `Ok(None)` when the upstream is disabled or has no base URL.
    pub fn from_config(config: &UpstreamConfig) -> UpstreamResult<Option<Self>> {
        let Some(base_url) = config.active_base_url() else {
            return Ok(None);
        };
        let base_url =
            Url::parse(base_url).map_err(|e| UpstreamError::Url(format!("'{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::Url(format!("'{base_url}' cannot be a base")));
        }

        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref().filter(|key| !key.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|_| UpstreamError::InvalidApiKey)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .user_agent(concat!("kb-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(UpstreamError::Client)?;

        tracing::info!(base_url = %base_url, "Knowledge-base client initialized");

        Ok(Some(Self {
            http,
            base_url,
            liveness_path: config.liveness_path.clone(),
        }))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /info`.
    pub async fn info(&self) -> UpstreamResult<Value> {
        self.get_json(&["info"]).await
    }

    /// `GET /kb/list`.
    pub async fn list(&self) -> UpstreamResult<Value> {
        self.get_json(&["kb", "list"]).await
    }

    /// `GET /kb/get/{id}`. A missing document is `Ok(None)`, not an error.
    pub async fn document(&self, id: &str) -> UpstreamResult<Option<Value>> {
        match self.get_json(&["kb", "get", id]).await {
            Ok(doc) => Ok(Some(doc)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `GET {liveness_path}`, status checked, body discarded.
    pub async fn ping(&self) -> UpstreamResult<()> {
        let segments: Vec<&str> = self
            .liveness_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        let url = self.endpoint(&segments)?;
        let path = url.path().to_owned();

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(&path, e))?;
        check_status(&path, response).map(|_| ())
    }

    async fn get_json(&self, segments: &[&str]) -> UpstreamResult<Value> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_owned();
        tracing::trace!(path = %path, "Upstream request");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(&path, e))?;
        let response = check_status(&path, response)?;

        response
            .json::<Value>()
            .await
            .map_err(|e| UpstreamError::from_reqwest(&path, e))
    }

    /// Append `segments` to the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> UpstreamResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::Url(format!("'{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn check_status(path: &str, response: reqwest::Response) -> UpstreamResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(UpstreamError::Status {
            status: status.as_u16(),
            path: path.to_owned(),
        })
    }
}
