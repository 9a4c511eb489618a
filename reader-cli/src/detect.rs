//! HTTP client for the text detection service.
//!
//! The service takes the raw page image as the request body of
//! `POST {root}/detect-texts` and answers with the annotation array parsed by
//! [`reader_core::parse_detection_json`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reader_core::{parse_detection_json, DetectError, DetectedRegion, TextDetector};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use thiserror::Error;
use url::Url;

const DETECT_PATH: &str = "detect-texts";

/// Errors raised while setting up the detection client.
#[derive(Debug, Error)]
pub enum DetectClientError {
    /// The service root URL is invalid.
    #[error("invalid detection service URL: {0}")]
    InvalidUrl(String),
    /// The HTTP client could not be built.
    #[error("detection HTTP client failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// [`TextDetector`] backed by the detection service.
#[derive(Clone)]
pub struct HttpDetector {
    inner: Arc<InnerClient>,
}

struct InnerClient {
    http: Client,
    endpoint: Url,
    skip_aggregate: bool,
}

impl HttpDetector {
    /// Create a client for the service rooted at `base_url`.
    ///
    /// `base_url` may carry a path prefix (`https://host/api`); the detection
    /// route is appended to it.
    ///
    /// # Errors
    ///
    /// Returns [`DetectClientError::InvalidUrl`] if the URL is malformed.
    /// Returns [`DetectClientError::Http`] if the HTTP client fails to build.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        skip_aggregate: bool,
    ) -> Result<Self, DetectClientError> {
        let endpoint = detect_endpoint(base_url)?;

        let http = Client::builder()
            .user_agent(concat!("page-reader/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            inner: Arc::new(InnerClient {
                http,
                endpoint,
                skip_aggregate,
            }),
        })
    }

    /// Full URL detection requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }
}

#[async_trait]
impl TextDetector for HttpDetector {
    async fn detect(&self, image: &[u8]) -> Result<Vec<DetectedRegion>, DetectError> {
        tracing::debug!(
            endpoint = %self.inner.endpoint,
            bytes = image.len(),
            "Requesting text detection"
        );

        let response = self
            .inner
            .http
            .post(self.inner.endpoint.clone())
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| DetectError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetectError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DetectError::Transport(e.to_string()))?;
        let regions = parse_detection_json(&body, self.inner.skip_aggregate)?;
        tracing::debug!(regions = regions.len(), "Text detection finished");
        Ok(regions)
    }
}

/// `{root}/detect-texts`, keeping any path prefix of the root.
fn detect_endpoint(base_url: &str) -> Result<Url, DetectClientError> {
    let mut url =
        Url::parse(base_url).map_err(|e| DetectClientError::InvalidUrl(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(DetectClientError::InvalidUrl(format!(
            "{base_url} cannot carry a path"
        )));
    }

    let prefix = format!("{}/", url.path().trim_end_matches('/'));
    url.set_path(&prefix);
    url.join(DETECT_PATH)
        .map_err(|e| DetectClientError::InvalidUrl(e.to_string()))
}
