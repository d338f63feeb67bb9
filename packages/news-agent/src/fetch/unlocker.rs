//! Proxy-unlocker fetcher.
//!
//! The agent never hits target sites directly; it posts the URL to an
//! external web-unlocking service which returns the rendered HTML. Any
//! service with the same `(url) -> HTML` contract plugs in here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::PageFetcher;

/// Fetcher that goes through an unblocking-proxy HTTP service.
pub struct UnlockerFetcher {
    client: Client,
    endpoint: String,
    token: Option<SecretString>,
}

#[derive(Serialize)]
struct UnlockRequest<'a> {
    url: &'a str,
}

impl UnlockerFetcher {
    /// Create a fetcher for the given proxy endpoint with a 60s per-attempt
    /// timeout.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, Duration::from_secs(60))
    }

    /// Create a fetcher with a custom per-attempt timeout.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("reqwest client construction cannot fail with static config"),
            endpoint: endpoint.into(),
            token: None,
        }
    }

    /// Set a bearer token for the proxy service.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }
}

#[async_trait]
impl PageFetcher for UnlockerFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        if Url::parse(url).is_err() {
            return Err(FetchError::InvalidUrl { url: url.to_string() });
        }

        debug!(url = %url, "proxy fetch starting");

        let mut request = self.client.post(&self.endpoint).json(&UnlockRequest { url });
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token.expose_secret()));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout { url: url.to_string() }
            } else {
                FetchError::Network { url: url.to_string(), source: Box::new(e) }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout { url: url.to_string() }
            } else {
                FetchError::Network { url: url.to_string(), source: Box::new(e) }
            }
        })?;

        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody { url: url.to_string() });
        }

        Ok(body)
    }
}
