//! Outbound HTTP client that signs every request body.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::signature::{Signer, SIGNATURE_HEADER};

/// Connection settings for a [`SignedClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the peer service, without trailing slash.
    pub base_url: String,
    /// Connect timeout for each request.
    pub connect_timeout: Duration,
    /// Overall timeout for each request.
    pub read_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
        }
    }

    /// Builder method to set both timeouts.
    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    /// Full URL for a path on the peer.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Sends JSON bodies with an `X-Signature` header.
///
/// No retries happen here; callers decide whether a failure matters.
#[derive(Debug, Clone)]
pub struct SignedClient {
    http: Client,
    config: ClientConfig,
    signer: Signer,
}

impl SignedClient {
    pub fn new(config: ClientConfig, signer: Signer) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .build()?;

        Ok(Self { http, config, signer })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// POST `payload` as JSON, signed over the exact bytes sent.
    pub async fn post_json<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<Response> {
        let body = serde_json::to_vec(payload)?;
        self.send(Method::POST, path, body).await
    }

    /// POST with an empty body, signed over the empty string.
    pub async fn post_empty(&self, path: &str) -> Result<Response> {
        self.send(Method::POST, path, Vec::new()).await
    }

    /// GET, signed over the empty body.
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.send(Method::GET, path, Vec::new()).await
    }

    async fn send(&self, method: Method, path: &str, body: Vec<u8>) -> Result<Response> {
        let url = self.config.url(path);
        let signature = self.signer.sign_hex(&body);
        debug!("Signed {} {} ({} bytes)", method, url, body.len());

        let mut request = self
            .http
            .request(method, &url)
            .header(SIGNATURE_HEADER, signature);
        if !body.is_empty() {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        Ok(request.send().await?)
    }
}
