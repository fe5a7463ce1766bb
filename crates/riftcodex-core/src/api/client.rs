//! HTTP implementation of `RemoteFetcher`.
//!
//! This module provides the `HttpFetcher` struct used in production to
//! reach the Data Dragon CDN, the Meraki item mirror, and the Riot static
//! docs host.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

use super::{RawResponse, RemoteFetcher, TransportError};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// Bulk payloads are a few MB; 30s fails fast enough for an interactive caller.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("riftcodex/", env!("CARGO_PKG_VERSION"));

/// HTTP fetcher over a shared `reqwest::Client`.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
/// Paths handed to `get` are full URLs built by `Config`.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!(%url, status, bytes = body.len(), "Response received");

        Ok(RawResponse::new(status, body.to_vec()))
    }
}
