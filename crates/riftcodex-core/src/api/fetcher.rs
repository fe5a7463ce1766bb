use async_trait::async_trait;

use super::{FetchError, TransportError};

/// Status code the stores accept as success.
pub const STATUS_OK: u16 = 200;

/// Raw reply from a remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(STATUS_OK, body)
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Transport capability the stores fetch through.
///
/// Implementations only move bytes: no caching, no retries, no parsing.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// GET the given URL or path.
    async fn get(&self, path: &str) -> Result<RawResponse, TransportError>;
}

/// GET `path`, mapping transport failures and non-200 statuses to
/// `FetchError::Network`. Returns the body on success.
pub async fn fetch_ok(fetcher: &dyn RemoteFetcher, path: &str) -> Result<Vec<u8>, FetchError> {
    let response = fetcher.get(path).await?;
    if !response.is_ok() {
        return Err(FetchError::from_status(response.status, &response.body));
    }
    Ok(response.body)
}
