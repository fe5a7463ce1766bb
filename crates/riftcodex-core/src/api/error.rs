use thiserror::Error;

/// Failure of the transport itself, before any status code is known.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Failure of a bulk or detail fetch.
///
/// `Network` and `Parse` mean "retry later"; `NotFound` means the entity does
/// not exist upstream. None of them leave a partial write in a store.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid payload: {0}")]
    Parse(String),

    #[error("Entity not found: {0}")]
    NotFound(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl FetchError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Any non-200 status is a network failure as far as the stores are concerned.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let body = String::from_utf8_lossy(body);
        FetchError::Network(format!("Status {}: {}", status, Self::truncate_body(&body)))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

impl From<TransportError> for FetchError {
    fn from(err: TransportError) -> Self {
        FetchError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_is_network() {
        let err = FetchError::from_status(404, b"missing");
        match err {
            FetchError::Network(msg) => assert_eq!(msg, "Status 404: missing"),
            other => panic!("expected network error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_status_truncates_long_bodies() {
        let body = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let err = FetchError::from_status(500, body.as_bytes());
        let msg = err.to_string();
        assert!(msg.contains("truncated, 520 total bytes"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_parse_error_from_serde() {
        let err: FetchError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, FetchError::Parse(_)));
    }
}
