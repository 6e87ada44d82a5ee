//! Provider error types

use std::fmt;

/// Errors that can occur while talking to a tile server.
///
/// The split between [`ProviderError::HttpError`] and
/// [`ProviderError::HttpStatus`] matters to the existence probe: only a
/// transport failure triggers the GET fallback, a status code is an answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Request never produced a response (connect, TLS, timeout, body read)
    HttpError(String),
    /// Server answered with a non-success status
    HttpStatus { status: u16, url: String },
    /// Client could not be constructed
    ClientSetup(String),
}

impl ProviderError {
    /// Returns true if the failure happened below HTTP (no status received).
    pub fn is_transport(&self) -> bool {
        matches!(self, ProviderError::HttpError(_))
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::HttpStatus { status, url } => {
                write!(f, "HTTP {} from {}", status, url)
            }
            ProviderError::ClientSetup(msg) => write!(f, "HTTP client setup failed: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(ProviderError::HttpError("reset".to_string()).is_transport());
        assert!(!ProviderError::HttpStatus {
            status: 404,
            url: "http://example.com/a".to_string()
        }
        .is_transport());
    }

    #[test]
    fn test_status_display() {
        let err = ProviderError::HttpStatus {
            status: 404,
            url: "http://example.com/0/0_0.jpg".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 from http://example.com/0/0_0.jpg");
    }
}
