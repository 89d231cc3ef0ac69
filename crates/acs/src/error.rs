//! Error types for ACS client operations.
//!
//! HTTP status codes are *not* errors at this layer: every response that
//! reaches the client is returned as a [`Response`](crate::Response) so the
//! caller can judge it. Errors here mean no usable response was produced.

/// Result type alias for ACS client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the ACS.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP round trip produced no response (DNS, TLS, connect, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// A request could not be built (bad header value, unserialisable body).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A response body could not be decoded.
    #[error("invalid response body: {0}")]
    InvalidResponse(String),

    /// Exchanging basic credentials for a bearer token failed.
    #[error("failed to mint ACS token (HTTP {status}): {message}")]
    TokenMint {
        /// HTTP status of the token endpoint response.
        status: u16,
        /// Body returned by the token endpoint.
        message: String,
    },
}

impl Error {
    /// Create a transport error from any displayable cause.
    pub fn transport(cause: impl std::fmt::Display) -> Self {
        Self::Transport(cause.to_string())
    }

    /// Whether the error happened before any bytes reached the server.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Http(e) => Self::InvalidRequest(e.to_string()),
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_constructor() {
        let err = Error::transport("connection refused");
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "HTTP request failed: connection refused");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::InvalidResponse(_)));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_token_mint_display() {
        let err = Error::TokenMint {
            status: 401,
            message: "bad credentials".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("401"));
        assert!(display.contains("bad credentials"));
    }
}
