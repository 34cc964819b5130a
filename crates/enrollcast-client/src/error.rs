//! Forecast API client error types.

use thiserror::Error;

/// Result type for forecast API operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the forecasting backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Could not reach the backend at all.
    #[error("Failed to connect to forecast API at {url}: {message}")]
    ConnectionFailed { url: String, message: String },

    /// The backend answered with a non-2xx status.
    #[error("{message} (status: {status})")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::ConnectionFailed {
            url: "http://localhost:8000/api/chat".into(),
            message: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to connect to forecast API at http://localhost:8000/api/chat: connection refused"
        );

        let err = ClientError::Api {
            status: 422,
            message: "Unknown term".into(),
        };
        assert_eq!(err.to_string(), "Unknown term (status: 422)");

        let err = ClientError::Parse("expected value".into());
        assert_eq!(err.to_string(), "Failed to parse response: expected value");
    }
}
