//! Error types for the conversational interface.

use enrollcast_client::ClientError;
use enrollcast_core::EnrollcastError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<EnrollcastError> for ChatError {
    fn from(err: EnrollcastError) -> Self {
        ChatError::InvalidConfig(err.to_string())
    }
}

impl From<ClientError> for ChatError {
    fn from(err: ClientError) -> Self {
        ChatError::Backend(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::EmptyMessage.to_string(), "message cannot be empty");
        assert_eq!(
            ChatError::MessageTooLong(2000).to_string(),
            "message exceeds maximum length of 2000 characters"
        );
        assert_eq!(
            ChatError::InvalidConfig("bad".to_string()).to_string(),
            "invalid config: bad"
        );
        assert_eq!(
            ChatError::Backend("down".to_string()).to_string(),
            "backend error: down"
        );
    }

    #[test]
    fn test_chat_error_from_enrollcast_error() {
        let err = EnrollcastError::InvalidForecastConfig {
            field: "capacity".into(),
            reason: "must be at least 1".into(),
        };
        let chat_err: ChatError = err.into();
        assert!(matches!(chat_err, ChatError::InvalidConfig(_)));
        assert!(chat_err.to_string().contains("capacity must be at least 1"));
    }

    #[test]
    fn test_chat_error_from_client_error() {
        let err = ClientError::Api {
            status: 503,
            message: "Service Unavailable".into(),
        };
        let chat_err: ChatError = err.into();
        assert!(matches!(chat_err, ChatError::Backend(_)));
        assert!(chat_err.to_string().contains("Service Unavailable"));
    }
}
