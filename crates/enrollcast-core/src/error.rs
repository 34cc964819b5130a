use thiserror::Error;

/// Top-level error type for Enrollcast.
///
/// Crates with their own error enums (`ClientError`, `ChatError`) convert from
/// this one so the `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EnrollcastError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid forecast config: {field} {reason}")]
    InvalidForecastConfig { field: String, reason: String },
}

impl From<toml::de::Error> for EnrollcastError {
    fn from(err: toml::de::Error) -> Self {
        EnrollcastError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for EnrollcastError {
    fn from(err: toml::ser::Error) -> Self {
        EnrollcastError::Config(err.to_string())
    }
}

/// A specialized `Result` type for Enrollcast operations.
pub type Result<T> = std::result::Result<T, EnrollcastError>;
