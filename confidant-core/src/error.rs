//! Error types for Confidant operations

/// Result type for Confidant operations
pub type Result<T> = std::result::Result<T, ConfidantError>;

/// Error types for the companion core
#[derive(Debug, thiserror::Error)]
pub enum ConfidantError {
    /// Bad user input (empty message, rejected name, malformed history)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Language-model call unreachable or erroring
    #[error("Transport error: {0}")]
    Transport(String),

    /// Memory store write or read failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl ConfidantError {
    /// Whether this error came from user input rather than a collaborator
    pub fn is_validation(&self) -> bool {
        matches!(self, ConfidantError::Validation(_))
    }
}

impl From<String> for ConfidantError {
    fn from(s: String) -> Self {
        ConfidantError::Other(s)
    }
}

impl From<&str> for ConfidantError {
    fn from(s: &str) -> Self {
        ConfidantError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for ConfidantError {
    fn from(err: anyhow::Error) -> Self {
        ConfidantError::Other(err.to_string())
    }
}

impl From<figment::Error> for ConfidantError {
    fn from(err: figment::Error) -> Self {
        ConfidantError::Configuration(err.to_string())
    }
}
