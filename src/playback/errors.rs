// Error types for playback providers

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// The service answered but holds no capture for the address
    #[error("Not found")]
    NotFound,

    /// Input is not a usable web address
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Connection, TLS or timeout failure
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status; renders as the bare status line
    #[error("{0}")]
    Status(StatusCode),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Provider is switched off because its endpoint is not configured
    #[error("{0} disabled")]
    Disabled(&'static str),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// A spawned lookup task did not finish
    #[error("Task failed: {0}")]
    Task(String),
}

impl PlaybackError {
    /// Not-found is the only outcome that lets a fallback tier run
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl From<reqwest::Error> for PlaybackError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return Self::Status(status);
        }
        Self::Network(e.to_string())
    }
}

impl From<serde_json::Error> for PlaybackError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<url::ParseError> for PlaybackError {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidUrl(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_renders_status_line() {
        let err = PlaybackError::Status(StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "404 Not Found");
    }

    #[test]
    fn test_not_found_text() {
        assert_eq!(PlaybackError::NotFound.to_string(), "Not found");
        assert!(PlaybackError::NotFound.is_not_found());
        assert!(!PlaybackError::Network("refused".into()).is_not_found());
    }

    #[test]
    fn test_disabled_text() {
        let err = PlaybackError::Disabled("meilisearch");
        assert_eq!(err.to_string(), "meilisearch disabled");
    }
}
