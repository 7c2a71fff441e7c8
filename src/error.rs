//! Error handling for musicfinder
//!
//! Errors are split by layer. `ValidationError` and `SearchError` are part of
//! the lookup contract and are `Clone` so a single in-flight fetch can hand
//! the same outcome to every waiter. `NetworkError` never leaves the lyrics
//! provider. `MusicFinderError` is the top-level type used by the binary.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MusicFinderError {
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Rejected query input. Always surfaced to the caller, never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: String },

    #[error("Invalid {field}: value is empty")]
    Empty { field: String },

    #[error("Invalid {field}: longer than {max} characters")]
    TooLong { field: String, max: usize },

    #[error("Invalid {field}: contains control characters")]
    ControlCharacter { field: String },

    #[error("Invalid {field}: character {character:?} is not allowed")]
    DisallowedCharacter { field: String, character: char },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Unsupported strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("Transport failed: {reason}")]
    Transport { reason: String },

    #[error("Lookup task failed: {reason}")]
    TaskFailed { reason: String },
}

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(reqwest::StatusCode),

    #[error("API response invalid: {reason}")]
    InvalidResponse { reason: String },

    #[error("Timeout exceeded")]
    Timeout,
}

impl NetworkError {
    /// Rate limiting, server errors and connection failures are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            NetworkError::Http(e) => e.is_connect() || e.is_timeout(),
            NetworkError::Status(status) => {
                *status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            NetworkError::Timeout => true,
            NetworkError::InvalidResponse { .. } => false,
        }
    }
}

impl From<NetworkError> for SearchError {
    fn from(err: NetworkError) -> Self {
        SearchError::Transport {
            reason: err.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid config format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MusicFinderError>;

/// Result type of the lookup layer.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

impl From<ValidationError> for MusicFinderError {
    fn from(err: ValidationError) -> Self {
        MusicFinderError::Search(SearchError::Validation(err))
    }
}

impl From<toml::de::Error> for MusicFinderError {
    fn from(err: toml::de::Error) -> Self {
        MusicFinderError::Config(ConfigError::InvalidFormat(err))
    }
}

impl From<std::io::Error> for MusicFinderError {
    fn from(err: std::io::Error) -> Self {
        MusicFinderError::Config(ConfigError::Io(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages_name_the_field() {
        let err = ValidationError::Missing {
            field: "artist".to_string(),
        };
        assert_eq!(err.to_string(), "artist is required");

        let err = ValidationError::DisallowedCharacter {
            field: "song".to_string(),
            character: '/',
        };
        assert_eq!(err.to_string(), "Invalid song: character '/' is not allowed");
    }

    #[test]
    fn test_status_transience() {
        assert!(NetworkError::Status(reqwest::StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(NetworkError::Status(reqwest::StatusCode::BAD_GATEWAY).is_transient());
        assert!(!NetworkError::Status(reqwest::StatusCode::NOT_FOUND).is_transient());
        assert!(!NetworkError::InvalidResponse {
            reason: "missing lyrics".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_network_error_becomes_transport() {
        let err: SearchError = NetworkError::Timeout.into();
        assert!(matches!(err, SearchError::Transport { .. }));
    }
}
