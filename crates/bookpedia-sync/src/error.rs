//! # Sync Error Types
//!
//! Startup and configuration failures of the sync layer.
//!
//! Runtime failures never show up here: remote and local operations report
//! through the closed taxonomy in `bookpedia-core`. `SyncError` covers what
//! can go wrong before the machines exist.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Startup     │  │      Lifecycle          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  HttpClient     │  │  ShuttingDown           │ │
//! │  │  InvalidUrl     │  │  DatabaseError  │  │  ChannelError           │ │
//! │  │  ConfigLoad/Save│  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync layer error type.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed catalog or covers URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Startup Errors
    // =========================================================================
    /// The HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    HttpClient(String),

    /// The favorites store could not be opened.
    #[error("Database error: {0}")]
    DatabaseError(String),

    // =========================================================================
    // Lifecycle Errors
    // =========================================================================
    /// The machine has already shut down.
    #[error("State machine is shutting down")]
    ShuttingDown,

    /// Channel send/receive failed.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<bookpedia_db::DbError> for SyncError {
    fn from(err: bookpedia_db::DbError) -> Self {
        SyncError::DatabaseError(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::HttpClient(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors() {
        assert!(SyncError::InvalidConfig("debounce_ms".into()).is_config_error());
        assert!(SyncError::InvalidUrl("nope".into()).is_config_error());
        assert!(!SyncError::ShuttingDown.is_config_error());
        assert!(!SyncError::DatabaseError("locked".into()).is_config_error());
    }

    #[test]
    fn test_db_error_conversion() {
        let err = SyncError::from(bookpedia_db::DbError::DiskFull);
        assert!(err.to_string().contains("disk is full"));
    }

    #[test]
    fn test_url_error_conversion() {
        let parse = url::Url::parse("not a url").unwrap_err();
        assert!(matches!(SyncError::from(parse), SyncError::InvalidUrl(_)));
    }
}
