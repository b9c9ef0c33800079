//! # Error Types
//!
//! The closed error taxonomy shared by every layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  DataError                                                              │
//! │  ├── Remote(RemoteError)  - catalog API failures                        │
//! │  │   REQUEST_TIMEOUT, TOO_MANY_REQUESTS, NO_INTERNET,                   │
//! │  │   SERVER, SERIALIZATION, UNKNOWN                                     │
//! │  └── Local(LocalError)    - favorites store failures                    │
//! │      DISK_FULL, UNKNOWN                                                 │
//! │                                                                         │
//! │  Flow: reqwest/sqlx error → data-source boundary → taxonomy → UiText    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! These are the only failure kinds visible above the data sources. None of
//! them carries the underlying error; the boundary logs it and drops it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Remote Error
// =============================================================================

/// Failures of the remote catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteError {
    /// Socket or connect timeout, or HTTP 408.
    #[error("Request timed out")]
    RequestTimeout,

    /// HTTP 429.
    #[error("Too many requests")]
    TooManyRequests,

    /// Host could not be resolved or reached.
    #[error("No internet connection")]
    NoInternet,

    /// HTTP 5xx.
    #[error("Server error")]
    Server,

    /// 2xx response whose body did not match the expected schema.
    #[error("Could not parse the server response")]
    Serialization,

    /// Anything else.
    #[error("Unknown remote error")]
    Unknown,
}

impl RemoteError {
    /// Returns true if retrying the same request later may succeed.
    ///
    /// A retry policy keys off this split: throttling and server failures
    /// are transient, a malformed body is not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RemoteError::RequestTimeout
                | RemoteError::TooManyRequests
                | RemoteError::NoInternet
                | RemoteError::Server
        )
    }
}

// =============================================================================
// Local Error
// =============================================================================

/// Failures of the local favorites store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocalError {
    /// The storage medium has no room left.
    #[error("Disk is full")]
    DiskFull,

    /// Any other storage failure.
    #[error("Unknown storage error")]
    Unknown,
}

// =============================================================================
// Data Error
// =============================================================================

/// Either side of the taxonomy, for operations that may touch both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(tag = "source", content = "kind", rename_all = "lowercase")]
pub enum DataError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Local(#[from] LocalError),
}
