//! # Localizable Text
//!
//! State snapshots never carry raw error strings. They carry a [`UiText`]
//! handle that the UI resolves against its own string tables.
//!
//! ## Error → Message Mapping
//! ```text
//! ┌───────────────────────────────┬───────────────────────────────────┐
//! │ DataError                     │ StringResource                    │
//! ├───────────────────────────────┼───────────────────────────────────┤
//! │ Local(DiskFull)               │ error_disk_full                   │
//! │ Local(Unknown)                │ error_unknown                     │
//! │ Remote(RequestTimeout)        │ error_request_timeout             │
//! │ Remote(TooManyRequests)       │ error_too_many_requests           │
//! │ Remote(NoInternet)            │ error_no_internet                 │
//! │ Remote(Server)                │ error_unknown                     │
//! │ Remote(Serialization)         │ error_serialization               │
//! │ Remote(Unknown)               │ error_unknown                     │
//! └───────────────────────────────┴───────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{DataError, LocalError, RemoteError};

/// Closed set of message keys the UI knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StringResource {
    ErrorDiskFull,
    ErrorUnknown,
    ErrorRequestTimeout,
    ErrorTooManyRequests,
    ErrorNoInternet,
    ErrorSerialization,
    NoSearchResults,
    NoFavoriteBooks,
}

impl StringResource {
    /// Stable key used by the UI string tables.
    pub fn key(&self) -> &'static str {
        match self {
            StringResource::ErrorDiskFull => "error_disk_full",
            StringResource::ErrorUnknown => "error_unknown",
            StringResource::ErrorRequestTimeout => "error_request_timeout",
            StringResource::ErrorTooManyRequests => "error_too_many_requests",
            StringResource::ErrorNoInternet => "error_no_internet",
            StringResource::ErrorSerialization => "error_serialization",
            StringResource::NoSearchResults => "no_search_results",
            StringResource::NoFavoriteBooks => "no_favorite_books",
        }
    }

    /// English fallback text.
    pub fn default_text(&self) -> &'static str {
        match self {
            StringResource::ErrorDiskFull => "Oops, it seems like your disk is full.",
            StringResource::ErrorUnknown => "Oops, something went wrong.",
            StringResource::ErrorRequestTimeout => "The request timed out.",
            StringResource::ErrorTooManyRequests => {
                "Oops, it seems like your quota is exceeded."
            }
            StringResource::ErrorNoInternet => {
                "Couldn't reach server, please check your internet connection."
            }
            StringResource::ErrorSerialization => "Couldn't parse data.",
            StringResource::NoSearchResults => "No search results",
            StringResource::NoFavoriteBooks => "You don't have any favorite books yet",
        }
    }
}

/// A message handle: either literal text or a resource key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum UiText {
    Dynamic(String),
    Resource(StringResource),
}

impl UiText {
    /// Resolves to display text using the English defaults.
    pub fn as_string(&self) -> String {
        match self {
            UiText::Dynamic(text) => text.clone(),
            UiText::Resource(resource) => resource.default_text().to_string(),
        }
    }
}

impl From<StringResource> for UiText {
    fn from(resource: StringResource) -> Self {
        UiText::Resource(resource)
    }
}

impl From<RemoteError> for UiText {
    fn from(error: RemoteError) -> Self {
        let resource = match error {
            RemoteError::RequestTimeout => StringResource::ErrorRequestTimeout,
            RemoteError::TooManyRequests => StringResource::ErrorTooManyRequests,
            RemoteError::NoInternet => StringResource::ErrorNoInternet,
            RemoteError::Serialization => StringResource::ErrorSerialization,
            RemoteError::Server | RemoteError::Unknown => StringResource::ErrorUnknown,
        };
        UiText::Resource(resource)
    }
}

impl From<LocalError> for UiText {
    fn from(error: LocalError) -> Self {
        let resource = match error {
            LocalError::DiskFull => StringResource::ErrorDiskFull,
            LocalError::Unknown => StringResource::ErrorUnknown,
        };
        UiText::Resource(resource)
    }
}

impl From<DataError> for UiText {
    fn from(error: DataError) -> Self {
        match error {
            DataError::Remote(e) => e.into(),
            DataError::Local(e) => e.into(),
        }
    }
}
