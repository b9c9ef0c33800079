//! # Remote Catalog Source
//!
//! HTTP access to the Open Library catalog behind the [`RemoteBookSource`]
//! capability. Every failure leaves this module as a [`RemoteError`].
//!
//! ## Safe Call
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          safe_call(request)                             │
//! │                                                                         │
//! │  send ──┬── transport error ──┬── timeout (request/connect) → TIMEOUT   │
//! │         │                     ├── DNS resolution failure    → NO_INTERNET│
//! │         │                     └── anything else             → UNKNOWN   │
//! │         │                                                               │
//! │         └── response ──┬── 2xx ──┬── body decodes   → Ok(T)             │
//! │                        │         └── body fails     → SERIALIZATION     │
//! │                        ├── 408                       → REQUEST_TIMEOUT   │
//! │                        ├── 429                       → TOO_MANY_REQUESTS │
//! │                        ├── 5xx                       → SERVER            │
//! │                        └── other                     → UNKNOWN           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cancellation
//! Cancelling a call means dropping (or aborting) its future. The request is
//! torn down at the current await point and no `RemoteError` is produced,
//! so a superseded search can never surface as a user-facing failure.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use bookpedia_core::RemoteError;

use crate::config::ApiSettings;
use crate::error::{SyncError, SyncResult};
use crate::protocol::{BookWorkDto, SearchResponseDto, SEARCH_FIELDS};

// =============================================================================
// Capability
// =============================================================================

/// Read-only access to the remote catalog.
#[async_trait]
pub trait RemoteBookSource: Send + Sync {
    /// Full-text search. `limit: None` leaves the page size to the catalog.
    async fn search_books(
        &self,
        query: &str,
        limit: Option<u32>,
    ) -> Result<SearchResponseDto, RemoteError>;

    /// Work details for a bare work id such as `OL45804W`.
    async fn get_book_details(&self, work_id: &str) -> Result<BookWorkDto, RemoteError>;
}

// =============================================================================
// Open Library Client
// =============================================================================

/// [`RemoteBookSource`] backed by the Open Library HTTP API.
#[derive(Debug, Clone)]
pub struct OpenLibraryClient {
    client: Client,
    base_url: Url,
    language: String,
}

impl OpenLibraryClient {
    /// Builds the client with the configured timeouts and default headers.
    pub fn new(settings: &ApiSettings) -> SyncResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(settings.user_agent.clone())
            .timeout(settings.request_timeout())
            .connect_timeout(settings.connect_timeout())
            .build()?;

        let base_url = Url::parse(&settings.base_url)?;
        Self::with_client(client, base_url, settings.language.clone())
    }

    /// Wraps a preconfigured `reqwest` client.
    pub fn with_client(client: Client, base_url: Url, language: String) -> SyncResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(SyncError::InvalidUrl(format!(
                "catalog URL cannot have paths: {}",
                base_url
            )));
        }
        Ok(OpenLibraryClient {
            client,
            base_url,
            language,
        })
    }

    /// `{base}/{segments...}`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::Unknown)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn search_url(&self, query: &str, limit: Option<u32>) -> Result<Url, RemoteError> {
        let mut url = self.endpoint(&["search.json"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            if let Some(limit) = limit {
                pairs.append_pair("limit", &limit.to_string());
            }
            pairs.append_pair("language", &self.language);
            pairs.append_pair("fields", SEARCH_FIELDS);
        }
        Ok(url)
    }

    fn work_url(&self, work_id: &str) -> Result<Url, RemoteError> {
        self.endpoint(&["works", &format!("{}.json", work_id)])
    }

    async fn safe_call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let error = classify_transport_error(&e);
                warn!(error = %e, kind = ?error, "Catalog request failed");
                return Err(error);
            }
        };
        response_to_result(response).await
    }
}

#[async_trait]
impl RemoteBookSource for OpenLibraryClient {
    async fn search_books(
        &self,
        query: &str,
        limit: Option<u32>,
    ) -> Result<SearchResponseDto, RemoteError> {
        let url = self.search_url(query, limit)?;
        debug!(query = %query, ?limit, "Searching catalog");
        self.safe_call(self.client.get(url)).await
    }

    async fn get_book_details(&self, work_id: &str) -> Result<BookWorkDto, RemoteError> {
        let url = self.work_url(work_id)?;
        debug!(work_id = %work_id, "Fetching work details");
        self.safe_call(self.client.get(url)).await
    }
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Maps a failure that happened before any response arrived.
///
/// Only a failed host lookup counts as "no internet". A refused or reset
/// connection reached some network and stays `Unknown`.
pub fn classify_transport_error(err: &reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::RequestTimeout
    } else if err.is_connect() && is_resolution_failure(err) {
        RemoteError::NoInternet
    } else {
        RemoteError::Unknown
    }
}

/// True when any error in the `source()` chain is a host lookup failure.
fn is_resolution_failure(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(cause) = current {
        let message = cause.to_string();
        if message.contains("dns error") || message.contains("failed to lookup address") {
            return true;
        }
        current = cause.source();
    }
    false
}

/// Maps a non-2xx status.
pub fn status_to_error(status: u16) -> RemoteError {
    match status {
        408 => RemoteError::RequestTimeout,
        429 => RemoteError::TooManyRequests,
        500..=599 => RemoteError::Server,
        _ => RemoteError::Unknown,
    }
}

/// Decodes a 2xx body.
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, RemoteError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Catalog response did not match the expected schema");
        RemoteError::Serialization
    })
}

async fn response_to_result<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let status = response.status().as_u16();

    if !(200..=299).contains(&status) {
        let error = status_to_error(status);
        warn!(status, kind = ?error, "Catalog returned an error status");
        return Err(error);
    }

    let body = response.bytes().await.map_err(|e| {
        warn!(status, error = %e, "Failed to read catalog response body");
        if e.is_timeout() {
            RemoteError::RequestTimeout
        } else {
            RemoteError::Serialization
        }
    })?;

    decode_body(&body)
}

// =============================================================================
// Unit Tests
// =============================================================================
