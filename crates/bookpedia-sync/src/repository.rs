//! # Book Repository
//!
//! The single source of truth the state machines read from. It composes the
//! remote catalog with the local favorites store.
//!
//! ## Cache-or-Fetch Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   get_book_description(id)                              │
//! │                                                                         │
//! │  store.get_by_id(id)                                                    │
//! │       │                                                                 │
//! │       ├── Some(record) ──► Ok(record.description)   (even if None,      │
//! │       │                                              no network call)   │
//! │       │                                                                 │
//! │       ├── None ──────────┐                                              │
//! │       └── Err (logged) ──┴──► remote.get_book_details(id)               │
//! │                                     │                                   │
//! │                                     ├── Ok(work) ──► Ok(description)    │
//! │                                     └── Err(e)   ──► Err(Remote(e))     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A favorited book's description is never refreshed from the network once
//! it is stored, even if stale.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use std::sync::Arc;
use tracing::{debug, warn};

use bookpedia_core::{Book, DataError, EmptyResult, LocalError, RemoteError};
use bookpedia_db::{FavoriteRecord, FavoriteStore};

use crate::remote::RemoteBookSource;

/// What the state machines need from the data layer.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Searches the remote catalog.
    async fn search_books(&self, query: &str) -> Result<Vec<Book>, RemoteError>;

    /// Local-first description lookup.
    async fn get_book_description(&self, book_id: &str) -> Result<Option<String>, DataError>;

    /// Live list of favorited books.
    fn favorite_books(&self) -> BoxStream<'static, Vec<Book>>;

    /// Live membership of `book_id` in the favorites list.
    fn is_favorite(&self, book_id: &str) -> BoxStream<'static, bool>;

    /// Stores (or overwrites) a favorite.
    async fn mark_favorite(&self, book: &Book) -> EmptyResult<LocalError>;

    /// Removes a favorite. Failures are logged and dropped.
    async fn delete_favorite(&self, book_id: &str);
}

/// Repository serving favorites locally and everything else from the
/// catalog.
pub struct OfflineFirstRepository {
    remote: Arc<dyn RemoteBookSource>,
    store: Arc<dyn FavoriteStore>,
    covers_url: String,
    search_limit: Option<u32>,
}

impl OfflineFirstRepository {
    pub fn new(
        remote: Arc<dyn RemoteBookSource>,
        store: Arc<dyn FavoriteStore>,
        covers_url: impl Into<String>,
        search_limit: Option<u32>,
    ) -> Self {
        OfflineFirstRepository {
            remote,
            store,
            covers_url: covers_url.into(),
            search_limit,
        }
    }
}

/// Decodes stored rows, skipping any whose list columns are corrupt.
fn records_to_books(records: Vec<FavoriteRecord>) -> Vec<Book> {
    records
        .into_iter()
        .filter_map(|record| match record.to_book() {
            Ok(book) => Some(book),
            Err(e) => {
                warn!(id = %record.id, error = %e, "Skipping unreadable favorite");
                None
            }
        })
        .collect()
}

#[async_trait]
impl BookRepository for OfflineFirstRepository {
    async fn search_books(&self, query: &str) -> Result<Vec<Book>, RemoteError> {
        let response = self.remote.search_books(query, self.search_limit).await?;
        let books: Vec<Book> = response
            .docs
            .iter()
            .map(|doc| doc.to_book(&self.covers_url))
            .collect();
        debug!(query = %query, count = books.len(), "Search mapped");
        Ok(books)
    }

    async fn get_book_description(&self, book_id: &str) -> Result<Option<String>, DataError> {
        match self.store.get_by_id(book_id).await {
            Ok(Some(record)) => {
                debug!(id = %book_id, "Description served from favorites");
                return Ok(record.description);
            }
            Ok(None) => {}
            Err(e) => warn!(id = %book_id, error = %e, "Local lookup failed, using catalog"),
        }

        let work = self.remote.get_book_details(book_id).await?;
        Ok(work.description)
    }

    fn favorite_books(&self) -> BoxStream<'static, Vec<Book>> {
        self.store.observe_all().map(records_to_books).boxed()
    }

    fn is_favorite(&self, book_id: &str) -> BoxStream<'static, bool> {
        let book_id = book_id.to_string();
        self.store
            .observe_all()
            .map(move |records| records.iter().any(|record| record.id == book_id))
            .boxed()
    }

    async fn mark_favorite(&self, book: &Book) -> EmptyResult<LocalError> {
        let record = FavoriteRecord::from_book(book).map_err(|e| {
            warn!(id = %book.id, error = %e, "Could not encode favorite");
            LocalError::Unknown
        })?;

        self.store.upsert(record).await.map_err(|e| {
            warn!(id = %book.id, error = %e, "Could not store favorite");
            e.to_local()
        })
    }

    async fn delete_favorite(&self, book_id: &str) {
        if let Err(e) = self.store.delete_by_id(book_id).await {
            warn!(id = %book_id, error = %e, "Could not delete favorite");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{book, FailingStore, ScriptedRemote};
    use bookpedia_db::MemoryFavoriteStore;

    fn repository(remote: Arc<ScriptedRemote>, store: Arc<dyn FavoriteStore>) -> OfflineFirstRepository {
        OfflineFirstRepository::new(remote, store, "https://covers.openlibrary.org", Some(30))
    }

    #[tokio::test]
    async fn test_search_maps_docs() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.respond("kotlin", Ok(ScriptedRemote::docs(12)));
        let repo = repository(remote.clone(), Arc::new(MemoryFavoriteStore::new()));

        let books = repo.search_books("kotlin").await.unwrap();
        assert_eq!(books.len(), 12);
        assert_eq!(books[0].id, "OL0W");
        assert_eq!(remote.search_calls(), vec![("kotlin".to_string(), Some(30))]);
    }

    #[tokio::test]
    async fn test_search_passes_error_through() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.respond("kotlin", Err(RemoteError::TooManyRequests));
        let repo = repository(remote, Arc::new(MemoryFavoriteStore::new()));

        assert_eq!(
            repo.search_books("kotlin").await,
            Err(RemoteError::TooManyRequests)
        );
    }

    #[tokio::test]
    async fn test_favorite_description_never_hits_network() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.describe("OL1W", Ok(Some("from network".into())));
        let repo = repository(remote.clone(), Arc::new(MemoryFavoriteStore::new()));

        // Stored without a description.
        repo.mark_favorite(&book("OL1W")).await.unwrap();

        let first = repo.get_book_description("OL1W").await;
        let second = repo.get_book_description("OL1W").await;
        assert_eq!(first, Ok(None));
        assert_eq!(first, second);
        assert_eq!(remote.detail_calls(), 0);
    }

    #[tokio::test]
    async fn test_non_favorite_description_from_network() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.describe("OL2W", Ok(Some("Spice.".into())));
        let repo = repository(remote.clone(), Arc::new(MemoryFavoriteStore::new()));

        assert_eq!(
            repo.get_book_description("OL2W").await,
            Ok(Some("Spice.".to_string()))
        );
        assert_eq!(remote.detail_calls(), 1);
    }

    #[tokio::test]
    async fn test_description_remote_error_is_data_error() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.describe("OL2W", Err(RemoteError::NoInternet));
        let repo = repository(remote, Arc::new(MemoryFavoriteStore::new()));

        assert_eq!(
            repo.get_book_description("OL2W").await,
            Err(DataError::Remote(RemoteError::NoInternet))
        );
    }

    #[tokio::test]
    async fn test_local_read_failure_falls_through_to_remote() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.describe("OL3W", Ok(Some("fallback".into())));
        let repo = repository(remote.clone(), Arc::new(FailingStore::disk_full()));

        assert_eq!(
            repo.get_book_description("OL3W").await,
            Ok(Some("fallback".to_string()))
        );
        assert_eq!(remote.detail_calls(), 1);
    }

    #[tokio::test]
    async fn test_mark_favorite_maps_disk_full() {
        let repo = repository(
            Arc::new(ScriptedRemote::new()),
            Arc::new(FailingStore::disk_full()),
        );
        assert_eq!(
            repo.mark_favorite(&book("OL1W")).await,
            Err(LocalError::DiskFull)
        );
    }

    #[tokio::test]
    async fn test_mark_favorite_maps_other_failures_to_unknown() {
        let repo = repository(
            Arc::new(ScriptedRemote::new()),
            Arc::new(FailingStore::broken()),
        );
        assert_eq!(
            repo.mark_favorite(&book("OL1W")).await,
            Err(LocalError::Unknown)
        );
    }

    #[tokio::test]
    async fn test_delete_failure_is_swallowed() {
        let repo = repository(
            Arc::new(ScriptedRemote::new()),
            Arc::new(FailingStore::broken()),
        );
        // Nothing to assert beyond "returns".
        repo.delete_favorite("OL1W").await;
    }

    #[tokio::test]
    async fn test_favorite_round_trip() {
        let repo = repository(
            Arc::new(ScriptedRemote::new()),
            Arc::new(MemoryFavoriteStore::new()),
        );
        let mut membership = repo.is_favorite("OL1W");
        assert_eq!(membership.next().await, Some(false));

        repo.mark_favorite(&book("OL1W")).await.unwrap();
        assert_eq!(membership.next().await, Some(true));

        repo.delete_favorite("OL1W").await;
        assert_eq!(membership.next().await, Some(false));
    }

    #[tokio::test]
    async fn test_favorite_books_stream_maps_records() {
        let repo = repository(
            Arc::new(ScriptedRemote::new()),
            Arc::new(MemoryFavoriteStore::new()),
        );
        let mut favorites = repo.favorite_books();
        assert!(favorites.next().await.unwrap().is_empty());

        let mut described = book("OL5W");
        described.description = Some("kept".into());
        repo.mark_favorite(&described).await.unwrap();

        let books = favorites.next().await.unwrap();
        assert_eq!(books, vec![described]);
    }
}
