//! Test doubles shared by the repository and machine tests.

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bookpedia_core::{Book, RemoteError};
use bookpedia_db::{
    DbError, DbResult, FavoriteRecord, FavoriteStore, FavoriteStream, MemoryFavoriteStore,
};

use crate::protocol::{BookWorkDto, SearchResponseDto, SearchedBookDto};
use crate::remote::RemoteBookSource;
use crate::repository::{BookRepository, OfflineFirstRepository};

pub fn book(id: &str) -> Book {
    Book {
        id: id.to_string(),
        title: format!("Book {}", id),
        cover_image_url: String::new(),
        authors: vec!["A. Writer".to_string()],
        description: None,
        languages: vec!["eng".to_string()],
        first_publish_year: Some("2001".to_string()),
        average_rating: None,
        rating_count: None,
        num_pages: Some(100),
        num_editions: 1,
    }
}

pub fn repository(
    remote: Arc<ScriptedRemote>,
    store: Arc<MemoryFavoriteStore>,
) -> Arc<dyn BookRepository> {
    Arc::new(OfflineFirstRepository::new(
        remote,
        store,
        "https://covers.openlibrary.org",
        None,
    ))
}

// =============================================================================
// Scripted Remote
// =============================================================================

type SearchScript = (Duration, Result<SearchResponseDto, RemoteError>);
type DetailScript = (Duration, Result<Option<String>, RemoteError>);

/// Remote catalog answering from a script. Unscripted searches return no
/// docs; unscripted work lookups return no description.
#[derive(Default)]
pub struct ScriptedRemote {
    searches: Mutex<HashMap<String, SearchScript>>,
    details: Mutex<HashMap<String, DetailScript>>,
    search_log: Mutex<Vec<(String, Option<u32>)>>,
    detail_log: Mutex<Vec<String>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, query: &str, result: Result<SearchResponseDto, RemoteError>) {
        self.respond_after(query, Duration::ZERO, result);
    }

    pub fn respond_after(
        &self,
        query: &str,
        delay: Duration,
        result: Result<SearchResponseDto, RemoteError>,
    ) {
        self.searches
            .lock()
            .unwrap()
            .insert(query.to_string(), (delay, result));
    }

    pub fn describe(&self, id: &str, result: Result<Option<String>, RemoteError>) {
        self.describe_after(id, Duration::ZERO, result);
    }

    pub fn describe_after(
        &self,
        id: &str,
        delay: Duration,
        result: Result<Option<String>, RemoteError>,
    ) {
        self.details
            .lock()
            .unwrap()
            .insert(id.to_string(), (delay, result));
    }

    /// Every search call made so far, in call order.
    pub fn search_calls(&self) -> Vec<(String, Option<u32>)> {
        self.search_log.lock().unwrap().clone()
    }

    pub fn searched_queries(&self) -> Vec<String> {
        self.search_calls().into_iter().map(|(q, _)| q).collect()
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_log.lock().unwrap().len()
    }

    /// `n` docs with ids `OL0W..`.
    pub fn docs(n: usize) -> SearchResponseDto {
        Self::docs_titled("Book", n)
    }

    pub fn docs_titled(title: &str, n: usize) -> SearchResponseDto {
        SearchResponseDto {
            docs: (0..n)
                .map(|i| SearchedBookDto {
                    key: format!("/works/OL{}W", i),
                    title: format!("{} {}", title, i),
                    author_name: Some(vec!["A. Writer".to_string()]),
                    author_key: None,
                    cover_edition_key: None,
                    cover_i: Some(i as i64),
                    ratings_average: None,
                    ratings_count: None,
                    first_publish_year: Some(2000),
                    language: None,
                    number_of_pages_median: None,
                    edition_count: Some(1),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl RemoteBookSource for ScriptedRemote {
    async fn search_books(
        &self,
        query: &str,
        limit: Option<u32>,
    ) -> Result<SearchResponseDto, RemoteError> {
        self.search_log
            .lock()
            .unwrap()
            .push((query.to_string(), limit));
        let script = self.searches.lock().unwrap().get(query).cloned();
        match script {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => Ok(SearchResponseDto { docs: Vec::new() }),
        }
    }

    async fn get_book_details(&self, work_id: &str) -> Result<BookWorkDto, RemoteError> {
        self.detail_log.lock().unwrap().push(work_id.to_string());
        let script = self.details.lock().unwrap().get(work_id).cloned();
        match script {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result.map(|description| BookWorkDto { description })
            }
            None => Ok(BookWorkDto::default()),
        }
    }
}

// =============================================================================
// Failing Store
// =============================================================================

/// Store whose every operation fails.
pub struct FailingStore {
    disk_full: bool,
}

impl FailingStore {
    pub fn disk_full() -> Self {
        FailingStore { disk_full: true }
    }

    pub fn broken() -> Self {
        FailingStore { disk_full: false }
    }

    fn error(&self) -> DbError {
        if self.disk_full {
            DbError::DiskFull
        } else {
            DbError::QueryFailed("no such table: favorite_books".into())
        }
    }
}

#[async_trait]
impl FavoriteStore for FailingStore {
    async fn upsert(&self, _record: FavoriteRecord) -> DbResult<()> {
        Err(self.error())
    }

    fn observe_all(&self) -> FavoriteStream {
        stream::pending().boxed()
    }

    async fn get_by_id(&self, _id: &str) -> DbResult<Option<FavoriteRecord>> {
        Err(self.error())
    }

    async fn delete_by_id(&self, _id: &str) -> DbResult<()> {
        Err(self.error())
    }
}
