//! # SQLite Favorite Store
//!
//! Favorites persisted in the `favorite_books` table.
//!
//! ## Invalidation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  upsert / delete ──► SQL write ──► changes.send_modify(n + 1)           │
//! │                                          │                              │
//! │                     ┌────────────────────┼────────────────────┐         │
//! │                     ▼                    ▼                    ▼         │
//! │               subscriber A          subscriber B         subscriber C   │
//! │               SELECT all            SELECT all           SELECT all     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every live subscriber re-runs the "all favorites" query when the counter
//! moves. A watch channel only keeps the latest value, so a burst of writes
//! costs one re-query per subscriber, not one per write.

use async_trait::async_trait;
use futures_util::StreamExt;
use sqlx::SqlitePool;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

use crate::error::DbResult;
use crate::models::FavoriteRecord;
use crate::pool::{Database, DbConfig};
use crate::store::{FavoriteStore, FavoriteStream};

const SELECT_ALL: &str = r#"
    SELECT id, title, cover_image_url, authors, description, languages,
           first_publish_year, average_rating, rating_count, num_pages, num_editions
    FROM favorite_books
    ORDER BY rowid
"#;

const SELECT_ONE: &str = r#"
    SELECT id, title, cover_image_url, authors, description, languages,
           first_publish_year, average_rating, rating_count, num_pages, num_editions
    FROM favorite_books
    WHERE id = ?1
"#;

// ON CONFLICT DO UPDATE keeps the rowid, unlike INSERT OR REPLACE.
const UPSERT: &str = r#"
    INSERT INTO favorite_books (
        id, title, cover_image_url, authors, description, languages,
        first_publish_year, average_rating, rating_count, num_pages, num_editions
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
    ON CONFLICT(id) DO UPDATE SET
        title = excluded.title,
        cover_image_url = excluded.cover_image_url,
        authors = excluded.authors,
        description = excluded.description,
        languages = excluded.languages,
        first_publish_year = excluded.first_publish_year,
        average_rating = excluded.average_rating,
        rating_count = excluded.rating_count,
        num_pages = excluded.num_pages,
        num_editions = excluded.num_editions
"#;

/// Favorites store backed by SQLite.
#[derive(Debug)]
pub struct SqliteFavoriteStore {
    db: Database,
    changes: watch::Sender<u64>,
}

impl SqliteFavoriteStore {
    /// Wraps an already migrated database.
    pub fn new(db: Database) -> Self {
        let (changes, _) = watch::channel(0);
        SqliteFavoriteStore { db, changes }
    }

    /// Opens (and migrates) the database described by `config`.
    pub async fn connect(config: DbConfig) -> DbResult<Self> {
        let db = Database::new(config).await?;
        Ok(Self::new(db))
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version += 1);
    }
}

async fn fetch_all(pool: &SqlitePool) -> DbResult<Vec<FavoriteRecord>> {
    let records = sqlx::query_as::<_, FavoriteRecord>(SELECT_ALL)
        .fetch_all(pool)
        .await?;
    Ok(records)
}

#[async_trait]
impl FavoriteStore for SqliteFavoriteStore {
    async fn upsert(&self, record: FavoriteRecord) -> DbResult<()> {
        debug!(id = %record.id, "Upserting favorite");

        sqlx::query(UPSERT)
            .bind(&record.id)
            .bind(&record.title)
            .bind(&record.cover_image_url)
            .bind(&record.authors)
            .bind(&record.description)
            .bind(&record.languages)
            .bind(&record.first_publish_year)
            .bind(record.average_rating)
            .bind(record.rating_count)
            .bind(record.num_pages)
            .bind(record.num_editions)
            .execute(self.db.pool())
            .await?;

        self.notify();
        Ok(())
    }

    fn observe_all(&self) -> FavoriteStream {
        let pool = self.db.pool().clone();

        WatchStream::new(self.changes.subscribe())
            .then(move |version| {
                let pool = pool.clone();
                async move { (version, fetch_all(&pool).await) }
            })
            .filter_map(|(version, result)| async move {
                match result {
                    Ok(records) => {
                        debug!(version, count = records.len(), "Favorites snapshot");
                        Some(records)
                    }
                    Err(e) => {
                        warn!(version, error = %e, "Favorites re-query failed");
                        None
                    }
                }
            })
            .boxed()
    }

    async fn get_by_id(&self, id: &str) -> DbResult<Option<FavoriteRecord>> {
        let record = sqlx::query_as::<_, FavoriteRecord>(SELECT_ONE)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(record)
    }

    async fn delete_by_id(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting favorite");

        sqlx::query("DELETE FROM favorite_books WHERE id = ?1")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        self.notify();
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::models::sample_record;

    async fn store() -> SqliteFavoriteStore {
        SqliteFavoriteStore::connect(DbConfig::in_memory())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upsert_overwrites_whole_row() {
        let store = store().await;
        store.upsert(sample_record("OL1W")).await.unwrap();

        let mut changed = sample_record("OL1W");
        changed.title = "Dune Messiah".into();
        changed.description = Some("Sequel".into());
        changed.rating_count = None;
        store.upsert(changed.clone()).await.unwrap();

        let stored = store.get_by_id("OL1W").await.unwrap().unwrap();
        assert_eq!(stored, changed);
    }

    #[tokio::test]
    async fn test_upsert_keeps_insertion_position() {
        let store = store().await;
        for id in ["OL1W", "OL2W", "OL3W"] {
            store.upsert(sample_record(id)).await.unwrap();
        }

        let mut first = sample_record("OL1W");
        first.title = "Renamed".into();
        store.upsert(first).await.unwrap();

        let all = fetch_all(store.database().pool()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["OL1W", "OL2W", "OL3W"]);
        assert_eq!(all[0].title, "Renamed");
    }

    #[tokio::test]
    async fn test_resubscribe_starts_from_current_snapshot() {
        let store = store().await;
        store.upsert(sample_record("OL1W")).await.unwrap();

        let mut first = store.observe_all();
        assert_eq!(first.next().await.unwrap().len(), 1);
        drop(first);

        store.upsert(sample_record("OL2W")).await.unwrap();

        let mut second = store.observe_all();
        assert_eq!(second.next().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_writes() {
        let store = store().await;
        let mut a = store.observe_all();
        let mut b = store.observe_all();
        a.next().await.unwrap();
        b.next().await.unwrap();

        store.upsert(sample_record("OL7W")).await.unwrap();

        assert_eq!(a.next().await.unwrap()[0].id, "OL7W");
        assert_eq!(b.next().await.unwrap()[0].id, "OL7W");
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_ok() {
        let store = store().await;
        store.delete_by_id("nope").await.unwrap();
        assert!(store.get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_full_database_maps_to_disk_full() {
        let store = store().await;
        let pool = store.database().pool();

        let pages: i64 = sqlx::query_scalar("PRAGMA page_count")
            .fetch_one(pool)
            .await
            .unwrap();
        sqlx::query(&format!("PRAGMA max_page_count = {}", pages))
            .execute(pool)
            .await
            .unwrap();

        let mut huge = sample_record("OL9W");
        huge.description = Some("x".repeat(256 * 1024));

        let err = store.upsert(huge).await.unwrap_err();
        assert!(matches!(err, DbError::DiskFull), "got {:?}", err);
    }
}
