//! # In-Memory Favorite Store
//!
//! The favorites table as a `Vec` inside a watch channel. The channel's lock
//! serializes writers, and every subscriber reads the same snapshot.

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use crate::error::DbResult;
use crate::models::FavoriteRecord;
use crate::store::{FavoriteStore, FavoriteStream};

/// Process-local favorites store.
#[derive(Debug)]
pub struct MemoryFavoriteStore {
    table: watch::Sender<Vec<FavoriteRecord>>,
}

impl MemoryFavoriteStore {
    pub fn new() -> Self {
        let (table, _) = watch::channel(Vec::new());
        MemoryFavoriteStore { table }
    }

    /// Number of stored favorites.
    pub fn len(&self) -> usize {
        self.table.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.borrow().is_empty()
    }
}

impl Default for MemoryFavoriteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FavoriteStore for MemoryFavoriteStore {
    async fn upsert(&self, record: FavoriteRecord) -> DbResult<()> {
        debug!(id = %record.id, "Upserting favorite (memory)");
        self.table.send_modify(|rows| {
            match rows.iter_mut().find(|row| row.id == record.id) {
                Some(row) => *row = record,
                None => rows.push(record),
            }
        });
        Ok(())
    }

    fn observe_all(&self) -> FavoriteStream {
        WatchStream::new(self.table.subscribe()).boxed()
    }

    async fn get_by_id(&self, id: &str) -> DbResult<Option<FavoriteRecord>> {
        Ok(self.table.borrow().iter().find(|row| row.id == id).cloned())
    }

    async fn delete_by_id(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting favorite (memory)");
        self.table.send_modify(|rows| rows.retain(|row| row.id != id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_record;

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let store = MemoryFavoriteStore::new();
        store.upsert(sample_record("OL1W")).await.unwrap();
        store.upsert(sample_record("OL2W")).await.unwrap();

        let mut updated = sample_record("OL1W");
        updated.num_editions = 42;
        store.upsert(updated).await.unwrap();

        assert_eq!(store.len(), 2);
        let mut live = store.observe_all();
        let snapshot = live.next().await.unwrap();
        assert_eq!(snapshot[0].id, "OL1W");
        assert_eq!(snapshot[0].num_editions, 42);
        assert_eq!(snapshot[1].id, "OL2W");
    }

    #[tokio::test]
    async fn test_identical_upsert_still_emits() {
        let store = MemoryFavoriteStore::new();
        store.upsert(sample_record("OL1W")).await.unwrap();

        let mut live = store.observe_all();
        let before = live.next().await.unwrap();

        store.upsert(sample_record("OL1W")).await.unwrap();
        let after = live.next().await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryFavoriteStore::new();
        store.upsert(sample_record("OL1W")).await.unwrap();
        store.delete_by_id("OL1W").await.unwrap();
        assert!(store.is_empty());
        assert!(store.get_by_id("OL1W").await.unwrap().is_none());
    }
}
