//! # Favorite Store
//!
//! The capability every favorites backend provides, and the factory that
//! picks one at startup.
//!
//! ## Live Query Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    observe_all() subscription                           │
//! │                                                                         │
//! │  subscribe ──► [snapshot] ──► [snapshot] ──► [snapshot] ──► ...         │
//! │                    ▲              ▲              ▲                      │
//! │                 current        upsert(x)      delete(y)                 │
//! │                                                                         │
//! │  • The first item is always the current table contents                 │
//! │  • Every write yields one more full snapshot                           │
//! │  • Bursts of writes may coalesce into the latest snapshot              │
//! │  • Dropping the stream unsubscribes; subscribing again restarts it     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Snapshots are ordered by first insertion. Upserting an existing id
//! rewrites the row in place.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use std::sync::Arc;
use tracing::info;

use crate::error::DbResult;
use crate::models::FavoriteRecord;
use crate::pool::DbConfig;

/// Infinite stream of full favorites snapshots.
pub type FavoriteStream = BoxStream<'static, Vec<FavoriteRecord>>;

/// Persistent set of favorited books keyed by id.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Inserts the record, or overwrites the whole row if the id exists.
    async fn upsert(&self, record: FavoriteRecord) -> DbResult<()>;

    /// Subscribes to the full favorites list.
    fn observe_all(&self) -> FavoriteStream;

    /// Looks a single favorite up.
    async fn get_by_id(&self, id: &str) -> DbResult<Option<FavoriteRecord>>;

    /// Removes a favorite. Removing an absent id is not an error.
    async fn delete_by_id(&self, id: &str) -> DbResult<()>;
}

/// Storage backend chosen at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    /// SQLite file (or in-memory SQLite) through sqlx.
    Sqlite(DbConfig),
    /// Process-local table, lost on exit.
    Memory,
}

impl StoreBackend {
    /// Builds the store for this backend.
    pub async fn create(self) -> DbResult<Arc<dyn FavoriteStore>> {
        match self {
            StoreBackend::Sqlite(config) => {
                info!(path = %config.database_path.display(), "Using SQLite favorites store");
                let store = sqlite::SqliteFavoriteStore::connect(config).await?;
                Ok(Arc::new(store))
            }
            StoreBackend::Memory => {
                info!("Using in-memory favorites store");
                Ok(Arc::new(memory::MemoryFavoriteStore::new()))
            }
        }
    }
}
