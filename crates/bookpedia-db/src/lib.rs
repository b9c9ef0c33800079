//! # bookpedia-db: Favorites Store for Bookpedia
//!
//! This crate persists favorited books and pushes every change to live
//! subscribers. SQLite is the production backend; an in-memory backend with
//! identical semantics serves tests and ephemeral sessions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bookpedia Data Flow                              │
//! │                                                                         │
//! │  OfflineFirstRepository (bookpedia-sync)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  bookpedia-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ FavoriteStore │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (store/)     │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Sqlite        │    │ 001_favorite │  │   │
//! │  │   │ WAL           │    │ Memory        │    │  _books.sql  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  favorites.db (SQLite, WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - Connection pool and SQLite tuning
//! - [`migrations`] - Embedded schema migrations
//! - [`models`] - `FavoriteRecord` and its `Book` conversions
//! - [`store`] - The `FavoriteStore` capability and its backends
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bookpedia_db::{DbConfig, StoreBackend};
//!
//! let store = StoreBackend::Sqlite(DbConfig::new("favorites.db")).create().await?;
//! let mut favorites = store.observe_all();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use models::FavoriteRecord;
pub use pool::{Database, DbConfig};
pub use store::memory::MemoryFavoriteStore;
pub use store::sqlite::SqliteFavoriteStore;
pub use store::{FavoriteStore, FavoriteStream, StoreBackend};
