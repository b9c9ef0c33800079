//! # bookpedia-sync: Search/Favorites Sync Layer for Bookpedia
//!
//! This crate reconciles the remote Open Library catalog with the local
//! favorites store and drives the two screen state machines.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bookpedia Sync Layer                             │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                   Bookpedia (composition root)                   │  │
//! │  │                                                                  │  │
//! │  │  Loads config, builds the client and store, starts machines      │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ SearchMachine  │  │ DetailMachine  │  │  SelectedBook          │    │
//! │  │                │  │                │  │                        │    │
//! │  │ Debounced,     │  │ Description +  │  │ Search → detail        │    │
//! │  │ cancelable     │  │ favorite       │  │ hand-off               │    │
//! │  │ search; grace  │  │ toggle         │  │                        │    │
//! │  │ window         │  │                │  │                        │    │
//! │  └───────┬────────┘  └───────┬────────┘  └────────────────────────┘    │
//! │          └──────────┬────────┘                                          │
//! │                     ▼                                                   │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  OfflineFirstRepository                          │   │
//! │  │                                                                 │   │
//! │  │  OpenLibraryClient (reqwest)        FavoriteStore (bookpedia-db) │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`app`] - `Bookpedia` composition root and tracing setup
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Sync error types
//! - [`protocol`] - Catalog response shapes and their `Book` mapping
//! - [`remote`] - HTTP client with safe-call error mapping
//! - [`repository`] - Cache-or-fetch repository over remote and store
//! - [`search`] - Search screen state machine
//! - [`detail`] - Detail screen state machine
//! - [`selection`] - Selected-book holder
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bookpedia_sync::{init_tracing, Bookpedia, BookpediaConfig};
//! use bookpedia_core::SearchAction;
//!
//! init_tracing();
//! let app = Bookpedia::new(BookpediaConfig::load(None)?).await?;
//!
//! let search = app.search();
//! let mut view = search.attach();
//! search.dispatch(SearchAction::QueryChange("dune".into()));
//! let state = view.changed().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod app;
pub mod config;
pub mod detail;
pub mod error;
pub mod protocol;
pub mod remote;
pub mod repository;
pub mod search;
pub mod selection;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use app::{init_tracing, Bookpedia};
pub use config::{ApiSettings, BookpediaConfig, SearchSettings, StorageKind, StorageSettings};
pub use detail::{DetailHandle, DetailMachine};
pub use error::{SyncError, SyncResult};
pub use remote::{OpenLibraryClient, RemoteBookSource};
pub use repository::{BookRepository, OfflineFirstRepository};
pub use search::{SearchHandle, SearchMachine, SearchView};
pub use selection::SelectedBook;
