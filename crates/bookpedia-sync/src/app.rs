//! # Composition Root
//!
//! Wires configuration, the catalog client, the favorites store and the
//! repository together, and starts screen state machines on demand.
//!
//! ```text
//! BookpediaConfig ──► OpenLibraryClient ─┐
//!                 └─► StoreBackend ──────┴─► OfflineFirstRepository
//!                                                  │
//!                              ┌───────────────────┴──────────────┐
//!                              ▼                                  ▼
//!                       search() → SearchHandle        open_detail(book) → DetailHandle
//!                              │                                  ▲
//!                              └──── SelectedBook ── open_selected┘
//! ```

use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use bookpedia_core::{Book, DetailAction};
use bookpedia_db::StoreBackend;

use crate::config::BookpediaConfig;
use crate::detail::{DetailHandle, DetailMachine};
use crate::error::{SyncError, SyncResult};
use crate::remote::OpenLibraryClient;
use crate::repository::{BookRepository, OfflineFirstRepository};
use crate::search::{SearchHandle, SearchMachine};
use crate::selection::SelectedBook;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bookpedia_sync=trace` - Trace the sync layer only
/// - Default: `info,bookpedia=debug,sqlx=warn`
///
/// Calling it again after a subscriber is installed does nothing.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bookpedia=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// The assembled application core.
#[derive(Clone)]
pub struct Bookpedia {
    config: BookpediaConfig,
    repository: Arc<dyn BookRepository>,
    selection: SelectedBook,
}

impl Bookpedia {
    /// Builds the catalog client and opens the favorites store.
    pub async fn new(config: BookpediaConfig) -> SyncResult<Self> {
        config.validate()?;

        let remote = Arc::new(OpenLibraryClient::new(&config.api)?);

        let backend = config.storage.backend();
        if let StoreBackend::Sqlite(db) = &backend {
            if !db.is_in_memory() {
                let parent = db.database_path.parent();
                if let Some(dir) = parent.filter(|dir| !dir.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir).map_err(|e| {
                        SyncError::DatabaseError(format!(
                            "cannot create data directory {}: {}",
                            dir.display(),
                            e
                        ))
                    })?;
                }
            }
        }
        let store = backend.create().await?;

        let repository = Arc::new(OfflineFirstRepository::new(
            remote,
            store,
            config.api.covers_url.clone(),
            config.api.search_limit,
        ));

        info!(
            catalog = %config.api.base_url,
            storage = %config.storage.backend,
            "Bookpedia ready"
        );
        Ok(Self::with_parts(config, repository))
    }

    /// Assembles the core around an existing repository.
    pub fn with_parts(config: BookpediaConfig, repository: Arc<dyn BookRepository>) -> Self {
        Bookpedia {
            config,
            repository,
            selection: SelectedBook::new(),
        }
    }

    pub fn config(&self) -> &BookpediaConfig {
        &self.config
    }

    pub fn repository(&self) -> Arc<dyn BookRepository> {
        Arc::clone(&self.repository)
    }

    pub fn selection(&self) -> &SelectedBook {
        &self.selection
    }

    /// Starts a search machine. Attach a view to activate it.
    pub fn search(&self) -> SearchHandle {
        SearchMachine::new(
            self.repository(),
            self.config.search.clone(),
            self.selection.clone(),
        )
        .start()
    }

    /// Starts a detail machine for `book` and feeds it the snapshot.
    pub fn open_detail(&self, book: Book) -> DetailHandle {
        debug!(id = %book.id, "Opening detail");
        let handle = DetailMachine::new(self.repository(), book.id.clone()).start();
        handle.dispatch(DetailAction::SelectedBookChange(book));
        handle
    }

    /// Opens the detail screen for the book last selected on the search
    /// screen, if any.
    pub fn open_selected(&self) -> Option<DetailHandle> {
        self.selection.current().map(|book| self.open_detail(book))
    }
}
