//! # Search State Machine
//!
//! Owns the search screen snapshot. Query edits flow through a debounced,
//! cancelable pipeline into the repository; favorites flow in from the live
//! store.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  dispatch(QueryChange) ──► state.search_query                           │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │                      distinct (raw values)                              │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │                        debounce (500 ms)                                │
//! │                                 │                                       │
//! │          ┌──────────────────────┼───────────────────────┐               │
//! │          ▼                      ▼                       ▼               │
//! │       blank               1 char                 ≥ 2 chars              │
//! │  cancel search,          (nothing)          cancel search,              │
//! │  restore cache,                             spawn search task           │
//! │  clear error                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! ```text
//!   attach() ──► views 0→1 ──► activate: favorites task + pipeline task
//!
//!   drop(view) ──► views 1→0 ──► grace timer (5 s)
//!                                   │
//!                    ┌──────────────┴──────────────┐
//!                    ▼                             ▼
//!              attach() again               timer fires
//!              (timer cancelled)            deactivate: abort favorites,
//!                                           pipeline, in-flight search
//! ```
//!
//! The snapshot and the result cache survive deactivation. On the next
//! activation the last applied query counts as already settled, so a
//! returning view does not re-fetch what it already shows.
//!
//! ## Late Results
//! Every started or cancelled search bumps a generation counter. A search
//! task only writes if its generation is still current, checked inside the
//! same `send_if_modified` that applies the write. An aborted task that
//! already finished its network call therefore cannot overwrite newer state.

use futures_util::StreamExt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use bookpedia_core::validation::{classify_query, QueryKind};
use bookpedia_core::{Book, SearchAction, SearchState, SearchTab, UiText};

use crate::config::SearchSettings;
use crate::error::{SyncError, SyncResult};
use crate::repository::BookRepository;
use crate::selection::SelectedBook;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Commands
// =============================================================================

#[derive(Debug)]
enum Command {
    Attach,
    Detach,
    Shutdown,
}

// =============================================================================
// Machine
// =============================================================================

/// Search screen state machine.
pub struct SearchMachine {
    repository: Arc<dyn BookRepository>,
    settings: SearchSettings,
    selection: SelectedBook,
}

impl SearchMachine {
    pub fn new(
        repository: Arc<dyn BookRepository>,
        settings: SearchSettings,
        selection: SelectedBook,
    ) -> Self {
        SearchMachine {
            repository,
            settings,
            selection,
        }
    }

    /// Spawns the lifecycle loop and returns a handle.
    ///
    /// Nothing runs upstream until the first [`SearchHandle::attach`].
    pub fn start(self) -> SearchHandle {
        let (state_tx, _) = watch::channel(SearchState::new(self.settings.default_query.clone()));
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let grace = self.settings.grace_period();

        let shared = Arc::new(Shared {
            repository: self.repository,
            settings: self.settings,
            state_tx,
            active: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            search_task: Mutex::new(None),
            cache: Mutex::new(None),
            applied_query: Mutex::new(None),
        });

        let lifecycle = Lifecycle {
            shared: Arc::clone(&shared),
            views: 0,
            favorites: None,
            pipeline: None,
        };
        tokio::spawn(lifecycle.run(cmd_rx, grace));

        SearchHandle {
            shared,
            cmd_tx,
            selection: self.selection,
        }
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Handle for driving a running search machine.
#[derive(Clone)]
pub struct SearchHandle {
    shared: Arc<Shared>,
    cmd_tx: mpsc::UnboundedSender<Command>,
    selection: SelectedBook,
}

impl SearchHandle {
    /// Registers a view. The machine stays active while any view is alive.
    pub fn attach(&self) -> SearchView {
        if self.cmd_tx.send(Command::Attach).is_err() {
            warn!("Attach after shutdown, view will not activate the machine");
        }
        SearchView {
            state_rx: self.shared.state_tx.subscribe(),
            cmd_tx: self.cmd_tx.clone(),
        }
    }

    /// Applies a UI action.
    pub fn dispatch(&self, action: SearchAction) {
        match action {
            SearchAction::QueryChange(query) => {
                self.shared.state_tx.send_if_modified(|state| {
                    if state.search_query == query {
                        return false;
                    }
                    state.search_query = query;
                    true
                });
            }
            SearchAction::BookSelect(book) => self.selection.select(book),
            SearchAction::TabSelect(index) => match SearchTab::from_index(index) {
                Some(tab) => self.shared.state_tx.send_modify(|state| state.selected_tab = tab),
                None => warn!(index, "Ignoring unknown tab"),
            },
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> SearchState {
        self.shared.state_tx.borrow().clone()
    }

    /// Raw snapshot receiver. Unlike [`attach`](Self::attach) it does not
    /// keep the machine active.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.state_tx.subscribe()
    }

    /// Whether the favorites subscription and pipeline are running.
    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Stops all upstream work and the lifecycle loop.
    pub fn shutdown(&self) -> SyncResult<()> {
        self.cmd_tx
            .send(Command::Shutdown)
            .map_err(|_| SyncError::ChannelError("Search command channel closed".into()))
    }
}

/// A live view of the search screen. Dropping it detaches.
pub struct SearchView {
    state_rx: watch::Receiver<SearchState>,
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl SearchView {
    pub fn state(&self) -> SearchState {
        self.state_rx.borrow().clone()
    }

    /// Waits for the next snapshot.
    pub async fn changed(&mut self) -> SyncResult<SearchState> {
        self.state_rx
            .changed()
            .await
            .map_err(|_| SyncError::ShuttingDown)?;
        Ok(self.state_rx.borrow_and_update().clone())
    }
}

impl Drop for SearchView {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(Command::Detach);
    }
}

// =============================================================================
// Shared State
// =============================================================================

struct Shared {
    repository: Arc<dyn BookRepository>,
    settings: SearchSettings,
    state_tx: watch::Sender<SearchState>,
    active: AtomicBool,

    /// Bumped on every search start and cancel.
    generation: AtomicU64,
    search_task: Mutex<Option<JoinHandle<()>>>,

    /// Results of the first successful search, restored on a blank query.
    cache: Mutex<Option<Vec<Book>>>,

    /// Last query whose outcome reached the snapshot.
    applied_query: Mutex<Option<String>>,
}

impl Shared {
    /// Query the pipeline may treat as already handled on activation.
    fn settled_query(&self) -> Option<String> {
        if lock(&self.cache).is_none() {
            return None;
        }
        lock(&self.applied_query).clone()
    }

    async fn follow_favorites(self: Arc<Self>) {
        let mut favorites = self.repository.favorite_books();
        while let Some(books) = favorites.next().await {
            debug!(count = books.len(), "Favorites updated");
            self.state_tx.send_modify(|state| state.favorite_books = books);
        }
    }

    async fn run_pipeline(self: Arc<Self>, settled: Option<String>) {
        let debounce = self.settings.debounce();
        let mut state_rx = self.state_tx.subscribe();
        let mut last_seen = settled;
        let mut pending: Option<(String, Instant)> = None;

        let current = state_rx.borrow_and_update().search_query.clone();
        if last_seen.as_deref() != Some(current.as_str()) {
            pending = Some((current.clone(), Instant::now() + debounce));
            last_seen = Some(current);
        }

        loop {
            let deadline = pending.as_ref().map(|(_, at)| *at);
            tokio::select! {
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let query = state_rx.borrow_and_update().search_query.clone();
                    if last_seen.as_deref() == Some(query.as_str()) {
                        continue;
                    }
                    pending = Some((query.clone(), Instant::now() + debounce));
                    last_seen = Some(query);
                }

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some((query, _)) = pending.take() {
                        self.settle(query);
                    }
                }
            }
        }
    }

    fn settle(self: &Arc<Self>, query: String) {
        match classify_query(&query, self.settings.min_query_chars) {
            QueryKind::Blank => self.restore_cached(query),
            QueryKind::Searchable => self.start_search(query),
            QueryKind::TooShort => debug!(query = %query, "Query too short, keeping results"),
        }
    }

    fn restore_cached(&self, query: String) {
        self.cancel_search();
        let cached = lock(&self.cache).clone().unwrap_or_default();
        debug!(count = cached.len(), "Blank query, restoring cached results");
        self.state_tx.send_modify(|state| {
            state.search_results = cached;
            state.error_message = None;
            state.is_loading = false;
        });
        *lock(&self.applied_query) = Some(query);
    }

    fn start_search(self: &Arc<Self>, query: String) {
        let mut slot = lock(&self.search_task);
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state_tx.send_modify(|state| state.is_loading = true);

        debug!(query = %query, generation, "Starting search");
        let shared = Arc::clone(self);
        *slot = Some(tokio::spawn(async move {
            shared.run_search(generation, query).await;
        }));
    }

    /// Aborts the in-flight search, if any. Returns whether one was running.
    fn cancel_search(&self) -> bool {
        self.generation.fetch_add(1, Ordering::SeqCst);
        match lock(&self.search_task).take() {
            Some(task) => {
                let running = !task.is_finished();
                task.abort();
                running
            }
            None => false,
        }
    }

    async fn run_search(&self, generation: u64, query: String) {
        let result = self.repository.search_books(&query).await;

        let applied = self.state_tx.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            match &result {
                Ok(books) => {
                    state.search_results = books.clone();
                    state.error_message = None;
                    let mut cache = lock(&self.cache);
                    if cache.is_none() {
                        *cache = Some(books.clone());
                    }
                }
                Err(error) => {
                    state.search_results.clear();
                    state.error_message = Some(UiText::from(*error));
                }
            }
            state.is_loading = false;
            *lock(&self.applied_query) = Some(query.clone());
            true
        });

        match (&result, applied) {
            (_, false) => debug!(query = %query, generation, "Discarded superseded result"),
            (Ok(books), true) => debug!(query = %query, count = books.len(), "Search applied"),
            (Err(error), true) => warn!(query = %query, error = %error, "Search failed"),
        }
    }
}

// =============================================================================
// Lifecycle Loop
// =============================================================================

struct Lifecycle {
    shared: Arc<Shared>,
    views: usize,
    favorites: Option<JoinHandle<()>>,
    pipeline: Option<JoinHandle<()>>,
}

impl Lifecycle {
    async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<Command>, grace: Duration) {
        let mut grace_deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(Command::Attach) => {
                        self.views += 1;
                        grace_deadline = None;
                        self.activate();
                    }
                    Some(Command::Detach) => {
                        self.views = self.views.saturating_sub(1);
                        if self.views == 0 {
                            debug!(grace_ms = grace.as_millis() as u64, "Last view detached");
                            grace_deadline = Some(Instant::now() + grace);
                        }
                    }
                    Some(Command::Shutdown) | None => {
                        info!("Search machine shutting down");
                        self.deactivate();
                        break;
                    }
                },

                _ = sleep_until(grace_deadline.unwrap_or_else(Instant::now)), if grace_deadline.is_some() => {
                    grace_deadline = None;
                    self.deactivate();
                }
            }
        }
    }

    fn activate(&mut self) {
        if self.shared.active.swap(true, Ordering::SeqCst) {
            return;
        }
        let settled = self.shared.settled_query();
        info!(settled = ?settled, "Search machine active");

        self.favorites = Some(tokio::spawn(Arc::clone(&self.shared).follow_favorites()));
        self.pipeline = Some(tokio::spawn(Arc::clone(&self.shared).run_pipeline(settled)));
    }

    fn deactivate(&mut self) {
        if !self.shared.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(task) = self.favorites.take() {
            task.abort();
        }
        if let Some(task) = self.pipeline.take() {
            task.abort();
        }
        let interrupted = self.shared.cancel_search();
        if interrupted {
            // The aborted query never applied; make the next activation run it.
            self.shared.state_tx.send_modify(|state| {
                state.is_loading = false;
                *lock(&self.shared.applied_query) = None;
            });
        }
        info!(interrupted, "Search machine idle");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
