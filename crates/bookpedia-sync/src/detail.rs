//! # Detail State Machine
//!
//! Owns the book detail snapshot for one book id.
//!
//! ```text
//! start(book_id)
//!   ├── description task (one shot) ──► book.description, is_loading = false
//!   └── favorite task (lifetime)    ──► is_favorite
//!
//! dispatch(SelectedBookChange) ──► book (fetched description kept)
//! dispatch(FavoriteClick)      ──► delete or upsert, fire-and-forget
//! ```
//!
//! The description and the book snapshot can arrive in either order. A
//! fetched description is remembered under the state lock and applied to
//! whichever book snapshot is current.

use futures_util::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use bookpedia_core::{Book, DetailAction, DetailState, OutcomeExt};

use crate::repository::BookRepository;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Book detail state machine.
pub struct DetailMachine {
    repository: Arc<dyn BookRepository>,
    book_id: String,
}

impl DetailMachine {
    pub fn new(repository: Arc<dyn BookRepository>, book_id: impl Into<String>) -> Self {
        DetailMachine {
            repository,
            book_id: book_id.into(),
        }
    }

    /// Starts the description fetch and the favorite subscription.
    pub fn start(self) -> DetailHandle {
        let (state_tx, _) = watch::channel(DetailState::default());
        let shared = Arc::new(Shared {
            repository: self.repository,
            book_id: self.book_id,
            state_tx,
            fetched: Mutex::new(None),
        });

        let tasks = vec![
            tokio::spawn(Arc::clone(&shared).load_description()),
            tokio::spawn(Arc::clone(&shared).follow_favorite()),
        ];

        DetailHandle { shared, tasks }
    }
}

/// Handle for a running detail machine. Dropping it stops the machine.
pub struct DetailHandle {
    shared: Arc<Shared>,
    tasks: Vec<JoinHandle<()>>,
}

impl DetailHandle {
    pub fn book_id(&self) -> &str {
        &self.shared.book_id
    }

    pub fn dispatch(&self, action: DetailAction) {
        match action {
            DetailAction::BackClick => {}
            DetailAction::SelectedBookChange(book) => self.shared.replace_book(book),
            DetailAction::FavoriteClick => self.shared.toggle_favorite(),
        }
    }

    pub fn state(&self) -> DetailState {
        self.shared.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.shared.state_tx.subscribe()
    }

    /// Stops the description fetch and the favorite subscription.
    /// Favorite writes already started still complete.
    pub fn shutdown(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

impl Drop for DetailHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Shared {
    repository: Arc<dyn BookRepository>,
    book_id: String,
    state_tx: watch::Sender<DetailState>,

    /// `Some` once the description fetch succeeded.
    fetched: Mutex<Option<Option<String>>>,
}

impl Shared {
    async fn load_description(self: Arc<Self>) {
        let result = self
            .repository
            .get_book_description(&self.book_id)
            .await
            .on_error(|error| {
                warn!(id = %self.book_id, error = %error, "Description unavailable")
            });

        self.state_tx.send_modify(|state| {
            if let Ok(description) = &result {
                *lock(&self.fetched) = Some(description.clone());
                if let Some(book) = state.book.as_mut() {
                    book.description = description.clone();
                }
            }
            state.is_loading = false;
        });
    }

    async fn follow_favorite(self: Arc<Self>) {
        let mut membership = self.repository.is_favorite(&self.book_id);
        while let Some(is_favorite) = membership.next().await {
            self.state_tx.send_if_modified(|state| {
                if state.is_favorite == is_favorite {
                    return false;
                }
                state.is_favorite = is_favorite;
                true
            });
        }
    }

    fn replace_book(&self, book: Book) {
        self.state_tx.send_modify(|state| {
            let book = match lock(&self.fetched).as_ref() {
                Some(description) => book.with_description(description.clone()),
                None => book,
            };
            state.book = Some(book);
        });
    }

    fn toggle_favorite(&self) {
        let state = self.state_tx.borrow().clone();
        let repository = Arc::clone(&self.repository);

        if state.is_favorite {
            let id = self.book_id.clone();
            debug!(id = %id, "Removing favorite");
            tokio::spawn(async move { repository.delete_favorite(&id).await });
            return;
        }

        match state.book {
            Some(book) => {
                debug!(id = %book.id, "Adding favorite");
                tokio::spawn(async move {
                    let _ = repository.mark_favorite(&book).await.on_error(|error| {
                        warn!(id = %book.id, error = %error, "Favorite not saved")
                    });
                });
            }
            None => debug!(id = %self.book_id, "Favorite click before book loaded"),
        }
    }
}
