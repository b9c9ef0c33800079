//! Selected-book holder shared between the search and detail screens.
//!
//! Search writes the book the user tapped; the detail screen reads it when it
//! opens and clears it when it closes. Cloning shares the same slot.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use bookpedia_core::Book;

#[derive(Clone)]
pub struct SelectedBook {
    slot: Arc<watch::Sender<Option<Book>>>,
}

impl SelectedBook {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        SelectedBook { slot: Arc::new(slot) }
    }

    pub fn select(&self, book: Book) {
        debug!(id = %book.id, "Book selected");
        self.slot.send_replace(Some(book));
    }

    pub fn clear(&self) {
        self.slot.send_replace(None);
    }

    pub fn current(&self) -> Option<Book> {
        self.slot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Book>> {
        self.slot.subscribe()
    }
}

impl Default for SelectedBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::book;

    #[test]
    fn test_clones_share_the_slot() {
        let selection = SelectedBook::new();
        let other = selection.clone();
        assert_eq!(selection.current(), None);

        other.select(book("OL1W"));
        assert_eq!(selection.current().map(|b| b.id), Some("OL1W".to_string()));

        selection.clear();
        assert_eq!(other.current(), None);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let selection = SelectedBook::new();
        let mut rx = selection.subscribe();

        selection.select(book("OL2W"));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().map(|b| b.id.clone()), Some("OL2W".into()));
    }
}
