//! # UI State & Actions
//!
//! Immutable snapshots published by the state machines, and the actions the
//! UI dispatches back into them.
//!
//! ## Search Screen
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SearchState                                    │
//! │                                                                         │
//! │  search_query ───► debounce ───► SearchBooks ───► search_results        │
//! │                                                   is_loading            │
//! │                                                   error_message         │
//! │                                                                         │
//! │  favorites live stream ─────────────────────────► favorite_books        │
//! │                                                                         │
//! │  selected_tab: Search (0) | Favorites (1)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The two writers touch disjoint fields, so neither can lose the other's
//! update.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::text::{StringResource, UiText};
use crate::types::Book;
use crate::DEFAULT_SEARCH_QUERY;

// =============================================================================
// Search Screen
// =============================================================================

/// Tabs on the search screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum SearchTab {
    #[default]
    Search,
    Favorites,
}

impl SearchTab {
    /// Position of the tab in the tab row.
    pub fn index(&self) -> usize {
        match self {
            SearchTab::Search => 0,
            SearchTab::Favorites => 1,
        }
    }

    /// Looks a tab up by its position.
    pub fn from_index(index: usize) -> Option<SearchTab> {
        match index {
            0 => Some(SearchTab::Search),
            1 => Some(SearchTab::Favorites),
            _ => None,
        }
    }
}

/// Snapshot of the search screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub search_query: String,
    pub search_results: Vec<Book>,
    pub favorite_books: Vec<Book>,
    pub is_loading: bool,
    pub selected_tab: SearchTab,
    pub error_message: Option<UiText>,
}

impl SearchState {
    /// Fresh state for the given initial query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            search_query: query.into(),
            search_results: Vec::new(),
            favorite_books: Vec::new(),
            is_loading: true,
            selected_tab: SearchTab::Search,
            error_message: None,
        }
    }

    /// Books listed under the active tab.
    pub fn visible_books(&self) -> &[Book] {
        match self.selected_tab {
            SearchTab::Search => &self.search_results,
            SearchTab::Favorites => &self.favorite_books,
        }
    }

    /// The "nothing here" message for the active tab.
    ///
    /// `None` while loading, while an error is shown, or when the tab has
    /// books to list.
    pub fn empty_message(&self) -> Option<UiText> {
        if self.is_loading || self.error_message.is_some() || !self.visible_books().is_empty() {
            return None;
        }
        let resource = match self.selected_tab {
            SearchTab::Search => StringResource::NoSearchResults,
            SearchTab::Favorites => StringResource::NoFavoriteBooks,
        };
        Some(UiText::Resource(resource))
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_QUERY)
    }
}

/// Actions the search screen dispatches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum SearchAction {
    QueryChange(String),
    BookSelect(Book),
    TabSelect(usize),
}

// =============================================================================
// Detail Screen
// =============================================================================

/// Snapshot of the book detail screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DetailState {
    pub is_loading: bool,
    pub is_favorite: bool,
    pub book: Option<Book>,
}

impl Default for DetailState {
    fn default() -> Self {
        Self {
            is_loading: true,
            is_favorite: false,
            book: None,
        }
    }
}

/// Actions the detail screen dispatches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum DetailAction {
    /// Navigation only; the machine ignores it.
    BackClick,
    FavoriteClick,
    SelectedBookChange(Book),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sample_book;

    #[test]
    fn test_search_defaults() {
        let state = SearchState::default();
        assert_eq!(state.search_query, "Kotlin");
        assert!(state.is_loading);
        assert_eq!(state.selected_tab.index(), 0);
        assert!(state.search_results.is_empty());
        assert!(state.error_message.is_none());
    }

    #[test]
    fn test_detail_defaults() {
        let state = DetailState::default();
        assert!(state.is_loading);
        assert!(!state.is_favorite);
        assert!(state.book.is_none());
    }

    #[test]
    fn test_tab_index_round_trip() {
        assert_eq!(SearchTab::from_index(0), Some(SearchTab::Search));
        assert_eq!(SearchTab::from_index(1), Some(SearchTab::Favorites));
        assert_eq!(SearchTab::from_index(2), None);
        assert_eq!(SearchTab::Favorites.index(), 1);
    }

    #[test]
    fn test_empty_message_per_tab() {
        let mut state = SearchState::new("dune");
        assert_eq!(state.empty_message(), None);

        state.is_loading = false;
        assert_eq!(
            state.empty_message(),
            Some(UiText::Resource(StringResource::NoSearchResults))
        );

        state.selected_tab = SearchTab::Favorites;
        assert_eq!(
            state.empty_message(),
            Some(UiText::Resource(StringResource::NoFavoriteBooks))
        );

        state.favorite_books.push(sample_book("OL1W"));
        assert_eq!(state.empty_message(), None);
    }

    #[test]
    fn test_error_suppresses_empty_message() {
        let mut state = SearchState::new("dune");
        state.is_loading = false;
        state.error_message = Some(UiText::Resource(StringResource::ErrorNoInternet));
        assert_eq!(state.empty_message(), None);
    }

    #[test]
    fn test_action_wire_format() {
        let json = serde_json::to_value(SearchAction::TabSelect(1)).unwrap();
        assert_eq!(json["type"], "tabSelect");
        assert_eq!(json["payload"], 1);

        let back = serde_json::to_value(DetailAction::BackClick).unwrap();
        assert_eq!(back["type"], "backClick");
    }
}
