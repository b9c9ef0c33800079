//! # bookpedia-core: Pure Domain Model for Bookpedia
//!
//! This crate holds every type the search/favorites layer and the UI agree
//! on. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bookpedia Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI (external collaborator)                   │   │
//! │  │     reads SearchState / DetailState, dispatches actions         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               bookpedia-sync (machines, repository)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ bookpedia-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   error   │  │   state   │  │   text    │  │   │
//! │  │   │   Book    │  │ DataError │  │SearchState│  │  UiText   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - The `Book` value object
//! - [`error`] - Closed error taxonomy (`RemoteError`, `LocalError`, `DataError`)
//! - [`outcome`] - Chaining helpers on top of `Result`
//! - [`state`] - UI-facing snapshots and actions
//! - [`text`] - Localizable message handles
//! - [`validation`] - Search query classification

pub mod error;
pub mod outcome;
pub mod state;
pub mod text;
pub mod types;
pub mod validation;

pub use error::{DataError, LocalError, RemoteError};
pub use outcome::{EmptyResult, OutcomeExt};
pub use state::{DetailAction, DetailState, SearchAction, SearchState, SearchTab};
pub use text::{StringResource, UiText};
pub use types::Book;

/// Query shown (and searched) when the search screen first opens.
pub const DEFAULT_SEARCH_QUERY: &str = "Kotlin";

/// Shortest query, in characters, that triggers a remote search.
///
/// Exactly one character is a dead zone: nothing is searched and nothing is
/// reset.
pub const MIN_QUERY_CHARS: usize = 2;
