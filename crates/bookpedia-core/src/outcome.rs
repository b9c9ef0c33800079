//! # Outcome Helpers
//!
//! Every fallible operation in Bookpedia returns a plain [`Result`] whose
//! error side is one of the taxonomy enums. This module adds the chaining
//! helpers the state machines use on top of it.
//!
//! ```rust
//! use bookpedia_core::{OutcomeExt, RemoteError};
//!
//! let mut seen = Vec::new();
//! let result: Result<u32, RemoteError> = Ok(12);
//! result
//!     .on_success(|n| seen.push(*n))
//!     .on_error(|_| unreachable!());
//! assert_eq!(seen, vec![12]);
//! ```
//!
//! `map` is the standard [`Result::map`]: it only ever touches `Ok` and
//! passes `Err` through unchanged.

/// A result that only carries the success/error signal.
pub type EmptyResult<E> = Result<(), E>;

/// Side-effecting combinators that hand the original result back.
pub trait OutcomeExt<T, E>: Sized {
    /// Runs `action` on the payload if this is `Ok`.
    fn on_success<F: FnOnce(&T)>(self, action: F) -> Self;

    /// Runs `action` on the error if this is `Err`.
    fn on_error<F: FnOnce(&E)>(self, action: F) -> Self;

    /// Drops the payload, keeping only success or the error.
    fn as_empty_data_result(self) -> EmptyResult<E>;
}

impl<T, E> OutcomeExt<T, E> for Result<T, E> {
    fn on_success<F: FnOnce(&T)>(self, action: F) -> Self {
        if let Ok(value) = &self {
            action(value);
        }
        self
    }

    fn on_error<F: FnOnce(&E)>(self, action: F) -> Self {
        if let Err(error) = &self {
            action(error);
        }
        self
    }

    fn as_empty_data_result(self) -> EmptyResult<E> {
        self.map(|_| ())
    }
}
