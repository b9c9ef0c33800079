//! # Query Classification
//!
//! Decides what a settled search query should do.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  "   "      → Blank       restore cached results, clear error │
//! │  "k"        → TooShort    nothing at all                      │
//! │  "ko"       → Searchable  cancel in-flight, search again      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bookpedia_core::validation::{classify_query, QueryKind};
//!
//! assert_eq!(classify_query("", 2), QueryKind::Blank);
//! assert_eq!(classify_query("d", 2), QueryKind::TooShort);
//! assert_eq!(classify_query("dune", 2), QueryKind::Searchable);
//! ```

/// What the search pipeline does with a settled query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Empty or whitespace only.
    Blank,
    /// Non-blank but shorter than the minimum. Leaves state untouched.
    TooShort,
    /// Long enough to hit the catalog.
    Searchable,
}

/// Classifies `query` against `min_chars`.
///
/// Length is counted in characters, not bytes, on the raw (untrimmed)
/// value, so `"é"` is one character and `" a"` is two.
pub fn classify_query(query: &str, min_chars: usize) -> QueryKind {
    if query.trim().is_empty() {
        return QueryKind::Blank;
    }

    if query.chars().count() >= min_chars {
        QueryKind::Searchable
    } else {
        QueryKind::TooShort
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MIN_QUERY_CHARS;

    #[test]
    fn test_blank_queries() {
        assert_eq!(classify_query("", MIN_QUERY_CHARS), QueryKind::Blank);
        assert_eq!(classify_query("   ", MIN_QUERY_CHARS), QueryKind::Blank);
        assert_eq!(classify_query("\t\n", MIN_QUERY_CHARS), QueryKind::Blank);
    }

    #[test]
    fn test_single_char_dead_zone() {
        assert_eq!(classify_query("k", MIN_QUERY_CHARS), QueryKind::TooShort);
        assert_eq!(classify_query("é", MIN_QUERY_CHARS), QueryKind::TooShort);
    }

    #[test]
    fn test_searchable() {
        assert_eq!(classify_query("ko", MIN_QUERY_CHARS), QueryKind::Searchable);
        assert_eq!(classify_query("éé", MIN_QUERY_CHARS), QueryKind::Searchable);
        assert_eq!(classify_query("Kotlin", MIN_QUERY_CHARS), QueryKind::Searchable);
    }

    #[test]
    fn test_custom_minimum() {
        assert_eq!(classify_query("abc", 4), QueryKind::TooShort);
        assert_eq!(classify_query("a", 1), QueryKind::Searchable);
    }
}
