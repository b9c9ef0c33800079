//! # Domain Types
//!
//! ## Book
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Book                                          │
//! │  ─────────────────────────────────────────────────────────────────────  │
//! │  id                  "OL45804W" (catalog work key, stable)              │
//! │  title               "Fantastic Mr Fox"                                 │
//! │  cover_image_url     https://covers.openlibrary.org/b/olid/...-L.jpg   │
//! │  authors             ["Roald Dahl"]                                     │
//! │  description         None until fetched                                 │
//! │  languages           ["eng", "fre"]                                     │
//! │  first_publish_year  Some("1970")                                       │
//! │  average_rating      Some(4.1)                                          │
//! │  rating_count        Some(212)                                          │
//! │  num_pages           Some(96)                                           │
//! │  num_editions        74                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `Book` is rebuilt on every fetch and never mutated in place; updates
//! go through [`Book::with_description`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A book as the UI and the repository see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Catalog work key without the `/works/` prefix.
    pub id: String,

    pub title: String,

    /// Large cover image, empty when the catalog has no cover.
    pub cover_image_url: String,

    /// Author names in catalog order.
    pub authors: Vec<String>,

    /// `None` means "not fetched yet", not "has no description".
    pub description: Option<String>,

    pub languages: Vec<String>,

    pub first_publish_year: Option<String>,

    pub average_rating: Option<f64>,

    pub rating_count: Option<u32>,

    /// Median page count across editions.
    pub num_pages: Option<u32>,

    pub num_editions: u32,
}

impl Book {
    /// Returns a copy carrying the given description.
    pub fn with_description(&self, description: Option<String>) -> Book {
        Book {
            description,
            ..self.clone()
        }
    }

    /// Authors joined for display, e.g. `"Terry Pratchett, Neil Gaiman"`.
    pub fn authors_line(&self) -> String {
        self.authors.join(", ")
    }

    /// Rating rounded to one decimal, if the catalog has one.
    pub fn rating_label(&self) -> Option<String> {
        self.average_rating.map(|r| format!("{:.1}", r))
    }
}

#[cfg(test)]
pub(crate) fn sample_book(id: &str) -> Book {
    Book {
        id: id.to_string(),
        title: format!("Book {}", id),
        cover_image_url: String::new(),
        authors: vec!["Jane Doe".to_string()],
        description: None,
        languages: vec!["eng".to_string()],
        first_publish_year: Some("1999".to_string()),
        average_rating: Some(4.25),
        rating_count: Some(10),
        num_pages: Some(320),
        num_editions: 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_description_leaves_original_untouched() {
        let book = sample_book("OL1W");
        let described = book.with_description(Some("A tale".into()));

        assert_eq!(book.description, None);
        assert_eq!(described.description.as_deref(), Some("A tale"));
        assert_eq!(described.id, book.id);
    }

    #[test]
    fn test_display_helpers() {
        let mut book = sample_book("OL1W");
        book.authors.push("John Roe".into());
        assert_eq!(book.authors_line(), "Jane Doe, John Roe");
        assert_eq!(book.rating_label().as_deref(), Some("4.2"));
    }

    #[test]
    fn test_camel_case_wire_format() {
        let json = serde_json::to_value(sample_book("OL1W")).unwrap();
        assert!(json.get("coverImageUrl").is_some());
        assert!(json.get("numEditions").is_some());
    }
}
