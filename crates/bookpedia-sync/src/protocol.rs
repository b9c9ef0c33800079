//! # Catalog Wire Protocol
//!
//! Response shapes of the Open Library API and their mapping to [`Book`].
//!
//! ## Search Document → Book
//! ```text
//! ┌───────────────────────────────┬──────────────────────────────────────────┐
//! │ SearchedBookDto               │ Book                                     │
//! ├───────────────────────────────┼──────────────────────────────────────────┤
//! │ key "/works/OL45804W"         │ id "OL45804W"                            │
//! │ cover_edition_key "OL7353617M"│ {covers}/b/olid/OL7353617M-L.jpg         │
//! │ cover_i 258027                │ {covers}/b/id/258027-L.jpg  (fallback)   │
//! │ author_name                   │ authors (empty if absent)                │
//! │ language                      │ languages (empty if absent)              │
//! │ first_publish_year 1970       │ first_publish_year "1970"                │
//! │ number_of_pages_median        │ num_pages                                │
//! │ edition_count                 │ num_editions (0 if absent)               │
//! └───────────────────────────────┴──────────────────────────────────────────┘
//! ```
//!
//! ## Work Description Quirk
//! `/works/{id}.json` returns the description either as a bare string or
//! wrapped as `{"type": "/type/text", "value": "..."}`. Both normalize to a
//! plain `Option<String>` during deserialization.

use serde::{Deserialize, Deserializer, Serialize};

use bookpedia_core::Book;

/// Fields requested from `/search.json`.
pub const SEARCH_FIELDS: &str = "key,title,author_name,author_key,cover_edition_key,cover_i,\
ratings_average,ratings_count,first_publish_year,language,number_of_pages_median,edition_count";

// =============================================================================
// Search
// =============================================================================

/// Body of `GET /search.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponseDto {
    #[serde(default)]
    pub docs: Vec<SearchedBookDto>,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchedBookDto {
    /// Work key, e.g. `/works/OL45804W`.
    pub key: String,

    #[serde(default)]
    pub title: String,

    pub author_name: Option<Vec<String>>,
    pub author_key: Option<Vec<String>>,
    pub cover_edition_key: Option<String>,
    pub cover_i: Option<i64>,
    pub ratings_average: Option<f64>,
    pub ratings_count: Option<u32>,
    pub first_publish_year: Option<i32>,
    pub language: Option<Vec<String>>,
    pub number_of_pages_median: Option<u32>,
    pub edition_count: Option<u32>,
}

impl SearchedBookDto {
    /// Maps this hit to a domain book. Covers are served from `covers_url`.
    pub fn to_book(&self, covers_url: &str) -> Book {
        Book {
            id: work_id(&self.key).to_string(),
            title: self.title.clone(),
            cover_image_url: self.cover_url(covers_url),
            authors: self.author_name.clone().unwrap_or_default(),
            description: None,
            languages: self.language.clone().unwrap_or_default(),
            first_publish_year: self.first_publish_year.map(|year| year.to_string()),
            average_rating: self.ratings_average,
            rating_count: self.ratings_count,
            num_pages: self.number_of_pages_median,
            num_editions: self.edition_count.unwrap_or(0),
        }
    }

    fn cover_url(&self, covers_url: &str) -> String {
        let host = covers_url.trim_end_matches('/');
        match (&self.cover_edition_key, self.cover_i) {
            (Some(edition), _) => format!("{}/b/olid/{}-L.jpg", host, edition),
            (None, Some(id)) => format!("{}/b/id/{}-L.jpg", host, id),
            (None, None) => String::new(),
        }
    }
}

/// Strips everything up to the last `/` from a catalog key.
pub fn work_id(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

// =============================================================================
// Work Details
// =============================================================================

/// Body of `GET /works/{id}.json`, reduced to what the app reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookWorkDto {
    #[serde(default, deserialize_with = "normalize_description")]
    pub description: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptionShape {
    Plain(String),
    Wrapped { value: String },
}

fn normalize_description<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let shape = Option::<DescriptionShape>::deserialize(deserializer)?;
    Ok(shape.map(|shape| match shape {
        DescriptionShape::Plain(text) => text,
        DescriptionShape::Wrapped { value } => value,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COVERS: &str = "https://covers.openlibrary.org";

    fn doc(json: &str) -> SearchedBookDto {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_full_mapping() {
        let dto = doc(r#"{
            "key": "/works/OL45804W",
            "title": "Fantastic Mr Fox",
            "author_name": ["Roald Dahl"],
            "author_key": ["OL34184A"],
            "cover_edition_key": "OL7353617M",
            "cover_i": 6498519,
            "ratings_average": 4.1,
            "ratings_count": 212,
            "first_publish_year": 1970,
            "language": ["eng", "fre"],
            "number_of_pages_median": 96,
            "edition_count": 74
        }"#);

        let book = dto.to_book(COVERS);
        assert_eq!(book.id, "OL45804W");
        assert_eq!(book.title, "Fantastic Mr Fox");
        assert_eq!(
            book.cover_image_url,
            "https://covers.openlibrary.org/b/olid/OL7353617M-L.jpg"
        );
        assert_eq!(book.authors, vec!["Roald Dahl".to_string()]);
        assert_eq!(book.languages.len(), 2);
        assert_eq!(book.first_publish_year.as_deref(), Some("1970"));
        assert_eq!(book.rating_count, Some(212));
        assert_eq!(book.num_pages, Some(96));
        assert_eq!(book.num_editions, 74);
        assert_eq!(book.description, None);
    }

    #[test]
    fn test_sparse_document_defaults() {
        let book = doc(r#"{"key": "/works/OL1W", "title": "Untitled"}"#).to_book(COVERS);
        assert_eq!(book.cover_image_url, "");
        assert!(book.authors.is_empty());
        assert!(book.languages.is_empty());
        assert_eq!(book.first_publish_year, None);
        assert_eq!(book.num_editions, 0);
    }

    #[test]
    fn test_cover_falls_back_to_numeric_id() {
        let book = doc(r#"{"key": "/works/OL2W", "title": "T", "cover_i": 42}"#)
            .to_book("https://covers.example/");
        assert_eq!(book.cover_image_url, "https://covers.example/b/id/42-L.jpg");
    }

    #[test]
    fn test_work_id() {
        assert_eq!(work_id("/works/OL45804W"), "OL45804W");
        assert_eq!(work_id("OL45804W"), "OL45804W");
    }

    #[test]
    fn test_description_shapes() {
        let plain: BookWorkDto = serde_json::from_str(r#"{"description": "A fox."}"#).unwrap();
        assert_eq!(plain.description.as_deref(), Some("A fox."));

        let wrapped: BookWorkDto = serde_json::from_str(
            r#"{"description": {"type": "/type/text", "value": "A fox."}}"#,
        )
        .unwrap();
        assert_eq!(wrapped.description.as_deref(), Some("A fox."));

        let absent: BookWorkDto = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(absent.description, None);

        let null: BookWorkDto = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(null.description, None);
    }

    #[test]
    fn test_unknown_description_shape_fails() {
        assert!(serde_json::from_str::<BookWorkDto>(r#"{"description": 12}"#).is_err());
    }

    #[test]
    fn test_search_response_without_docs() {
        let response: SearchResponseDto = serde_json::from_str(r#"{"numFound": 0}"#).unwrap();
        assert!(response.docs.is_empty());
    }
}
