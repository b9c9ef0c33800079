//! # Storage Models
//!
//! `FavoriteRecord` is a `Book` flattened into one `favorite_books` row.
//!
//! ```text
//! Book.authors   ["Ursula K. Le Guin"]   ──►  authors   TEXT '["Ursula K. Le Guin"]'
//! Book.languages ["eng","spa"]           ──►  languages TEXT '["eng","spa"]'
//! ```

use bookpedia_core::Book;
use serde::{Deserialize, Serialize};

use crate::error::DbResult;

/// One row of the `favorite_books` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FavoriteRecord {
    pub id: String,
    pub title: String,
    pub cover_image_url: String,
    /// JSON array text.
    pub authors: String,
    pub description: Option<String>,
    /// JSON array text.
    pub languages: String,
    pub first_publish_year: Option<String>,
    pub average_rating: Option<f64>,
    pub rating_count: Option<u32>,
    pub num_pages: Option<u32>,
    pub num_editions: u32,
}

impl FavoriteRecord {
    /// Flattens a book for storage.
    pub fn from_book(book: &Book) -> DbResult<Self> {
        Ok(FavoriteRecord {
            id: book.id.clone(),
            title: book.title.clone(),
            cover_image_url: book.cover_image_url.clone(),
            authors: encode_list(&book.authors)?,
            description: book.description.clone(),
            languages: encode_list(&book.languages)?,
            first_publish_year: book.first_publish_year.clone(),
            average_rating: book.average_rating,
            rating_count: book.rating_count,
            num_pages: book.num_pages,
            num_editions: book.num_editions,
        })
    }

    /// Rebuilds the domain book.
    pub fn to_book(&self) -> DbResult<Book> {
        Ok(Book {
            id: self.id.clone(),
            title: self.title.clone(),
            cover_image_url: self.cover_image_url.clone(),
            authors: decode_list(&self.authors)?,
            description: self.description.clone(),
            languages: decode_list(&self.languages)?,
            first_publish_year: self.first_publish_year.clone(),
            average_rating: self.average_rating,
            rating_count: self.rating_count,
            num_pages: self.num_pages,
            num_editions: self.num_editions,
        })
    }
}

/// Encodes a list column as a JSON array.
pub fn encode_list(values: &[String]) -> DbResult<String> {
    Ok(serde_json::to_string(values)?)
}

/// Decodes a JSON array list column. An empty column reads as an empty list.
pub fn decode_list(text: &str) -> DbResult<Vec<String>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
pub(crate) fn sample_record(id: &str) -> FavoriteRecord {
    FavoriteRecord {
        id: id.to_string(),
        title: format!("Title {}", id),
        cover_image_url: format!("https://covers.openlibrary.org/b/id/{}-L.jpg", id),
        authors: r#"["Frank Herbert"]"#.to_string(),
        description: None,
        languages: r#"["eng"]"#.to_string(),
        first_publish_year: Some("1965".to_string()),
        average_rating: Some(4.3),
        rating_count: Some(1200),
        num_pages: Some(412),
        num_editions: 9,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;

    #[test]
    fn test_list_columns_are_json_arrays() {
        let encoded = encode_list(&["Neil Gaiman".into(), "Terry \"Pterry\" Pratchett".into()])
            .unwrap();
        assert_eq!(encoded, r#"["Neil Gaiman","Terry \"Pterry\" Pratchett"]"#);
        assert_eq!(encode_list(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_decode_tolerates_empty_column() {
        assert!(decode_list("").unwrap().is_empty());
        assert!(matches!(decode_list("eng,fre"), Err(DbError::Serialization(_))));
    }

    #[test]
    fn test_record_preserves_book() {
        let record = sample_record("OL1W");
        let book = record.to_book().unwrap();
        assert_eq!(book.authors, vec!["Frank Herbert".to_string()]);
        assert_eq!(book.languages, vec!["eng".to_string()]);

        let back = FavoriteRecord::from_book(&book).unwrap();
        assert_eq!(back, record);
    }
}
