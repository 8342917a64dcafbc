use serde::{Deserialize, Serialize};

/// A catalogued book, keyed by ISBN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Primary key; never changes after creation
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    /// Page count, at least 1
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    pub year: i32,
}

/// Replacement values for an existing book.
///
/// `amazon_url` and `publisher` are optional; when absent the stored value is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookUpdate {
    #[serde(default)]
    pub amazon_url: Option<String>,
    pub author: String,
    pub language: String,
    pub pages: i32,
    #[serde(default)]
    pub publisher: Option<String>,
    pub title: String,
    pub year: i32,
}

/// `{ "book": Book }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookResponse {
    pub book: Book,
}

/// `{ "books": [Book, ...] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookList {
    pub books: Vec<Book>,
}

/// `{ "message": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}
