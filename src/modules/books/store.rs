//! Persistence for books.

use async_trait::async_trait;
use bookshelf_db::{DbError, DbPool};
use bookshelf_kernel::Migration;

use super::models::{Book, BookUpdate};

pub const MIGRATIONS: &[Migration] = &[Migration {
    id: "001_create_books",
    up: r#"
        CREATE TABLE IF NOT EXISTS books (
            isbn       TEXT    PRIMARY KEY NOT NULL,
            amazon_url TEXT    NOT NULL,
            author     TEXT    NOT NULL,
            language   TEXT    NOT NULL,
            pages      INTEGER NOT NULL CHECK (pages >= 1),
            publisher  TEXT    NOT NULL,
            title      TEXT    NOT NULL,
            year       INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS books_title_idx ON books (title);
        "#,
}];

const COLUMNS: &str = "isbn, amazon_url, author, language, pages, publisher, title, year";

/// Storage operations for the books table.
///
/// Lookups that miss return `None`/`false`; turning that into a not-found
/// response is the caller's job.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books by title, then insertion order.
    async fn list(&self) -> Result<Vec<Book>, DbError>;

    async fn get(&self, isbn: &str) -> Result<Option<Book>, DbError>;

    /// Insert a new row. A taken isbn fails with `DbError::UniqueViolation`.
    async fn insert(&self, book: &Book) -> Result<Book, DbError>;

    async fn update(&self, isbn: &str, changes: &BookUpdate) -> Result<Option<Book>, DbError>;

    /// Returns true if the book existed and was deleted.
    async fn delete(&self, isbn: &str) -> Result<bool, DbError>;

    async fn ping(&self) -> Result<(), DbError>;
}

/// `BookStore` backed by the shared SQLite pool.
#[derive(Clone)]
pub struct SqlBookStore {
    pool: DbPool,
}

impl SqlBookStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for SqlBookStore {
    async fn list(&self) -> Result<Vec<Book>, DbError> {
        let sql = format!("SELECT {COLUMNS} FROM books ORDER BY title ASC, rowid ASC");
        let books = sqlx::query_as::<_, Book>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn get(&self, isbn: &str) -> Result<Option<Book>, DbError> {
        let sql = format!("SELECT {COLUMNS} FROM books WHERE isbn = ?");
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn insert(&self, book: &Book) -> Result<Book, DbError> {
        let sql = format!(
            "INSERT INTO books ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        );
        let stored = sqlx::query_as::<_, Book>(&sql)
            .bind(book.isbn.as_str())
            .bind(book.amazon_url.as_str())
            .bind(book.author.as_str())
            .bind(book.language.as_str())
            .bind(book.pages)
            .bind(book.publisher.as_str())
            .bind(book.title.as_str())
            .bind(book.year)
            .fetch_one(&self.pool)
            .await?;
        Ok(stored)
    }

    async fn update(&self, isbn: &str, changes: &BookUpdate) -> Result<Option<Book>, DbError> {
        let sql = format!(
            "UPDATE books SET \
                amazon_url = COALESCE(?, amazon_url), \
                author = ?, \
                language = ?, \
                pages = ?, \
                publisher = COALESCE(?, publisher), \
                title = ?, \
                year = ? \
             WHERE isbn = ? \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Book>(&sql)
            .bind(changes.amazon_url.as_deref())
            .bind(changes.author.as_str())
            .bind(changes.language.as_str())
            .bind(changes.pages)
            .bind(changes.publisher.as_deref())
            .bind(changes.title.as_str())
            .bind(changes.year)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete(&self, isbn: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = ?")
            .bind(isbn)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DbError> {
        bookshelf_db::ping(&self.pool).await
    }
}
