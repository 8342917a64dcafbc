//! Book operations: validate, then make a single store call.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::error::BookError;
use super::models::{Book, BookUpdate};
use super::schema::{is_valid_isbn, BookSchemas};
use super::store::BookStore;

pub struct BookService {
    store: Arc<dyn BookStore>,
    schemas: BookSchemas,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>) -> anyhow::Result<Self> {
        Ok(Self {
            store,
            schemas: BookSchemas::compile()?,
        })
    }

    pub async fn list(&self) -> Result<Vec<Book>, BookError> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, isbn: &str) -> Result<Book, BookError> {
        check_isbn(isbn)?;
        self.store
            .get(isbn)
            .await?
            .ok_or_else(|| BookError::NotFound(isbn.to_string()))
    }

    pub async fn create(&self, payload: Value) -> Result<Book, BookError> {
        let violations = self.schemas.check_create(&payload);
        if !violations.is_empty() {
            return Err(BookError::Validation(violations));
        }
        let book: Book = decode(payload)?;

        match self.store.insert(&book).await {
            Ok(stored) => {
                tracing::info!(isbn = %stored.isbn, "book created");
                Ok(stored)
            }
            Err(e) if e.is_unique_violation() => Err(BookError::Conflict(book.isbn)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update(&self, isbn: &str, payload: Value) -> Result<Book, BookError> {
        check_isbn(isbn)?;
        let violations = self.schemas.check_update(&payload);
        if !violations.is_empty() {
            return Err(BookError::Validation(violations));
        }
        let changes: BookUpdate = decode(payload)?;

        let updated = self
            .store
            .update(isbn, &changes)
            .await?
            .ok_or_else(|| BookError::NotFound(isbn.to_string()))?;
        tracing::info!(%isbn, "book updated");
        Ok(updated)
    }

    pub async fn delete(&self, isbn: &str) -> Result<(), BookError> {
        check_isbn(isbn)?;
        if !self.store.delete(isbn).await? {
            return Err(BookError::NotFound(isbn.to_string()));
        }
        tracing::info!(%isbn, "book deleted");
        Ok(())
    }

    pub async fn health(&self) -> Result<(), BookError> {
        Ok(self.store.ping().await?)
    }
}

fn check_isbn(isbn: &str) -> Result<(), BookError> {
    if is_valid_isbn(isbn) {
        Ok(())
    } else {
        Err(BookError::MalformedIsbn(isbn.to_string()))
    }
}

/// Schema checks cover the Rust types, so a failure here is reported against the body.
fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, BookError> {
    serde_json::from_value(payload)
        .map_err(|e| BookError::Validation(vec![json!({ "field": "body", "error": e.to_string() })]))
}
