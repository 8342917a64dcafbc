use bookshelf_db::DbError;
use bookshelf_http::error::AppError;
use serde_json::{json, Value};
use thiserror::Error;

use super::schema::MAX_ISBN_LEN;

/// Failures of the book operations.
#[derive(Debug, Error)]
pub enum BookError {
    /// Payload rejected before touching the store; one entry per violation.
    #[error("book payload failed validation ({} problems)", .0.len())]
    Validation(Vec<Value>),

    #[error("malformed isbn '{0}'")]
    MalformedIsbn(String),

    #[error("isbn not found: {0}")]
    NotFound(String),

    #[error("isbn already exists: {0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] DbError),
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Validation(details) => AppError::validation(details, "invalid book payload"),
            BookError::MalformedIsbn(isbn) => AppError::bad_request(format!(
                "malformed isbn '{}': expected 1-{} characters",
                isbn, MAX_ISBN_LEN
            )),
            BookError::NotFound(_) => AppError::not_found("isbn not found"),
            BookError::Conflict(isbn) => AppError::conflict(
                vec![json!({ "field": "isbn", "error": "already exists", "value": isbn })],
                "a book with this isbn already exists",
            ),
            BookError::Store(e) => AppError::Internal(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn maps_to_http_statuses() {
        let cases = [
            (BookError::Validation(vec![]), StatusCode::BAD_REQUEST),
            (BookError::MalformedIsbn("abc".into()), StatusCode::BAD_REQUEST),
            (BookError::NotFound("1".into()), StatusCode::NOT_FOUND),
            (BookError::Conflict("1".into()), StatusCode::CONFLICT),
            (
                BookError::Store(DbError::Query(sqlx::Error::PoolClosed)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }
}
