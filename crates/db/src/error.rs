//! Database error types.

use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// The pool could not be created or the URL is malformed.
    #[error("failed to connect to database")]
    Connect(#[source] sqlx::Error),

    /// A module migration failed to apply.
    #[error("migration {module}/{id} failed")]
    Migration {
        module: String,
        id: String,
        #[source]
        source: sqlx::Error,
    },

    /// A row collided with an existing primary key or unique index.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Any other driver failure.
    #[error("query failed")]
    Query(#[source] sqlx::Error),
}

impl DbError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation(_))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::UniqueViolation(db_err.message().to_string())
            }
            _ => DbError::Query(err),
        }
    }
}
