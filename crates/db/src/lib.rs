//! SQLite access for bookshelf.
//!
//! - `connect` builds the shared connection pool from `DatabaseSettings`.
//! - `apply_migrations` runs module migrations once each, tracked in `_migrations`.
//! - `DbError` classifies driver failures so callers can tell a uniqueness
//!   violation apart from an unavailable store.
//! - `DbModule` ties the pool to the module lifecycle and closes it on stop.

pub mod connection;
pub mod error;
pub mod migrations;
pub mod module;

pub use connection::{connect, ping, DbPool};
pub use error::DbError;
pub use migrations::apply_migrations;
pub use module::DbModule;
