use std::str::FromStr;

use bookshelf_kernel::settings::DatabaseSettings;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::DbError;

/// Shared connection pool handed to every module that touches the store.
pub type DbPool = SqlitePool;

/// In-memory databases live inside a single connection.
fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Create the connection pool described by `settings`.
///
/// In-memory URLs are pinned to one connection that is never recycled, so
/// every caller sees the same database for the lifetime of the pool.
pub async fn connect(settings: &DatabaseSettings) -> Result<DbPool, DbError> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .map_err(DbError::Connect)?
        .foreign_keys(true);

    let in_memory = is_in_memory(&settings.url);
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(settings.max_connections.max(1))
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(DbError::Connect)?;

    tracing::info!(
        target: "bookshelf-db",
        in_memory,
        max_connections = pool.options().get_max_connections(),
        "database pool ready"
    );

    Ok(pool)
}

/// Round-trip a trivial statement to prove the store is reachable.
pub async fn ping(pool: &DbPool) -> Result<(), DbError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
