//! Migration runner.
//!
//! Applies the `(module, Migration)` list collected by the module registry.
//! Each migration runs in its own transaction together with the row that
//! records it, so a failed migration leaves no trace and is retried next run.

use bookshelf_kernel::Migration;

use crate::connection::DbPool;
use crate::error::DbError;

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    )
"#;

/// Apply every migration that has not been recorded yet.
///
/// Returns the number of migrations applied by this call.
pub async fn apply_migrations(
    pool: &DbPool,
    migrations: &[(String, Migration)],
) -> Result<usize, DbError> {
    sqlx::query(MIGRATIONS_TABLE).execute(pool).await?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let done: Option<(String,)> =
            sqlx::query_as("SELECT id FROM _migrations WHERE module = ? AND id = ?")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(pool)
                .await?;
        if done.is_some() {
            tracing::debug!(target: "bookshelf-db", %module, id = migration.id, "migration already applied");
            continue;
        }

        let fail = |source: sqlx::Error| DbError::Migration {
            module: module.clone(),
            id: migration.id.to_string(),
            source,
        };

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .map_err(fail)?;
        sqlx::query("INSERT INTO _migrations (module, id) VALUES (?, ?)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await
            .map_err(fail)?;
        tx.commit().await.map_err(fail)?;

        tracing::info!(target: "bookshelf-db", %module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}
