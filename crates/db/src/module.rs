use async_trait::async_trait;
use bookshelf_kernel::{InitCtx, Module};

use crate::connection::{ping, DbPool};

/// Core module owning the connection pool lifecycle.
///
/// The pool is created before the registry is built; this module verifies it
/// on init and closes it on stop, after every custom module has stopped.
pub struct DbModule {
    pool: DbPool,
}

impl DbModule {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Module for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        ping(&self.pool).await?;
        tracing::info!(module = self.name(), "database reachable");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.pool.close().await;
        tracing::info!(module = self.name(), "database pool closed");
        Ok(())
    }
}
