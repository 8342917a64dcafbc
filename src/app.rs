//! Application bootstrap.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use bookshelf_db::{DbModule, DbPool};
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// A fully initialised application: modules migrated, initialised and started.
pub struct App {
    pub settings: Settings,
    pub pool: DbPool,
    pub registry: ModuleRegistry,
}

impl App {
    /// The complete HTTP router, middleware included.
    pub fn router(&self) -> Router {
        bookshelf_http::build_router(&self.registry, &self.settings)
    }

    /// Stop every module; the pool is closed last.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.registry.stop_all().await
    }
}

/// Register the core `db` module and every project module around `pool`.
pub fn build_registry(pool: &DbPool) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    registry.register_core(Arc::new(DbModule::new(pool.clone())));
    modules::register_all(&mut registry, pool)?;
    Ok(registry)
}

/// Connect to the store, run migrations (unless disabled), and bring every
/// module up.
pub async fn bootstrap(settings: Settings) -> anyhow::Result<App> {
    tracing::info!(
        env = settings.environment.as_str(),
        db = %settings.database.url,
        "bookshelf bootstrap starting"
    );

    let pool = bookshelf_db::connect(&settings.database)
        .await
        .context("failed to open database pool")?;
    let registry = build_registry(&pool)?;

    if settings.database.run_migrations {
        let applied = bookshelf_db::apply_migrations(&pool, &registry.collect_migrations())
            .await
            .context("failed to apply migrations")?;
        tracing::info!(applied, "migrations complete");
    }

    {
        let ctx = InitCtx {
            settings: &settings,
        };
        registry.init_all(&ctx).await?;
        registry.start_all(&ctx).await?;
    }

    tracing::info!(
        core = registry.core_module_count(),
        custom = registry.custom_module_count(),
        "bookshelf bootstrap complete"
    );

    Ok(App {
        settings,
        pool,
        registry,
    })
}

/// Run the HTTP server until shutdown, then stop every module.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let app = bootstrap(settings).await?;
    let served = bookshelf_http::start_server(&app.registry, &app.settings).await;
    let stopped = app.shutdown().await;
    served.and(stopped)
}

/// Apply pending migrations and return how many ran.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let pool = bookshelf_db::connect(&settings.database)
        .await
        .context("failed to open database pool")?;
    let registry = build_registry(&pool)?;
    let applied = bookshelf_db::apply_migrations(&pool, &registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;
    pool.close().await;
    Ok(applied)
}
