pub mod books;

use bookshelf_db::DbPool;
use bookshelf_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, pool: &DbPool) -> anyhow::Result<()> {
    registry.register_custom(books::create_module(pool.clone())?);
    Ok(())
}
