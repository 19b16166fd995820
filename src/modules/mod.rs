pub mod books;

use std::sync::Arc;

use anyhow::Context;
use bookshelf_db::{Database, DbModule};
use bookshelf_kernel::{settings::StoreBackend, settings::Settings, ModuleRegistry};

use books::repository::{BookRepositoryArc, MemoryBookRepository, MongoBookRepository};

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, repository: BookRepositoryArc) {
    registry.register_custom(books::create_module(repository));
}

/// Open the configured store and return the book repository on top of it.
///
/// For MongoDB the connection is owned by a `db` core module registered here,
/// so it is pinged during boot and closed during shutdown.
pub async fn connect_store(
    settings: &Settings,
    registry: &mut ModuleRegistry,
) -> anyhow::Result<BookRepositoryArc> {
    match settings.database.backend {
        StoreBackend::Mongodb => {
            let database = Database::connect(&settings.database)
                .await
                .context("failed to create document store client")?;
            let repository = MongoBookRepository::new(&database);
            registry.register_core(Arc::new(DbModule::new(database)));
            Ok(Arc::new(repository))
        }
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; records are lost on exit");
            Ok(Arc::new(MemoryBookRepository::new()))
        }
    }
}
