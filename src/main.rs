use anyhow::Context;
use bookshelf_app::modules;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "bookshelf bootstrap starting"
    );

    let mut registry = ModuleRegistry::new();
    let repository = modules::connect_store(&settings, &mut registry).await?;
    modules::register_all(&mut registry, repository);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.boot(&ctx).await?;
    tracing::info!("bookshelf bootstrap complete");

    let served = bookshelf_http::start_server(&registry, &settings).await;

    registry.shutdown().await?;
    served
}
