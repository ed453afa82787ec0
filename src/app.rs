//! Startup sequence: connect, register modules, initialize, migrate, serve.

use anyhow::Context;
use bookstore_db::{migrate as db_migrate, Database};
use bookstore_kernel::settings::Settings;
use bookstore_kernel::{InitCtx, ModuleRegistry};

use crate::modules;

/// Registry holding every feature module of the application
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

/// Open the configured database.
pub async fn connect(settings: &Settings) -> anyhow::Result<Database> {
    Database::connect(&settings.database.url, settings.database.max_connections)
        .await
        .with_context(|| format!("failed to connect to database '{}'", settings.database.url))
}

/// Initialize every module and apply pending migrations.
///
/// Returns the number of migrations applied.
pub async fn prepare(registry: &ModuleRegistry, ctx: &InitCtx<'_>) -> anyhow::Result<usize> {
    registry.init_all(ctx).await?;

    let migrations = registry.collect_migrations();
    let applied = db_migrate::run(ctx.db, &migrations)
        .await
        .context("failed to apply migrations")?;

    tracing::info!(
        applied,
        known = migrations.len(),
        "database schema up to date"
    );
    Ok(applied)
}

/// Connect and apply pending migrations without serving traffic.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let db = connect(settings).await?;
    let registry = registry();
    let ctx = InitCtx {
        settings,
        db: &db,
    };

    let applied = prepare(&registry, &ctx).await;
    db.close().await;
    applied
}

/// Run the HTTP service until a shutdown signal arrives.
pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let db = connect(settings).await?;
    let registry = registry();
    let ctx = InitCtx {
        settings,
        db: &db,
    };

    prepare(&registry, &ctx).await?;
    registry.start_all(&ctx).await?;

    let served = bookstore_http::start_server(&registry, &ctx).await;

    registry.stop_all().await?;
    db.close().await;

    tracing::info!("bookstore-app shutdown complete");
    served
}
