//! BookStore application library
//!
//! Wires the books module into the kernel, the database, and the HTTP server.

pub mod modules;

use anyhow::Context;
use axum::Router;
use bookstore_db::{schema, Database, DbConfig};
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// A bootstrapped application: connected pool, registered modules, tables created.
pub struct App {
    pub settings: Settings,
    pub db: Database,
    pub registry: ModuleRegistry,
}

/// Connect to the store, register modules, install the table registry and
/// create the tables.
pub async fn bootstrap(settings: Settings) -> anyhow::Result<App> {
    let db = Database::connect(&DbConfig::from(&settings.database))
        .await
        .context("failed to connect to the database")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &db);

    let tables = schema::install(registry.collect_tables())
        .context("failed to install table registry")?;
    tables
        .create_all(&db)
        .await
        .context("failed to create tables")?;

    Ok(App {
        settings,
        db,
        registry,
    })
}

impl App {
    /// Router with every module mounted and middleware applied
    pub fn router(&self) -> Router {
        bookstore_http::build_router(&self.registry, &self.settings, &self.db)
    }

    /// Run module `init` and `start` hooks
    pub async fn start(&self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
            db: &self.db,
        };
        self.registry.init_modules(&ctx).await?;
        self.registry.start_modules(&ctx).await
    }

    /// Start modules, serve HTTP until shutdown, then stop modules and close the pool
    pub async fn serve(self) -> anyhow::Result<()> {
        self.start().await?;

        let served =
            bookstore_http::start_server(&self.registry, &self.settings, &self.db).await;

        let stopped = self.registry.stop_modules().await;
        self.db.close().await;

        served?;
        stopped
    }
}

/// Bootstrap and serve
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "bookstore bootstrap starting"
    );

    let app = bootstrap(settings).await?;

    tracing::info!(
        modules = app.registry.module_count(),
        "bookstore bootstrap complete"
    );

    app.serve().await
}
