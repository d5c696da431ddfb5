pub mod crud;
pub mod models;
pub mod routes;
pub mod schemas;

use async_trait::async_trait;
use axum::Router;
use bookstore_db::{Database, TableSchema};
use bookstore_kernel::{InitCtx, Module};
use utoipa::OpenApi;

/// OpenAPI document for the books routes, relative to the module mount point
#[derive(OpenApi)]
#[openapi(
    paths(
        routes::create_book,
        routes::list_books,
        routes::get_book,
        routes::update_book,
        routes::delete_book
    ),
    components(schemas(schemas::BookCreate, schemas::BookRead, schemas::BookUpdate)),
    tags((name = "Books", description = "Book catalogue CRUD"))
)]
struct BooksApi;

/// Books module: owns the `book` table and the `/api/v1/books` routes
pub struct BooksModule {
    db: Database,
}

impl BooksModule {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.db.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        match serde_json::to_value(BooksApi::openapi()) {
            Ok(doc) => Some(doc),
            Err(err) => {
                tracing::warn!(module = self.name(), error = %err, "failed to render OpenAPI");
                None
            }
        }
    }

    fn tables(&self) -> Vec<TableSchema> {
        vec![models::BOOK_TABLE]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(db: Database) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(db))
}
