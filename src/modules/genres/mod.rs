pub mod models;
pub mod routes;
pub mod store;
pub mod views;

use async_trait::async_trait;
use axum::{routing::get, Router};
use bookshelf_kernel::{AppState, InitCtx, Migration, Module};

/// Genre listing and management
pub struct GenresModule;

#[async_trait]
impl Module for GenresModule {
    fn name(&self) -> &'static str {
        "genres"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "genres module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router<AppState> {
        Router::new()
            .route("/get_genres", get(routes::list_genres))
            .route(
                "/add_genre",
                get(routes::add_genre_form).post(routes::add_genre),
            )
            .route(
                "/edit_genre/{id}",
                get(routes::edit_genre_form).post(routes::edit_genre),
            )
            .route("/delete_genre/{id}", get(routes::delete_genre))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE genres (
                    id   INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL CHECK (name != '')
                );
                CREATE INDEX genres_name ON genres(name);
                "#,
        }]
    }
}

/// Create a new instance of the genres module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(GenresModule)
}
