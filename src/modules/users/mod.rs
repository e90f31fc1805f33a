//! Account pages. The tables and session handling live in the `authz` core module.

pub mod models;
pub mod routes;
pub mod views;

use async_trait::async_trait;
use axum::{routing::get, Router};
use bookshelf_kernel::{AppState, Module};

pub struct UsersModule;

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    fn routes(&self) -> Router<AppState> {
        Router::new()
            .route(
                "/register",
                get(routes::register_form).post(routes::register),
            )
            .route("/login", get(routes::login_form).post(routes::login))
            .route("/logout", get(routes::logout))
            .route("/profile/{username}", get(routes::profile))
    }
}

/// Create a new instance of the users module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(UsersModule)
}
