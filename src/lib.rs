//! Bookshelf application library
//!
//! Wires the catalog, genre and account modules into the kernel registry and
//! drives the startup sequence: connect, migrate, init, start, serve, stop.

pub mod error;
pub mod modules;
pub mod utils;
pub mod views;

use anyhow::Context;
use bookshelf_kernel::{settings::Settings, AppState, InitCtx, ModuleRegistry};

/// Registry with every bookshelf module registered
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

/// Connect to the database, apply pending migrations, then init and start every module.
pub async fn prepare(settings: Settings) -> anyhow::Result<(ModuleRegistry, AppState)> {
    let registry = registry();

    let db = bookshelf_db::connect(&settings.database)
        .await
        .context("failed to connect to the database")?;
    let applied = bookshelf_db::run_migrations(&db, &registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;
    tracing::info!(applied, "database ready");

    let ctx = InitCtx {
        settings: &settings,
        db: &db,
    };
    registry.init_core_modules(&ctx).await?;
    registry.init_custom_modules(&ctx).await?;
    registry.start_core_modules(&ctx).await?;
    registry.start_custom_modules(&ctx).await?;

    Ok((registry, AppState::new(db, settings)))
}

/// Serve HTTP until a shutdown signal, then stop modules in reverse order.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        database = %settings.database.url,
        "bookshelf starting"
    );
    if settings.is_production() && !settings.auth.secure_cookies {
        tracing::warn!("session cookies are not marked Secure in production");
    }

    let (registry, state) = prepare(settings).await?;
    let served = bookshelf_http::start_server(&registry, state).await;

    registry.stop_custom_modules().await?;
    registry.stop_core_modules().await?;
    served
}

/// Apply pending migrations and exit.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let db = bookshelf_db::connect(&settings.database)
        .await
        .context("failed to connect to the database")?;
    let applied = bookshelf_db::run_migrations(&db, &registry().collect_migrations())
        .await
        .context("failed to apply migrations")?;
    db.close().await;
    Ok(applied)
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::Body,
        http::{header, Request},
        response::Response,
        Router,
    };
    use bookshelf_kernel::{
        settings::{DatabaseSettings, Settings},
        AppState,
    };
    use sqlx::SqlitePool;
    use tower::ServiceExt;

    use crate::modules::books::models::{BookDraft, Upvote};

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.database = DatabaseSettings::in_memory();
        settings.auth.password_hash_rounds = 1;
        settings
    }

    /// Fresh in-memory database with every module's migrations applied
    pub async fn test_pool() -> SqlitePool {
        bookshelf_db::connect_in_memory(&super::registry().collect_migrations())
            .await
            .unwrap()
    }

    pub async fn test_app() -> (Router, AppState) {
        let state = AppState::new(test_pool().await, settings());
        let app = bookshelf_http::build_router(&super::registry(), state.clone());
        (app, state)
    }

    /// Register `username` and return a `Cookie` header value for a fresh session.
    pub async fn login_cookie(state: &AppState, username: &str) -> String {
        bookshelf_authz::UserStore::new(
            state.db.clone(),
            bookshelf_authz::PasswordHasher::new(1),
        )
        .register(username, "password")
        .await
        .unwrap();
        let cookie = bookshelf_authz::identity::start_session(state, username)
            .await
            .unwrap()
            .unwrap();
        cookie
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    pub async fn get(app: &Router, path: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::get(path);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        app.clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_form(app: &Router, path: &str, body: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        app.clone()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    pub async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub fn draft(title: &str) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            author: "Anonymous".to_string(),
            genre_name: "Fiction".to_string(),
            image_url: String::new(),
            description: String::new(),
            buy_url: String::new(),
            is_upvoted: Upvote::Off,
        }
    }
}
