use std::sync::Arc;

use sqlx::SqlitePool;

use crate::settings::Settings;

/// Shared state handed to every request handler.
///
/// Cloning is cheap: the pool is reference counted and settings sit behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: SqlitePool, settings: Settings) -> Self {
        Self {
            db,
            settings: Arc::new(settings),
        }
    }
}
