//! SQLite connection pool factory and migration runner.
//!
//! Modules contribute [`Migration`]s through the kernel registry; this crate applies
//! them once each and records what ran in `schema_migrations`.

use std::str::FromStr;
use std::time::Duration;

use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::Migration;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

pub type Result<T> = std::result::Result<T, DbError>;

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT (datetime('now')),
        PRIMARY KEY (module, id)
    )
"#;

/// Open a connection pool for the configured database.
///
/// In-memory databases are private to a connection, so they are pinned to a single
/// connection that never expires.
pub async fn connect(settings: &DatabaseSettings) -> Result<SqlitePool> {
    info!(
        database_url = %settings.url,
        max_connections = settings.max_connections,
        "creating database connection pool"
    );

    let mut options = SqliteConnectOptions::from_str(&settings.url)?
        .foreign_keys(true)
        .create_if_missing(true);

    let mut pool_options =
        SqlitePoolOptions::new().acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms));

    if settings.is_in_memory() {
        pool_options = pool_options
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    } else {
        options = options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
        pool_options = pool_options.max_connections(settings.max_connections);
    }

    let pool = pool_options.connect_with(options).await.map_err(|e| {
        warn!(error = %e, "failed to create connection pool");
        DbError::Database(e)
    })?;

    health_check(&pool).await?;
    Ok(pool)
}

/// Apply every migration that has not run yet, in the order given.
///
/// Each migration runs in its own transaction together with its bookkeeping row.
/// Returns the number of migrations applied by this call.
pub async fn run_migrations(pool: &SqlitePool, migrations: &[(String, Migration)]) -> Result<usize> {
    sqlx::raw_sql(MIGRATIONS_TABLE).execute(pool).await?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let already: Option<(String,)> =
            sqlx::query_as("SELECT id FROM schema_migrations WHERE module = ? AND id = ?")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(pool)
                .await?;

        if already.is_some() {
            debug!(module = %module, id = migration.id, "migration already applied");
            continue;
        }

        let wrap = |source| DbError::Migration {
            module: module.clone(),
            id: migration.id,
            source,
        };

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .map_err(wrap)?;
        sqlx::query("INSERT INTO schema_migrations (module, id) VALUES (?, ?)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await
            .map_err(wrap)?;
        tx.commit().await?;

        info!(module = %module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}

/// In-memory pool with the given migrations applied.
pub async fn connect_in_memory(migrations: &[(String, Migration)]) -> Result<SqlitePool> {
    let pool = connect(&DatabaseSettings::in_memory()).await?;
    run_migrations(&pool, migrations).await?;
    Ok(pool)
}

async fn health_check(pool: &SqlitePool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await.map_err(|e| {
        warn!(error = %e, "database health check failed");
        DbError::Database(e)
    })?;
    Ok(())
}
