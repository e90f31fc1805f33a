//! Server-side sessions keyed by an opaque random token.

use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;

pub struct SessionStore {
    pool: SqlitePool,
    ttl_secs: i64,
}

impl SessionStore {
    pub fn new(pool: SqlitePool, ttl_secs: u64) -> Self {
        Self {
            pool,
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs as u64
    }

    /// Start a session for `username` and return its token.
    pub async fn create(&self, username: &str) -> Result<String> {
        let token = Uuid::new_v4().simple().to_string();
        let expires_at = now().saturating_add(self.ttl_secs);

        sqlx::query("INSERT INTO sessions (token, username, expires_at) VALUES (?, ?, ?)")
            .bind(&token)
            .bind(username)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        debug!(username, "session created");
        Ok(token)
    }

    /// The username behind a live session token.
    pub async fn resolve(&self, token: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT username FROM sessions WHERE token = ? AND expires_at > ?")
                .bind(token)
                .bind(now())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(username,)| username))
    }

    pub async fn revoke(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Drop expired rows. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}
