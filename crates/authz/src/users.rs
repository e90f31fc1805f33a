//! User accounts: registration and credential checks.

use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use tracing::info;

use crate::error::{AuthError, Result};
use crate::password::PasswordHasher;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub username: String,
    pub password_hash: String,
}

/// Usernames are case-insensitive; they are stored lower-cased and trimmed.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub struct UserStore {
    pool: SqlitePool,
    hasher: PasswordHasher,
}

impl UserStore {
    pub fn new(pool: SqlitePool, hasher: PasswordHasher) -> Self {
        Self { pool, hasher }
    }

    pub async fn find(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT username, password_hash FROM users WHERE username = ?",
        )
        .bind(normalize_username(username))
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Create an account. Fails with `UsernameTaken` if the name exists.
    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        let username = normalize_username(username);
        if username.is_empty() {
            return Err(AuthError::InvalidInput {
                field: "username".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if password.is_empty() {
            return Err(AuthError::InvalidInput {
                field: "password".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        let user = User {
            password_hash: self.hasher.hash(password)?,
            username,
        };

        let inserted = sqlx::query(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(OffsetDateTime::now_utc().unix_timestamp())
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {
                info!(username = %user.username, "user registered");
                Ok(user)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AuthError::UsernameTaken(user.username))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The user, if the name exists and the password matches.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = self
            .find(username)
            .await?
            .filter(|user| PasswordHasher::verify(&user.password_hash, password));
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuthzModule;
    use bookshelf_kernel::Module;

    async fn store() -> UserStore {
        let migrations: Vec<_> = AuthzModule
            .migrations()
            .into_iter()
            .map(|m| ("authz".to_string(), m))
            .collect();
        let pool = bookshelf_db::connect_in_memory(&migrations).await.unwrap();
        UserStore::new(pool, PasswordHasher::new(2))
    }

    #[tokio::test]
    async fn register_lowercases_and_rejects_duplicates() {
        let users = store().await;

        let user = users.register("  Ada ", "secret").await.unwrap();
        assert_eq!(user.username, "ada");

        let err = users.register("ADA", "other").await.unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken(name) if name == "ada"));
    }

    #[tokio::test]
    async fn authenticate_checks_password() {
        let users = store().await;
        users.register("grace", "hopper").await.unwrap();

        assert!(users.authenticate("Grace", "hopper").await.unwrap().is_some());
        assert!(users.authenticate("grace", "wrong").await.unwrap().is_none());
        assert!(users.authenticate("nobody", "hopper").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_credentials_are_rejected() {
        let users = store().await;
        assert!(matches!(
            users.register("   ", "pw").await,
            Err(AuthError::InvalidInput { .. })
        ));
        assert!(matches!(
            users.register("linus", "").await,
            Err(AuthError::InvalidInput { .. })
        ));
    }
}
