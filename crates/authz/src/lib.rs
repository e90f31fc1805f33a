//! Accounts, sessions, and the request guards built on them.
//!
//! Registered as the `authz` core module so its tables exist before any
//! application module that records usernames.

use std::sync::Arc;

use async_trait::async_trait;
use bookshelf_kernel::{InitCtx, Migration, Module};

pub mod error;
pub mod identity;
pub mod password;
pub mod sessions;
pub mod users;

pub use error::AuthError;
pub use identity::{CurrentUser, MaybeUser};
pub use password::PasswordHasher;
pub use sessions::SessionStore;
pub use users::{User, UserStore};

pub struct AuthzModule;

#[async_trait]
impl Module for AuthzModule {
    fn name(&self) -> &'static str {
        "authz"
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_users_sessions",
            up: r#"
                CREATE TABLE users (
                    username      TEXT PRIMARY KEY NOT NULL,
                    password_hash TEXT NOT NULL,
                    created_at    INTEGER NOT NULL
                );
                CREATE TABLE sessions (
                    token      TEXT PRIMARY KEY NOT NULL,
                    username   TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
                    expires_at INTEGER NOT NULL
                );
                CREATE INDEX sessions_expires_at ON sessions(expires_at);
                "#,
        }]
    }

    async fn start(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let purged = SessionStore::new(ctx.db.clone(), ctx.settings.auth.session_ttl_secs)
            .purge_expired()
            .await?;
        tracing::info!(module = self.name(), purged, "expired sessions purged");
        Ok(())
    }
}

/// Create a new instance of the authz module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(AuthzModule)
}
