//! Genre repository trait and SQLite implementation

use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

use crate::error::{Result, StoreError};
use crate::modules::genres::models::{Genre, GenreId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenreRepository: Send + Sync {
    /// All genres, sorted by name ascending
    async fn list(&self) -> Result<Vec<Genre>>;

    async fn find(&self, id: GenreId) -> Result<Option<Genre>>;

    async fn insert(&self, name: &str) -> Result<GenreId>;

    /// Rename a genre. Books keep the old name; there is no cascade.
    ///
    /// # Errors
    /// `NotFound` if the genre does not exist
    async fn rename(&self, id: GenreId, name: &str) -> Result<()>;

    /// Returns `false` if there was nothing to delete
    async fn delete(&self, id: GenreId) -> Result<bool>;
}

pub struct SqliteGenreRepository {
    pool: SqlitePool,
}

impl SqliteGenreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenreRepository for SqliteGenreRepository {
    async fn list(&self) -> Result<Vec<Genre>> {
        let genres = query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    async fn find(&self, id: GenreId) -> Result<Option<Genre>> {
        let genre = query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(genre)
    }

    async fn insert(&self, name: &str) -> Result<GenreId> {
        let result = query("INSERT INTO genres (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(GenreId(result.last_insert_rowid()))
    }

    async fn rename(&self, id: GenreId, name: &str) -> Result<()> {
        let result = query("UPDATE genres SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "genre",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: GenreId) -> Result<bool> {
        let result = query("DELETE FROM genres WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
