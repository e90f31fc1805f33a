use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Store-assigned genre identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct GenreId(pub i64);

impl std::fmt::Display for GenreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A genre. Books refer to genres by name, not by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// Submitted add/edit genre form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenreForm {
    pub genre_name: Option<String>,
}
