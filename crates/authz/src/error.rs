use bookshelf_http::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("password hashing failed: {0}")]
    Hash(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidInput { field, message } => {
                AppError::validation(vec![format!("{field}: {message}")], "Please correct the form")
            }
            AuthError::UsernameTaken(name) => {
                AppError::validation(vec![format!("username: '{name}' is taken")], "Username already exists")
            }
            other => AppError::internal(other),
        }
    }
}
