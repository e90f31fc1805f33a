use serde::Deserialize;

/// Submitted register/login form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsForm {
    pub username: Option<String>,
    pub password: Option<String>,
}
