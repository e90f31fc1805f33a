//! Request-scoped identity extracted from the session cookie.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue},
    response::{IntoResponse, Response},
};
use bookshelf_http::{
    cookies::{clear_cookie, cookie_value, set_cookie, CookieAttrs},
    error::AppError,
    flash::redirect_with_flash,
};
use bookshelf_kernel::AppState;

use crate::error::Result;
use crate::sessions::SessionStore;

pub const SESSION_COOKIE: &str = "session";
pub const LOGIN_PATH: &str = "/login";

/// The logged-in user. Handlers taking this redirect anonymous visitors to the login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub username: String,
    pub token: String,
}

/// The logged-in user, if any.
#[derive(Debug, Clone, Default)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl MaybeUser {
    pub fn username(&self) -> Option<&str> {
        self.0.as_ref().map(|user| user.username.as_str())
    }
}

fn sessions(state: &AppState) -> SessionStore {
    SessionStore::new(state.db.clone(), state.settings.auth.session_ttl_secs)
}

async fn resolve(parts: &Parts, state: &AppState) -> Result<Option<CurrentUser>> {
    let Some(token) = cookie_value(&parts.headers, SESSION_COOKIE) else {
        return Ok(None);
    };

    let user = sessions(state)
        .resolve(&token)
        .await?
        .map(|username| CurrentUser { username, token });
    Ok(user)
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(MaybeUser(resolve(parts, state).await?))
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        match resolve(parts, state).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(redirect_with_flash(LOGIN_PATH, "Please log in to continue")),
            Err(e) => Err(AppError::from(e).into_response()),
        }
    }
}

/// Start a session for `username` and produce the cookie that carries it.
pub async fn start_session(state: &AppState, username: &str) -> Result<Option<HeaderValue>> {
    let store = sessions(state);
    let token = store.create(username).await?;
    Ok(set_cookie(
        SESSION_COOKIE,
        &token,
        CookieAttrs {
            max_age: Some(store.ttl_secs()),
            secure: state.settings.auth.secure_cookies,
        },
    ))
}

/// Revoke the current session and return the cookie that clears it.
pub async fn end_session(state: &AppState, user: &CurrentUser) -> Result<HeaderValue> {
    sessions(state).revoke(&user.token).await?;
    Ok(clear_cookie(SESSION_COOKIE))
}

/// Add a `Set-Cookie` header to a response.
pub fn with_cookie(response: impl IntoResponse, cookie: Option<HeaderValue>) -> Response {
    let mut response = response.into_response();
    if let Some(cookie) = cookie {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}
