//! Registration, login, logout and the profile page.

use axum::{
    extract::{Path, State},
    response::{Html, Response},
    Form,
};
use bookshelf_authz::{
    identity::{end_session, start_session, with_cookie},
    AuthError, CurrentUser, MaybeUser, PasswordHasher, UserStore,
};
use bookshelf_http::{error::AppError, flash::redirect_with_flash, flash::Flash};
use bookshelf_kernel::AppState;

use crate::modules::users::{models::CredentialsForm, views};
use crate::utils;
use crate::views::{path_segment, ViewContext};

fn users(state: &AppState) -> UserStore {
    UserStore::new(
        state.db.clone(),
        PasswordHasher::new(state.settings.auth.password_hash_rounds),
    )
}

fn profile_path(username: &str) -> String {
    format!("/profile/{}", path_segment(username))
}

pub async fn register_form(user: MaybeUser, flash: Flash) -> Response {
    let ctx = ViewContext::from_maybe(&user, &flash);
    flash.consume(Html(views::register_page(&ctx)))
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let username = utils::field(&form.username);
    let password = form.password.unwrap_or_default();

    let user = match users(&state).register(&username, &password).await {
        Ok(user) => user,
        Err(AuthError::UsernameTaken(_)) => {
            return Ok(redirect_with_flash("/register", "Username already exists"));
        }
        Err(e) => return Err(e.into()),
    };

    let cookie = start_session(&state, &user.username).await?;
    Ok(with_cookie(
        redirect_with_flash(&profile_path(&user.username), "Registration successful"),
        cookie,
    ))
}

pub async fn login_form(user: MaybeUser, flash: Flash) -> Response {
    let ctx = ViewContext::from_maybe(&user, &flash);
    flash.consume(Html(views::login_page(&ctx)))
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let username = utils::field(&form.username);
    let password = form.password.unwrap_or_default();

    let Some(user) = users(&state).authenticate(&username, &password).await? else {
        tracing::info!(username = %username, "login rejected");
        return Ok(redirect_with_flash(
            "/login",
            "Username and/or Password incorrect",
        ));
    };

    let cookie = start_session(&state, &user.username).await?;
    tracing::info!(username = %user.username, "user logged in");
    Ok(with_cookie(
        redirect_with_flash(&profile_path(&user.username), &format!("Welcome, {username}")),
        cookie,
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Response, AppError> {
    let cookie = end_session(&state, &user).await?;
    tracing::info!(username = %user.username, "user logged out");
    Ok(with_cookie(
        redirect_with_flash("/login", "You have been logged out"),
        Some(cookie),
    ))
}

/// Always shows the logged-in user's own profile, whatever name is in the path.
pub async fn profile(
    user: CurrentUser,
    flash: Flash,
    Path(_username): Path<String>,
) -> Response {
    let ctx = ViewContext::new(Some(&user.username), &flash);
    flash.consume(Html(views::profile_page(&ctx, &user.username)))
}
