//! Genre list and genre CRUD handlers.

use axum::{
    extract::{Path, State},
    response::{Html, Response},
    Form,
};
use bookshelf_authz::{CurrentUser, MaybeUser};
use bookshelf_http::{error::AppError, flash::redirect_with_flash, flash::Flash};
use bookshelf_kernel::AppState;

use crate::modules::genres::{
    models::{GenreForm, GenreId},
    store::{GenreRepository, SqliteGenreRepository},
    views,
};
use crate::utils;
use crate::views::ViewContext;

const GENRES_PATH: &str = "/get_genres";

fn repository(state: &AppState) -> SqliteGenreRepository {
    SqliteGenreRepository::new(state.db.clone())
}

fn genre_name(form: &GenreForm) -> Result<String, AppError> {
    let name = utils::field(&form.genre_name);
    let missing = utils::require(&[("genre_name", &name)]);
    if !missing.is_empty() {
        return Err(AppError::validation(missing, "A genre needs a name"));
    }
    Ok(name)
}

pub async fn list_genres(
    State(state): State<AppState>,
    user: MaybeUser,
    flash: Flash,
) -> Result<Response, AppError> {
    let genres = repository(&state).list().await?;
    let ctx = ViewContext::from_maybe(&user, &flash);
    Ok(flash.consume(Html(views::genres_page(&ctx, &genres))))
}

pub async fn add_genre_form(user: CurrentUser, flash: Flash) -> Response {
    let ctx = ViewContext::new(Some(&user.username), &flash);
    flash.consume(Html(views::add_genre_page(&ctx)))
}

pub async fn add_genre(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<GenreForm>,
) -> Result<Response, AppError> {
    let name = genre_name(&form)?;
    let id = repository(&state).insert(&name).await?;
    tracing::info!(genre_id = %id, username = %user.username, "genre added");
    Ok(redirect_with_flash(GENRES_PATH, "New Genre Added"))
}

pub async fn edit_genre_form(
    State(state): State<AppState>,
    user: CurrentUser,
    flash: Flash,
    Path(id): Path<GenreId>,
) -> Result<Response, AppError> {
    let genre = repository(&state)
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No genre with id {id}")))?;
    let ctx = ViewContext::new(Some(&user.username), &flash);
    Ok(flash.consume(Html(views::edit_genre_page(&ctx, &genre))))
}

pub async fn edit_genre(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<GenreId>,
    Form(form): Form<GenreForm>,
) -> Result<Response, AppError> {
    let name = genre_name(&form)?;
    repository(&state).rename(id, &name).await?;
    tracing::info!(genre_id = %id, username = %user.username, "genre renamed");
    Ok(redirect_with_flash(GENRES_PATH, "Genre Successfully Updated"))
}

pub async fn delete_genre(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<GenreId>,
) -> Result<Response, AppError> {
    if !repository(&state).delete(id).await? {
        return Err(AppError::not_found(format!("No genre with id {id}")));
    }
    tracing::info!(genre_id = %id, username = %user.username, "genre deleted");
    Ok(redirect_with_flash(GENRES_PATH, "Genre Successfully Deleted"))
}
