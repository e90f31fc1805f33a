//! Catalog, book page and book CRUD handlers.

use axum::{
    extract::{Path, Query, State},
    response::{Html, Response},
    Form,
};
use bookshelf_authz::{CurrentUser, MaybeUser};
use bookshelf_http::{error::AppError, flash::redirect_with_flash, flash::Flash};
use bookshelf_kernel::AppState;

use crate::modules::books::{
    catalog::{CatalogService, SortOrder},
    models::{BookForm, BookId, ReviewForm, SearchForm},
    store::{BookRepository, ReviewOutcome, SqliteBookRepository},
    views,
};
use crate::modules::genres::store::{GenreRepository, SqliteGenreRepository};
use crate::utils;
use crate::views::{path_segment, ViewContext};

const NEW_BOOKS_PATH: &str = "/get_books/new_books";

fn catalog(state: &AppState) -> CatalogService {
    CatalogService::from_pool(&state.db)
}

fn books(state: &AppState) -> SqliteBookRepository {
    SqliteBookRepository::new(state.db.clone())
}

fn genres(state: &AppState) -> SqliteGenreRepository {
    SqliteGenreRepository::new(state.db.clone())
}

fn book_path(title: &str) -> String {
    format!("/bookpage/{}", path_segment(title))
}

async fn render_listing(
    state: &AppState,
    user: &MaybeUser,
    flash: Flash,
    order: SortOrder,
    page: i64,
) -> Result<Response, AppError> {
    let listing = catalog(state).list(order, page).await?;
    let ctx = ViewContext::from_maybe(user, &flash);
    Ok(flash.consume(Html(views::listing_page(&ctx, &listing))))
}

pub async fn newest(
    State(state): State<AppState>,
    user: MaybeUser,
    flash: Flash,
) -> Result<Response, AppError> {
    render_listing(&state, &user, flash, SortOrder::Newest, 1).await
}

pub async fn newest_page(
    State(state): State<AppState>,
    user: MaybeUser,
    flash: Flash,
    Path(page): Path<i64>,
) -> Result<Response, AppError> {
    render_listing(&state, &user, flash, SortOrder::Newest, page).await
}

pub async fn a_to_z(
    State(state): State<AppState>,
    user: MaybeUser,
    flash: Flash,
) -> Result<Response, AppError> {
    render_listing(&state, &user, flash, SortOrder::TitleAsc, 1).await
}

pub async fn a_to_z_page(
    State(state): State<AppState>,
    user: MaybeUser,
    flash: Flash,
    Path(page): Path<i64>,
) -> Result<Response, AppError> {
    render_listing(&state, &user, flash, SortOrder::TitleAsc, page).await
}

pub async fn z_to_a(
    State(state): State<AppState>,
    user: MaybeUser,
    flash: Flash,
) -> Result<Response, AppError> {
    render_listing(&state, &user, flash, SortOrder::TitleDesc, 1).await
}

pub async fn z_to_a_page(
    State(state): State<AppState>,
    user: MaybeUser,
    flash: Flash,
    Path(page): Path<i64>,
) -> Result<Response, AppError> {
    render_listing(&state, &user, flash, SortOrder::TitleDesc, page).await
}

async fn render_search(
    state: &AppState,
    user: &MaybeUser,
    flash: Flash,
    form: SearchForm,
) -> Result<Response, AppError> {
    let results = catalog(state).search(form.query.as_deref()).await?;
    let ctx = ViewContext::from_maybe(user, &flash);
    Ok(flash.consume(Html(views::search_page(&ctx, &results))))
}

pub async fn search_get(
    State(state): State<AppState>,
    user: MaybeUser,
    flash: Flash,
    Query(form): Query<SearchForm>,
) -> Result<Response, AppError> {
    render_search(&state, &user, flash, form).await
}

pub async fn search_post(
    State(state): State<AppState>,
    user: MaybeUser,
    flash: Flash,
    Form(form): Form<SearchForm>,
) -> Result<Response, AppError> {
    render_search(&state, &user, flash, form).await
}

pub async fn bookpage(
    State(state): State<AppState>,
    user: MaybeUser,
    flash: Flash,
    Path(title): Path<String>,
) -> Result<Response, AppError> {
    let book = books(&state)
        .find_by_title(&title)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No book titled {title}")))?;
    let ctx = ViewContext::from_maybe(&user, &flash);
    Ok(flash.consume(Html(views::book_page(&ctx, &book))))
}

pub async fn add_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(title): Path<String>,
    Form(form): Form<ReviewForm>,
) -> Result<Response, AppError> {
    let review = utils::field(&form.review);
    let missing = utils::require(&[("review", &review)]);
    if !missing.is_empty() {
        return Err(AppError::validation(missing, "A review needs some text"));
    }

    let repo = books(&state);
    let book = repo
        .find_by_title(&title)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No book titled {title}")))?;

    let message = match repo.add_review(book.id, &user.username, &review).await? {
        ReviewOutcome::Saved => {
            tracing::info!(book_id = %book.id, username = %user.username, "review saved");
            "review saved"
        }
        ReviewOutcome::AlreadyReviewed => "You have already reviewed this book.",
    };
    Ok(redirect_with_flash(&book_path(&book.title), message))
}

pub async fn add_book_form(
    State(state): State<AppState>,
    user: CurrentUser,
    flash: Flash,
) -> Result<Response, AppError> {
    let genres = genres(&state).list().await?;
    let ctx = ViewContext::new(Some(&user.username), &flash);
    Ok(flash.consume(Html(views::add_book_page(&ctx, &genres))))
}

pub async fn add_book(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<BookForm>,
) -> Result<Response, AppError> {
    let draft = form
        .into_draft()
        .map_err(|errors| AppError::validation(errors, "Please correct the book form"))?;
    let id = books(&state).insert(&draft, &user.username).await?;
    tracing::info!(book_id = %id, username = %user.username, "book added");
    Ok(redirect_with_flash(NEW_BOOKS_PATH, "Book Successfully Added"))
}

pub async fn edit_book_form(
    State(state): State<AppState>,
    user: CurrentUser,
    flash: Flash,
    Path((_title, id)): Path<(String, BookId)>,
) -> Result<Response, AppError> {
    let book = books(&state)
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No book with id {id}")))?;
    let genres = genres(&state).list().await?;
    let ctx = ViewContext::new(Some(&user.username), &flash);
    Ok(flash.consume(Html(views::edit_book_page(&ctx, &book, &genres))))
}

pub async fn edit_book(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((_title, id)): Path<(String, BookId)>,
    Form(form): Form<BookForm>,
) -> Result<Response, AppError> {
    let draft = form
        .into_draft()
        .map_err(|errors| AppError::validation(errors, "Please correct the book form"))?;
    books(&state).update(id, &draft).await?;
    tracing::info!(book_id = %id, username = %user.username, "book updated");
    Ok(redirect_with_flash(
        &book_path(&draft.title),
        "Book Successfully Updated",
    ))
}

pub async fn delete_book(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((_title, id)): Path<(String, BookId)>,
) -> Result<Response, AppError> {
    if !books(&state).delete(id).await? {
        return Err(AppError::not_found(format!("No book with id {id}")));
    }
    tracing::info!(book_id = %id, username = %user.username, "book deleted");
    Ok(redirect_with_flash(
        NEW_BOOKS_PATH,
        "Book has successfully been deleted",
    ))
}
