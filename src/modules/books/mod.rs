//! The book catalog: paginated listings, full-text search, book pages with
//! reviews, and book management for logged-in users.

pub mod catalog;
pub mod models;
pub mod routes;
pub mod store;
pub mod views;

use async_trait::async_trait;
use axum::{routing::get, Router};
use bookshelf_kernel::{AppState, InitCtx, Migration, Module};

use crate::modules::books::store::CatalogStore;

pub struct BooksModule;

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            page_size = catalog::PAGE_SIZE,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router<AppState> {
        Router::new()
            .route("/", get(routes::newest))
            .route("/get_books/new_books", get(routes::newest))
            .route("/get_books/new_books/{page}", get(routes::newest_page))
            .route("/get_books/a-to-z", get(routes::a_to_z))
            .route("/get_books/a-to-z/{page}", get(routes::a_to_z_page))
            .route("/get_books/z-to-a", get(routes::z_to_a))
            .route("/get_books/z-to-a/{page}", get(routes::z_to_a_page))
            .route(
                "/search",
                get(routes::search_get).post(routes::search_post),
            )
            .route(
                "/bookpage/{title}",
                get(routes::bookpage).post(routes::add_review),
            )
            .route(
                "/add_book",
                get(routes::add_book_form).post(routes::add_book),
            )
            .route(
                "/edit_book/{title}/{id}",
                get(routes::edit_book_form).post(routes::edit_book),
            )
            .route("/delete_book/{title}/{id}", get(routes::delete_book))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![
            Migration {
                id: "001_books",
                up: r#"
                    CREATE TABLE books (
                        id          INTEGER PRIMARY KEY AUTOINCREMENT,
                        title       TEXT NOT NULL CHECK (title != ''),
                        author      TEXT NOT NULL CHECK (author != ''),
                        genre_name  TEXT NOT NULL DEFAULT '',
                        image_url   TEXT NOT NULL DEFAULT '',
                        description TEXT NOT NULL DEFAULT '',
                        buy_url     TEXT NOT NULL DEFAULT '',
                        is_upvoted  TEXT NOT NULL DEFAULT 'off' CHECK (is_upvoted IN ('on', 'off')),
                        created_by  TEXT NOT NULL
                    );
                    CREATE INDEX books_title ON books(title);
                    "#,
            },
            Migration {
                id: "002_books_fts",
                up: r#"
                    CREATE VIRTUAL TABLE books_fts USING fts5(
                        title, author, genre_name, description,
                        content='books', content_rowid='id',
                        tokenize='porter unicode61'
                    );
                    CREATE TRIGGER books_ai AFTER INSERT ON books BEGIN
                        INSERT INTO books_fts(rowid, title, author, genre_name, description)
                        VALUES (new.id, new.title, new.author, new.genre_name, new.description);
                    END;
                    CREATE TRIGGER books_ad AFTER DELETE ON books BEGIN
                        INSERT INTO books_fts(books_fts, rowid, title, author, genre_name, description)
                        VALUES ('delete', old.id, old.title, old.author, old.genre_name, old.description);
                    END;
                    CREATE TRIGGER books_au AFTER UPDATE ON books BEGIN
                        INSERT INTO books_fts(books_fts, rowid, title, author, genre_name, description)
                        VALUES ('delete', old.id, old.title, old.author, old.genre_name, old.description);
                        INSERT INTO books_fts(rowid, title, author, genre_name, description)
                        VALUES (new.id, new.title, new.author, new.genre_name, new.description);
                    END;
                    "#,
            },
            Migration {
                id: "003_reviews",
                up: r#"
                    CREATE TABLE reviews (
                        id          INTEGER PRIMARY KEY AUTOINCREMENT,
                        book_id     INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
                        username    TEXT NOT NULL,
                        description TEXT NOT NULL,
                        UNIQUE (book_id, username)
                    );
                    "#,
            },
        ]
    }

    async fn start(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let books = store::SqliteBookRepository::new(ctx.db.clone())
            .count_books()
            .await?;
        tracing::info!(module = self.name(), books, "books module started");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule)
}
