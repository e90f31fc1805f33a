//! Book repository traits and the SQLite implementation

use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

use crate::error::{Result, StoreError};
use crate::modules::books::catalog::SortOrder;
use crate::modules::books::models::{Book, BookDraft, BookId, Review};

const BOOK_COLUMNS: &str =
    "id, title, author, genre_name, image_url, description, buy_url, is_upvoted, created_by";

/// Read-only queries the catalog listing and search flow is built on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Count all books
    async fn count_books(&self) -> Result<u64>;

    /// One window of the full book set in the given order
    async fn fetch_books(&self, order: SortOrder, limit: u32, offset: i64) -> Result<Vec<Book>>;

    /// Every book matching an FTS5 match expression, best match first
    async fn search_books(&self, match_expression: &str) -> Result<Vec<Book>>;
}

/// Outcome of adding a review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Saved,
    AlreadyReviewed,
}

/// Book CRUD and reviews
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>>;

    /// Find a book by its title, with its reviews loaded
    ///
    /// Titles are not unique; the earliest book with the title wins.
    async fn find_by_title(&self, title: &str) -> Result<Option<Book>>;

    async fn insert(&self, draft: &BookDraft, created_by: &str) -> Result<BookId>;

    /// Overwrite the editable fields of a book. Reviews and creator are kept.
    ///
    /// # Errors
    /// `NotFound` if the book does not exist
    async fn update(&self, id: BookId, draft: &BookDraft) -> Result<()>;

    /// Delete a book and its reviews. Returns `false` if it did not exist.
    async fn delete(&self, id: BookId) -> Result<bool>;

    async fn reviews(&self, id: BookId) -> Result<Vec<Review>>;

    async fn add_review(&self, id: BookId, username: &str, description: &str)
        -> Result<ReviewOutcome>;
}

pub struct SqliteBookRepository {
    pool: SqlitePool,
}

impl SqliteBookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for SqliteBookRepository {
    async fn count_books(&self) -> Result<u64> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn fetch_books(&self, order: SortOrder, limit: u32, offset: i64) -> Result<Vec<Book>> {
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY {} LIMIT ? OFFSET ?",
            order.order_by()
        );
        let books = query_as::<_, Book>(&sql)
            .bind(i64::from(limit))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn search_books(&self, match_expression: &str) -> Result<Vec<Book>> {
        let books = query_as::<_, Book>(
            r#"
            SELECT b.id, b.title, b.author, b.genre_name, b.image_url, b.description,
                   b.buy_url, b.is_upvoted, b.created_by
            FROM books_fts
            JOIN books b ON b.id = books_fts.rowid
            WHERE books_fts MATCH ?
            ORDER BY books_fts.rank, b.id
            "#,
        )
        .bind(match_expression)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?");
        let book = query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE title = ? ORDER BY id LIMIT 1");
        let book = query_as::<_, Book>(&sql)
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;

        match book {
            Some(mut book) => {
                book.reviews = self.reviews(book.id).await?;
                Ok(Some(book))
            }
            None => Ok(None),
        }
    }

    async fn insert(&self, draft: &BookDraft, created_by: &str) -> Result<BookId> {
        let result = query(
            r#"
            INSERT INTO books (
                title, author, genre_name, image_url, description, buy_url, is_upvoted, created_by
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(&draft.genre_name)
        .bind(&draft.image_url)
        .bind(&draft.description)
        .bind(&draft.buy_url)
        .bind(draft.is_upvoted)
        .bind(created_by)
        .execute(&self.pool)
        .await?;

        Ok(BookId(result.last_insert_rowid()))
    }

    async fn update(&self, id: BookId, draft: &BookDraft) -> Result<()> {
        let result = query(
            r#"
            UPDATE books
            SET title = ?, author = ?, genre_name = ?, image_url = ?,
                description = ?, buy_url = ?, is_upvoted = ?
            WHERE id = ?
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(&draft.genre_name)
        .bind(&draft.image_url)
        .bind(&draft.description)
        .bind(&draft.buy_url)
        .bind(draft.is_upvoted)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "book",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: BookId) -> Result<bool> {
        let result = query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reviews(&self, id: BookId) -> Result<Vec<Review>> {
        let reviews = query_as::<_, Review>(
            "SELECT username, description FROM reviews WHERE book_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn add_review(
        &self,
        id: BookId,
        username: &str,
        description: &str,
    ) -> Result<ReviewOutcome> {
        let inserted = query("INSERT INTO reviews (book_id, username, description) VALUES (?, ?, ?)")
            .bind(id)
            .bind(username)
            .bind(description)
            .execute(&self.pool)
            .await;

        match inserted {
            Ok(_) => Ok(ReviewOutcome::Saved),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Ok(ReviewOutcome::AlreadyReviewed)
            }
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                Err(StoreError::NotFound {
                    entity: "book",
                    id: id.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::models::Upvote;
    use crate::test_support::{draft, test_pool};

    #[tokio::test]
    async fn insert_and_find() {
        let repo = SqliteBookRepository::new(test_pool().await);
        let id = repo.insert(&draft("Dune"), "ada").await.unwrap();

        let book = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.created_by, "ada");
        assert_eq!(book.is_upvoted, Upvote::Off);

        assert_eq!(repo.find_by_title("Dune").await.unwrap().unwrap().id, id);
        assert!(repo.find_by_title("Emma").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_keeps_reviews_and_creator() {
        let repo = SqliteBookRepository::new(test_pool().await);
        let id = repo.insert(&draft("Dune"), "ada").await.unwrap();
        repo.add_review(id, "grace", "Spice must flow").await.unwrap();

        let mut changed = draft("Dune Messiah");
        changed.is_upvoted = Upvote::On;
        repo.update(id, &changed).await.unwrap();

        let book = repo.find_by_title("Dune Messiah").await.unwrap().unwrap();
        assert_eq!(book.created_by, "ada");
        assert_eq!(book.is_upvoted, Upvote::On);
        assert_eq!(
            book.reviews,
            vec![Review {
                username: "grace".to_string(),
                description: "Spice must flow".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn update_missing_book_is_not_found() {
        let repo = SqliteBookRepository::new(test_pool().await);
        assert!(matches!(
            repo.update(BookId(42), &draft("Ghost")).await,
            Err(StoreError::NotFound { entity: "book", .. })
        ));
    }

    #[tokio::test]
    async fn one_review_per_user_and_book() {
        let repo = SqliteBookRepository::new(test_pool().await);
        let id = repo.insert(&draft("Emma"), "ada").await.unwrap();

        assert_eq!(
            repo.add_review(id, "grace", "Lovely").await.unwrap(),
            ReviewOutcome::Saved
        );
        assert_eq!(
            repo.add_review(id, "grace", "Again").await.unwrap(),
            ReviewOutcome::AlreadyReviewed
        );
        assert_eq!(
            repo.add_review(id, "ada", "Mine").await.unwrap(),
            ReviewOutcome::Saved
        );
        assert_eq!(repo.reviews(id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_removes_reviews_too() {
        let pool = test_pool().await;
        let repo = SqliteBookRepository::new(pool.clone());
        let id = repo.insert(&draft("Emma"), "ada").await.unwrap();
        repo.add_review(id, "grace", "Lovely").await.unwrap();

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());

        let (left,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(left, 0);
    }

    #[tokio::test]
    async fn full_text_index_follows_updates_and_deletes() {
        let repo = SqliteBookRepository::new(test_pool().await);
        let id = repo.insert(&draft("Dune"), "ada").await.unwrap();
        assert_eq!(repo.search_books("\"dune\"").await.unwrap().len(), 1);

        repo.update(id, &draft("Arrakis")).await.unwrap();
        assert!(repo.search_books("\"dune\"").await.unwrap().is_empty());
        assert_eq!(repo.search_books("\"arrakis\"").await.unwrap().len(), 1);

        repo.delete(id).await.unwrap();
        assert!(repo.search_books("\"arrakis\"").await.unwrap().is_empty());
    }
}
