//! Catalog listing and search.
//!
//! Listings are paginated ten books at a time. The window is pushed down to the
//! store as `LIMIT/OFFSET`, with a separate count for the page total; ordering and
//! page numbering match slicing the fully ordered result set:
//!
//! * page 1 is books `[0, 10)`, page `p` is `[p*10 - 10, p*10)`
//! * `pages = ceil(total / 10)`, so an empty catalog has zero pages
//! * pages below 1 or above `pages` are empty, never an error
//!
//! Search is unpaginated and has no page count.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::error::Result;
use crate::modules::books::models::Book;
use crate::modules::books::store::{CatalogStore, SqliteBookRepository};
use crate::modules::genres::models::Genre;
use crate::modules::genres::store::{GenreRepository, SqliteGenreRepository};

/// Books per listing page
pub const PAGE_SIZE: u32 = 10;

/// The three listing orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Most recently added first
    Newest,
    /// Title ascending
    TitleAsc,
    /// Title descending
    TitleDesc,
}

impl SortOrder {
    /// `ORDER BY` clause. Ties on title fall back to id so that the two title
    /// orders are exact reverses of each other.
    pub fn order_by(self) -> &'static str {
        match self {
            SortOrder::Newest => "id DESC",
            SortOrder::TitleAsc => "title ASC, id ASC",
            SortOrder::TitleDesc => "title DESC, id DESC",
        }
    }

    /// Base path of the listing; page `n` lives at `{path}/{n}`
    pub fn path(self) -> &'static str {
        match self {
            SortOrder::Newest => "/get_books/new_books",
            SortOrder::TitleAsc => "/get_books/a-to-z",
            SortOrder::TitleDesc => "/get_books/z-to-a",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Newest => "New Books",
            SortOrder::TitleAsc => "Books A-Z",
            SortOrder::TitleDesc => "Books Z-A",
        }
    }
}

/// A requested listing page (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: i64) -> Self {
        Self {
            page,
            page_size: PAGE_SIZE,
        }
    }

    /// Index of the first book on the page; `None` for pages below 1
    pub fn offset(&self) -> Option<i64> {
        if self.page < 1 {
            return None;
        }
        (self.page - 1).checked_mul(i64::from(self.page_size))
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    /// Whether the page can hold any books given `pages` in total
    pub fn in_range(&self, pages: u32) -> bool {
        self.page >= 1 && self.page <= i64::from(pages)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1)
    }
}

/// `ceil(total / page_size)`; zero books means zero pages
pub fn page_count(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// One page of a listing plus what the page chrome needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub books: Vec<Book>,
    pub genres: Vec<Genre>,
    pub pages: u32,
    pub page: i64,
    pub order: SortOrder,
}

/// Full search result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub books: Vec<Book>,
    pub genres: Vec<Genre>,
    pub query: String,
}

/// Turn free text into an FTS5 match expression: every word becomes a quoted
/// term and terms are OR-ed. Returns `None` when nothing searchable remains.
pub fn match_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .map(|word| format!("\"{word}\""))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

/// Read-only catalog queries over the book and genre stores
#[derive(Clone)]
pub struct CatalogService {
    books: Arc<dyn CatalogStore>,
    genres: Arc<dyn GenreRepository>,
}

impl CatalogService {
    pub fn new(books: Arc<dyn CatalogStore>, genres: Arc<dyn GenreRepository>) -> Self {
        Self { books, genres }
    }

    pub fn from_pool(pool: &SqlitePool) -> Self {
        Self::new(
            Arc::new(SqliteBookRepository::new(pool.clone())),
            Arc::new(SqliteGenreRepository::new(pool.clone())),
        )
    }

    pub async fn list(&self, order: SortOrder, page: i64) -> Result<Listing> {
        let request = PageRequest::new(page);
        let total = self.books.count_books().await?;
        let pages = page_count(total, request.page_size);

        let books = match request.offset() {
            Some(offset) if request.in_range(pages) => {
                self.books
                    .fetch_books(order, request.limit(), offset)
                    .await?
            }
            _ => Vec::new(),
        };

        let genres = self.genres.list().await?;

        tracing::debug!(
            order = ?order,
            page,
            pages,
            total,
            returned = books.len(),
            "catalog page listed"
        );

        Ok(Listing {
            books,
            genres,
            pages,
            page,
            order,
        })
    }

    pub async fn list_newest(&self, page: i64) -> Result<Listing> {
        self.list(SortOrder::Newest, page).await
    }

    pub async fn list_a_to_z(&self, page: i64) -> Result<Listing> {
        self.list(SortOrder::TitleAsc, page).await
    }

    pub async fn list_z_to_a(&self, page: i64) -> Result<Listing> {
        self.list(SortOrder::TitleDesc, page).await
    }

    /// Missing or unsearchable text finds nothing; the store is not queried.
    pub async fn search(&self, query: Option<&str>) -> Result<SearchResults> {
        let query = query.unwrap_or_default().trim().to_string();

        let books = match match_expression(&query) {
            Some(expression) => self.books.search_books(&expression).await?,
            None => Vec::new(),
        };
        let genres = self.genres.list().await?;

        tracing::debug!(query = %query, matches = books.len(), "catalog searched");

        Ok(SearchResults {
            books,
            genres,
            query,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::modules::books::models::BookId;
    use crate::modules::books::store::{BookRepository, MockCatalogStore};
    use crate::modules::genres::store::MockGenreRepository;
    use crate::test_support::{draft, test_pool};

    async fn catalog_with(titles: &[&str]) -> CatalogService {
        let pool = test_pool().await;
        let repo = SqliteBookRepository::new(pool.clone());
        for title in titles {
            repo.insert(&draft(title), "ada").await.unwrap();
        }
        CatalogService::from_pool(&pool)
    }

    fn titles(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.title.as_str()).collect()
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, PAGE_SIZE), 0);
        assert_eq!(page_count(1, PAGE_SIZE), 1);
        assert_eq!(page_count(10, PAGE_SIZE), 1);
        assert_eq!(page_count(11, PAGE_SIZE), 2);
        assert_eq!(page_count(25, PAGE_SIZE), 3);
        assert_eq!(page_count(25, 0), 0);
    }

    #[test]
    fn offsets_follow_page_numbers() {
        assert_eq!(PageRequest::new(1).offset(), Some(0));
        assert_eq!(PageRequest::new(2).offset(), Some(10));
        assert_eq!(PageRequest::new(7).offset(), Some(60));
        assert_eq!(PageRequest::new(0).offset(), None);
        assert_eq!(PageRequest::new(-3).offset(), None);
        assert_eq!(PageRequest::new(i64::MAX).offset(), None);
        assert_eq!(PageRequest::default().page, 1);
    }

    #[test]
    fn match_expression_quotes_and_ors_terms() {
        assert_eq!(match_expression("dune").as_deref(), Some("\"dune\""));
        assert_eq!(
            match_expression("  frank  herbert's ").as_deref(),
            Some("\"frank\" OR \"herberts\"")
        );
        assert_eq!(match_expression("\"*^ -"), None);
        assert_eq!(match_expression(""), None);
    }

    #[tokio::test]
    async fn twenty_five_books_make_three_pages() {
        let names: Vec<String> = (1..=25).map(|n| format!("Book {n:02}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let catalog = catalog_with(&refs).await;

        let first = catalog.list_newest(1).await.unwrap();
        assert_eq!(first.pages, 3);
        assert_eq!(first.books.len(), 10);
        assert_eq!(first.books[0].title, "Book 25");
        assert_eq!(first.books[9].title, "Book 16");

        let second = catalog.list_newest(2).await.unwrap();
        assert_eq!(second.books.len(), 10);
        assert_eq!(second.books[0].title, "Book 15");

        let last = catalog.list_newest(3).await.unwrap();
        assert_eq!(
            titles(&last.books),
            vec!["Book 05", "Book 04", "Book 03", "Book 02", "Book 01"]
        );

        assert!(catalog.list_newest(4).await.unwrap().books.is_empty());
        assert!(catalog.list_newest(0).await.unwrap().books.is_empty());
        assert!(catalog.list_newest(-1).await.unwrap().books.is_empty());
    }

    #[tokio::test]
    async fn empty_catalog_has_no_pages() {
        let catalog = catalog_with(&[]).await;
        let listing = catalog.list_a_to_z(1).await.unwrap();
        assert_eq!(listing.pages, 0);
        assert!(listing.books.is_empty());
    }

    #[tokio::test]
    async fn title_orders_are_exact_reverses() {
        let catalog =
            catalog_with(&["Emma", "dune", "Dune", "Beloved", "Emma", "Zorba", "Animal Farm"]).await;

        let forward = catalog.list_a_to_z(1).await.unwrap().books;
        let mut backward = catalog.list_z_to_a(1).await.unwrap().books;
        backward.reverse();

        assert_eq!(
            titles(&forward),
            vec!["Animal Farm", "Beloved", "Dune", "Emma", "Emma", "Zorba", "dune"]
        );
        let forward_ids: Vec<BookId> = forward.iter().map(|b| b.id).collect();
        let backward_ids: Vec<BookId> = backward.iter().map(|b| b.id).collect();
        assert_eq!(forward_ids, backward_ids);
    }

    #[tokio::test]
    async fn newest_listing_is_stable() {
        let catalog = catalog_with(&["A", "B", "C"]).await;
        let once = catalog.list_newest(1).await.unwrap();
        let twice = catalog.list_newest(1).await.unwrap();
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn listing_includes_sorted_genres() {
        let pool = test_pool().await;
        let genres = SqliteGenreRepository::new(pool.clone());
        genres.insert("Thriller").await.unwrap();
        genres.insert("Biography").await.unwrap();

        let listing = CatalogService::from_pool(&pool).list_newest(1).await.unwrap();
        let names: Vec<&str> = listing.genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Biography", "Thriller"]);
    }

    #[tokio::test]
    async fn search_finds_the_one_matching_book() {
        let catalog = catalog_with(&["Dune", "Emma", "Beloved"]).await;

        let results = catalog.search(Some("dune")).await.unwrap();
        assert_eq!(titles(&results.books), vec!["Dune"]);
        assert_eq!(results.query, "dune");

        assert!(catalog.search(Some("nothing")).await.unwrap().books.is_empty());
        assert!(catalog.search(None).await.unwrap().books.is_empty());
        assert!(catalog.search(Some("   ")).await.unwrap().books.is_empty());
        assert!(catalog.search(Some("\"(")).await.unwrap().books.is_empty());
    }

    #[tokio::test]
    async fn search_is_not_paginated() {
        let names: Vec<String> = (1..=14).map(|n| format!("Saga part {n}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let catalog = catalog_with(&refs).await;

        assert_eq!(catalog.search(Some("saga")).await.unwrap().books.len(), 14);
    }

    #[tokio::test]
    async fn out_of_range_pages_skip_the_book_query() {
        let mut books = MockCatalogStore::new();
        books.expect_count_books().returning(|| Ok(5));
        books.expect_fetch_books().never();
        let mut genres = MockGenreRepository::new();
        genres.expect_list().returning(|| Ok(Vec::new()));

        let catalog = CatalogService::new(Arc::new(books), Arc::new(genres));
        let listing = catalog.list_newest(2).await.unwrap();
        assert_eq!(listing.pages, 1);
        assert!(listing.books.is_empty());
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let mut books = MockCatalogStore::new();
        books
            .expect_count_books()
            .returning(|| Err(StoreError::Database(sqlx::Error::PoolTimedOut)));
        let genres = MockGenreRepository::new();

        let catalog = CatalogService::new(Arc::new(books), Arc::new(genres));
        assert!(matches!(
            catalog.list_a_to_z(1).await,
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        ));
    }
}
