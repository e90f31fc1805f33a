use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils;

/// Whether a stored link is safe to render as an `href`/`src`: an absolute http(s) URL.
pub fn is_web_url(value: &str) -> bool {
    url::Url::parse(value).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Store-assigned book identifier. Ids only grow, so id order is creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct BookId(pub i64);

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The on/off upvote marker attached to a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Upvote {
    On,
    #[default]
    Off,
}

impl Upvote {
    pub fn is_on(self) -> bool {
        self == Upvote::On
    }
}

/// A catalogued book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Book {
    /// Unique identifier for the book
    pub id: BookId,
    /// Title of the book; also used as a lookup key in URLs
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Name of the genre (not a reference to a genre id)
    pub genre_name: String,
    pub image_url: String,
    pub description: String,
    /// Where the book can be bought
    pub buy_url: String,
    pub is_upvoted: Upvote,
    /// Username of whoever added the book
    pub created_by: String,
    /// Reviews in the order they were written; only loaded on the book page
    #[sqlx(skip)]
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// A user's review of a book. At most one per user and book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub username: String,
    pub description: String,
}

/// The editable fields of a book, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub genre_name: String,
    pub image_url: String,
    pub description: String,
    pub buy_url: String,
    pub is_upvoted: Upvote,
}

/// Submitted add/edit book form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookForm {
    pub genre_name: Option<String>,
    pub book_name: Option<String>,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub buy_url: Option<String>,
    pub is_upvoted: Option<String>,
}

impl BookForm {
    /// Validate the form. On failure, returns one message per offending field.
    pub fn into_draft(self) -> Result<BookDraft, Vec<String>> {
        let draft = BookDraft {
            title: utils::field(&self.book_name),
            author: utils::field(&self.author),
            genre_name: utils::field(&self.genre_name),
            image_url: utils::field(&self.image_url),
            description: utils::field(&self.description),
            buy_url: utils::field(&self.buy_url),
            is_upvoted: if utils::checkbox(&self.is_upvoted) {
                Upvote::On
            } else {
                Upvote::Off
            },
        };

        let mut errors = utils::require(&[("book_name", &draft.title), ("author", &draft.author)]);
        for (name, value) in [("image_url", &draft.image_url), ("buy_url", &draft.buy_url)] {
            if !value.is_empty() && !is_web_url(value) {
                errors.push(format!("{name} must be an http or https URL"));
            }
        }

        if errors.is_empty() {
            Ok(draft)
        } else {
            Err(errors)
        }
    }
}

/// Submitted review form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewForm {
    pub review: Option<String>,
}

/// Search box submission; the field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchForm {
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_becomes_draft() {
        let form = BookForm {
            book_name: Some(" Dune ".to_string()),
            author: Some("Frank Herbert".to_string()),
            genre_name: Some("Sci-Fi".to_string()),
            is_upvoted: Some("on".to_string()),
            ..Default::default()
        };

        let draft = form.into_draft().unwrap();
        assert_eq!(draft.title, "Dune");
        assert_eq!(draft.is_upvoted, Upvote::On);
        assert_eq!(draft.buy_url, "");
    }

    #[test]
    fn missing_title_and_author_are_reported() {
        let errors = BookForm::default().into_draft().unwrap_err();
        assert_eq!(
            errors,
            vec!["book_name is required".to_string(), "author is required".to_string()]
        );
    }

    #[test]
    fn unticked_checkbox_is_off() {
        let form = BookForm {
            book_name: Some("Emma".to_string()),
            author: Some("Jane Austen".to_string()),
            ..Default::default()
        };
        assert_eq!(form.into_draft().unwrap().is_upvoted, Upvote::Off);
    }

    #[test]
    fn links_must_be_http_or_https() {
        let form = BookForm {
            book_name: Some("Dune".to_string()),
            author: Some("Frank Herbert".to_string()),
            image_url: Some("data:text/html,<script>alert(1)</script>".to_string()),
            buy_url: Some("javascript:alert(document.cookie)".to_string()),
            ..Default::default()
        };
        assert_eq!(
            form.into_draft().unwrap_err(),
            vec![
                "image_url must be an http or https URL".to_string(),
                "buy_url must be an http or https URL".to_string(),
            ]
        );

        let form = BookForm {
            book_name: Some("Dune".to_string()),
            author: Some("Frank Herbert".to_string()),
            image_url: Some("http://covers.example.com/dune.jpg".to_string()),
            buy_url: Some("https://shop.example.com/dune".to_string()),
            ..Default::default()
        };
        assert_eq!(form.into_draft().unwrap().buy_url, "https://shop.example.com/dune");
    }

    #[test]
    fn relative_and_script_links_are_not_web_urls() {
        assert!(is_web_url("https://example.com"));
        assert!(!is_web_url("JavaScript:alert(1)"));
        assert!(!is_web_url("/bookpage/Dune"));
        assert!(!is_web_url(""));
    }
}
