//! Page layout shared by every rendered view.
//!
//! Views are plain functions from typed data to an HTML string; handlers wrap the
//! result in [`axum::response::Html`].

use bookshelf_authz::MaybeUser;
use bookshelf_http::flash::Flash;
pub use bookshelf_http::html::{escape, path_segment};

/// Request-scoped data every page needs: who is logged in, and the pending flash message.
#[derive(Debug, Clone, Default)]
pub struct ViewContext {
    pub user: Option<String>,
    pub flash: Option<String>,
}

impl ViewContext {
    pub fn new(user: Option<&str>, flash: &Flash) -> Self {
        Self {
            user: user.map(str::to_string),
            flash: flash.message().map(str::to_string),
        }
    }

    pub fn from_maybe(user: &MaybeUser, flash: &Flash) -> Self {
        Self::new(user.username(), flash)
    }
}

/// Wrap page content in the site chrome: navigation, search box, and flash message.
pub fn layout(ctx: &ViewContext, title: &str, content: &str) -> String {
    let account_links = match &ctx.user {
        Some(user) => format!(
            "<li><a href=\"/add_book\">Add Book</a></li>\n\
             <li><a href=\"/add_genre\">Add Genre</a></li>\n\
             <li><a href=\"/profile/{segment}\">Profile</a></li>\n\
             <li><a href=\"/logout\">Log Out</a></li>",
            segment = path_segment(user),
        ),
        None => "<li><a href=\"/login\">Log In</a></li>\n\
                 <li><a href=\"/register\">Register</a></li>"
            .to_string(),
    };

    let flash = ctx
        .flash
        .as_deref()
        .map(|message| format!("<div class=\"flash\">{}</div>\n", escape(message)))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} | Bookshelf</title>\n</head>\n<body>\n<header>\n<nav>\n<ul>\n\
         <li><a href=\"/\">New Books</a></li>\n\
         <li><a href=\"/get_books/a-to-z\">A-Z</a></li>\n\
         <li><a href=\"/get_books/z-to-a\">Z-A</a></li>\n\
         <li><a href=\"/get_genres\">Genres</a></li>\n\
         {account_links}\n</ul>\n</nav>\n\
         <form class=\"search\" action=\"/search\" method=\"post\">\n\
         <input type=\"text\" name=\"query\" placeholder=\"Search books\" aria-label=\"Search books\">\n\
         <button type=\"submit\">Search</button>\n</form>\n</header>\n\
         {flash}<main>\n{content}\n</main>\n</body>\n</html>\n",
        title = escape(title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_layout_offers_login() {
        let page = layout(&ViewContext::default(), "Books", "<p>hi</p>");
        assert!(page.contains("<title>Books | Bookshelf</title>"));
        assert!(page.contains("href=\"/login\""));
        assert!(!page.contains("href=\"/logout\""));
        assert!(page.contains("<p>hi</p>"));
    }

    #[test]
    fn logged_in_layout_shows_account_links_and_flash() {
        let ctx = ViewContext {
            user: Some("ada".to_string()),
            flash: Some("Welcome, <Ada>".to_string()),
        };
        let page = layout(&ctx, "Profile", "");
        assert!(page.contains("href=\"/profile/ada\""));
        assert!(page.contains("href=\"/add_book\""));
        assert!(page.contains("<div class=\"flash\">Welcome, &lt;Ada&gt;</div>"));
    }
}
