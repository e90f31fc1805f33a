//! HTML for book listings, the book page and the add/edit forms.

use crate::modules::books::catalog::{Listing, SearchResults, SortOrder};
use crate::modules::books::models::{is_web_url, Book};
use crate::modules::genres::models::Genre;
use crate::views::{escape, layout, path_segment, ViewContext};

/// What the shared listing template renders.
///
/// `pages` is `None` for search results, which carry the `post` flag instead of
/// pagination links.
struct BookList<'a> {
    heading: &'a str,
    books: &'a [Book],
    genres: &'a [Genre],
    pages: Option<u32>,
    order: Option<SortOrder>,
    page: i64,
    post: bool,
}

pub fn listing_page(ctx: &ViewContext, listing: &Listing) -> String {
    book_list(
        ctx,
        &BookList {
            heading: listing.order.label(),
            books: &listing.books,
            genres: &listing.genres,
            pages: Some(listing.pages),
            order: Some(listing.order),
            page: listing.page,
            post: false,
        },
    )
}

pub fn search_page(ctx: &ViewContext, results: &SearchResults) -> String {
    let heading = if results.query.is_empty() {
        "Search".to_string()
    } else {
        format!("Results for \"{}\"", results.query)
    };
    book_list(
        ctx,
        &BookList {
            heading: &heading,
            books: &results.books,
            genres: &results.genres,
            pages: None,
            order: None,
            page: 1,
            post: true,
        },
    )
}

fn book_list(ctx: &ViewContext, view: &BookList<'_>) -> String {
    let books = if view.books.is_empty() {
        let message = if view.post {
            "No books matched your search."
        } else {
            "No books on this page."
        };
        format!("<p class=\"empty\">{message}</p>")
    } else {
        let cards: String = view.books.iter().map(book_card).collect();
        format!("<ul class=\"books\">\n{cards}</ul>")
    };

    let pagination = match (view.pages, view.order) {
        (Some(pages), Some(order)) if pages > 0 => pagination(order, pages, view.page),
        _ => String::new(),
    };

    let content = format!(
        "<section class=\"catalog\" data-post=\"{post}\">\n<h1>{heading}</h1>\n{books}\n{pagination}</section>\n{sidebar}",
        post = view.post,
        heading = escape(view.heading),
        sidebar = genre_sidebar(view.genres),
    );
    layout(ctx, view.heading, &content)
}

fn book_card(book: &Book) -> String {
    let upvoted = if book.is_upvoted.is_on() {
        " <span class=\"upvoted\">&#9650;</span>"
    } else {
        ""
    };
    let image = if !is_web_url(&book.image_url) {
        String::new()
    } else {
        format!(
            "<img src=\"{}\" alt=\"{}\"> ",
            escape(&book.image_url),
            escape(&book.title)
        )
    };
    format!(
        "<li class=\"book\">{image}<a href=\"/bookpage/{segment}\">{title}</a> \
         <span class=\"author\">{author}</span> <span class=\"genre\">{genre}</span>{upvoted}</li>\n",
        segment = path_segment(&book.title),
        title = escape(&book.title),
        author = escape(&book.author),
        genre = escape(&book.genre_name),
    )
}

fn pagination(order: SortOrder, pages: u32, current: i64) -> String {
    let links: String = (1..=pages)
        .map(|page| {
            if i64::from(page) == current {
                format!("<li class=\"current\">{page}</li>")
            } else {
                format!("<li><a href=\"{}/{page}\">{page}</a></li>", order.path())
            }
        })
        .collect();
    format!("<nav class=\"pagination\"><ul>{links}</ul></nav>\n")
}

fn genre_sidebar(genres: &[Genre]) -> String {
    let items: String = genres
        .iter()
        .map(|genre| format!("<li>{}</li>", escape(&genre.name)))
        .collect();
    format!("<aside class=\"genres\">\n<h2>Genres</h2>\n<ul>{items}</ul>\n</aside>")
}

pub fn book_page(ctx: &ViewContext, book: &Book) -> String {
    let reviews = if book.reviews.is_empty() {
        "<p class=\"empty\">No reviews yet.</p>".to_string()
    } else {
        let items: String = book
            .reviews
            .iter()
            .map(|review| {
                format!(
                    "<li class=\"review\"><strong>{}</strong>: {}</li>\n",
                    escape(&review.username),
                    escape(&review.description)
                )
            })
            .collect();
        format!("<ul class=\"reviews\">\n{items}</ul>")
    };

    let segment = path_segment(&book.title);
    let actions = match &ctx.user {
        Some(_) => format!(
            "<p class=\"actions\"><a href=\"/edit_book/{segment}/{id}\">Edit</a> \
             <a href=\"/delete_book/{segment}/{id}\">Delete</a></p>\n\
             <form method=\"post\" action=\"/bookpage/{segment}\">\n\
             <label for=\"review\">Your review</label>\n\
             <textarea id=\"review\" name=\"review\" required></textarea>\n\
             <button type=\"submit\">Post review</button>\n</form>",
            id = book.id,
        ),
        None => "<p><a href=\"/login\">Log in</a> to write a review.</p>".to_string(),
    };

    let buy = if !is_web_url(&book.buy_url) {
        String::new()
    } else {
        format!("<p><a class=\"buy\" href=\"{}\">Buy</a></p>\n", escape(&book.buy_url))
    };

    let content = format!(
        "<article class=\"book\">\n<h1>{title}</h1>\n<p class=\"author\">by {author}</p>\n\
         <p class=\"genre\">{genre}</p>\n<p class=\"description\">{description}</p>\n\
         <p class=\"added-by\">Added by {created_by}</p>\n{buy}</article>\n\
         <section>\n<h2>Reviews</h2>\n{reviews}\n{actions}\n</section>",
        title = escape(&book.title),
        author = escape(&book.author),
        genre = escape(&book.genre_name),
        description = escape(&book.description),
        created_by = escape(&book.created_by),
    );
    layout(ctx, &book.title, &content)
}

pub fn add_book_page(ctx: &ViewContext, genres: &[Genre]) -> String {
    layout(
        ctx,
        "Add Book",
        &book_form("Add Book", "/add_book", None, genres),
    )
}

pub fn edit_book_page(ctx: &ViewContext, book: &Book, genres: &[Genre]) -> String {
    let action = format!("/edit_book/{}/{}", path_segment(&book.title), book.id);
    layout(
        ctx,
        "Edit Book",
        &book_form("Edit Book", &action, Some(book), genres),
    )
}

fn book_form(heading: &str, action: &str, book: Option<&Book>, genres: &[Genre]) -> String {
    let value = |pick: fn(&Book) -> &str| book.map(pick).map(escape).unwrap_or_default();
    let selected_genre = book.map(|b| b.genre_name.as_str()).unwrap_or_default();

    let options: String = genres
        .iter()
        .map(|genre| {
            let selected = if genre.name == selected_genre {
                " selected"
            } else {
                ""
            };
            format!(
                "<option value=\"{name}\"{selected}>{name}</option>",
                name = escape(&genre.name)
            )
        })
        .collect();

    let checked = if book.is_some_and(|b| b.is_upvoted.is_on()) {
        " checked"
    } else {
        ""
    };

    format!(
        "<h1>{heading}</h1>\n<form method=\"post\" action=\"{action}\">\n\
         <label for=\"genre_name\">Genre</label>\n\
         <select id=\"genre_name\" name=\"genre_name\">{options}</select>\n\
         <label for=\"book_name\">Title</label>\n\
         <input id=\"book_name\" name=\"book_name\" type=\"text\" required value=\"{title}\">\n\
         <label for=\"author\">Author</label>\n\
         <input id=\"author\" name=\"author\" type=\"text\" required value=\"{author}\">\n\
         <label for=\"image_url\">Image URL</label>\n\
         <input id=\"image_url\" name=\"image_url\" type=\"url\" value=\"{image_url}\">\n\
         <label for=\"description\">Description</label>\n\
         <textarea id=\"description\" name=\"description\">{description}</textarea>\n\
         <label for=\"buy_url\">Buy URL</label>\n\
         <input id=\"buy_url\" name=\"buy_url\" type=\"url\" value=\"{buy_url}\">\n\
         <label><input name=\"is_upvoted\" type=\"checkbox\" value=\"on\"{checked}> Upvote</label>\n\
         <button type=\"submit\">Save</button>\n</form>",
        heading = escape(heading),
        action = escape(action),
        title = value(|b| b.title.as_str()),
        author = value(|b| b.author.as_str()),
        image_url = value(|b| b.image_url.as_str()),
        description = value(|b| b.description.as_str()),
        buy_url = value(|b| b.buy_url.as_str()),
    )
}
