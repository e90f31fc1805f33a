use crate::modules::genres::models::Genre;
use crate::views::{escape, layout, ViewContext};

pub fn genres_page(ctx: &ViewContext, genres: &[Genre]) -> String {
    let rows: String = if genres.is_empty() {
        "<p class=\"empty\">No genres yet.</p>".to_string()
    } else {
        let items: String = genres
            .iter()
            .map(|genre| {
                let actions = if ctx.user.is_some() {
                    format!(
                        " <a href=\"/edit_genre/{id}\">Edit</a> <a href=\"/delete_genre/{id}\">Delete</a>",
                        id = genre.id
                    )
                } else {
                    String::new()
                };
                format!("<li class=\"genre\">{}{}</li>\n", escape(&genre.name), actions)
            })
            .collect();
        format!("<ul class=\"genres\">\n{items}</ul>")
    };

    layout(ctx, "Genres", &format!("<h1>Genres</h1>\n{rows}"))
}

pub fn add_genre_page(ctx: &ViewContext) -> String {
    layout(ctx, "Add Genre", &genre_form("Add Genre", "/add_genre", ""))
}

pub fn edit_genre_page(ctx: &ViewContext, genre: &Genre) -> String {
    let action = format!("/edit_genre/{}", genre.id);
    layout(ctx, "Edit Genre", &genre_form("Edit Genre", &action, &genre.name))
}

fn genre_form(heading: &str, action: &str, value: &str) -> String {
    format!(
        "<h1>{heading}</h1>\n<form method=\"post\" action=\"{action}\">\n\
         <label for=\"genre_name\">Genre name</label>\n\
         <input id=\"genre_name\" name=\"genre_name\" type=\"text\" required value=\"{value}\">\n\
         <button type=\"submit\">Save</button>\n</form>",
        heading = escape(heading),
        action = escape(action),
        value = escape(value),
    )
}
