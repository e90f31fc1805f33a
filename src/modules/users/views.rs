use crate::views::{escape, layout, ViewContext};

pub fn register_page(ctx: &ViewContext) -> String {
    layout(
        ctx,
        "Register",
        &credentials_form("Register", "/register", "Create account"),
    )
}

pub fn login_page(ctx: &ViewContext) -> String {
    layout(ctx, "Log In", &credentials_form("Log In", "/login", "Log in"))
}

pub fn profile_page(ctx: &ViewContext, username: &str) -> String {
    let content = format!(
        "<h1>{username}'s Profile</h1>\n\
         <p><a href=\"/add_book\">Add a book</a> or <a href=\"/get_books/new_books\">browse the newest books</a>.</p>",
        username = escape(username),
    );
    layout(ctx, "Profile", &content)
}

fn credentials_form(heading: &str, action: &str, submit: &str) -> String {
    format!(
        "<h1>{heading}</h1>\n<form method=\"post\" action=\"{action}\">\n\
         <label for=\"username\">Username</label>\n\
         <input id=\"username\" name=\"username\" type=\"text\" required autocomplete=\"username\">\n\
         <label for=\"password\">Password</label>\n\
         <input id=\"password\" name=\"password\" type=\"password\" required>\n\
         <button type=\"submit\">{submit}</button>\n</form>"
    )
}
