//! Minimal cookie plumbing for the session and flash cookies.

use axum::http::{header, HeaderMap, HeaderValue};

/// Attributes applied to every cookie the application sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieAttrs {
    /// `Max-Age` in seconds; `None` makes a browser-session cookie
    pub max_age: Option<u64>,
    pub secure: bool,
}

/// Read a cookie from the request's `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Build a `Set-Cookie` value. `value` must already be cookie-safe.
pub fn set_cookie(name: &str, value: &str, attrs: CookieAttrs) -> Option<HeaderValue> {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax");
    if let Some(max_age) = attrs.max_age {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    if attrs.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

/// Build a `Set-Cookie` value that removes the cookie.
pub fn clear_cookie(name: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"))
        .unwrap_or_else(|_| HeaderValue::from_static("invalid=; Max-Age=0"))
}
