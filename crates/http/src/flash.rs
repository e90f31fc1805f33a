//! One-shot flash messages carried in a cookie across a redirect.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::cookies::{clear_cookie, cookie_value, set_cookie, CookieAttrs};

pub const FLASH_COOKIE: &str = "flash";

/// The flash message sent by the previous response, if any.
#[derive(Debug, Clone, Default)]
pub struct Flash(Option<String>);

impl Flash {
    pub fn message(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Attach the rendered page, clearing the cookie once the message has been shown.
    pub fn consume(self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if self.0.is_some() {
            response
                .headers_mut()
                .append(header::SET_COOKIE, clear_cookie(FLASH_COOKIE));
        }
        response
    }
}

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let message = cookie_value(&parts.headers, FLASH_COOKIE)
            .and_then(|encoded| URL_SAFE_NO_PAD.decode(encoded).ok())
            .and_then(|bytes| String::from_utf8(bytes).ok());
        Ok(Flash(message))
    }
}

/// Redirect (303) to `location`, leaving `message` for the next page to show.
pub fn redirect_with_flash(location: &str, message: &str) -> Response {
    let mut response = Redirect::to(location).into_response();
    let encoded = URL_SAFE_NO_PAD.encode(message.as_bytes());
    if let Some(cookie) = set_cookie(FLASH_COOKIE, &encoded, CookieAttrs::default()) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}
