//! Refresh token cookie handling

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const REFRESH_COOKIE: &str = "refreshToken";

/// HttpOnly, SameSite=Strict cookie carrying the refresh token
pub fn refresh_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .path("/")
        .build()
}

/// Expired, empty `refreshToken` cookie; path must match the one used when setting it
pub fn clear_refresh_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((REFRESH_COOKIE, "")).path("/").http_only(true).build();
    cookie.make_removal();
    cookie
}

/// Refresh token from the request cookies, if any
pub fn refresh_token_from(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
