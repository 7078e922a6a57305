//! Auth cookie construction and parsing.
//!
//! The access token cookie is sent on every request (`Path=/`); the refresh
//! token cookie is scoped to the refresh endpoint so it never travels with
//! normal API calls. Both are `HttpOnly` and `SameSite=Strict`, and marked
//! `Secure` when the app origin is served over HTTPS.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{InvalidHeaderValue, SET_COOKIE},
};

use super::state::AuthConfig;

pub(crate) const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub(crate) const REFRESH_TOKEN_COOKIE: &str = "refreshToken";
const REFRESH_TOKEN_PATH: &str = "/auth/refresh";

pub(super) fn access_token_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = config.access_token_ttl_seconds();
    let mut cookie = format!(
        "{ACCESS_TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age}"
    );
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(super) fn refresh_token_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = config.session_ttl_seconds();
    let mut cookie = format!(
        "{REFRESH_TOKEN_COOKIE}={token}; Path={REFRESH_TOKEN_PATH}; HttpOnly; SameSite=Strict; Max-Age={max_age}"
    );
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_access_token_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{ACCESS_TOKEN_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_refresh_token_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{REFRESH_TOKEN_COOKIE}=; Path={REFRESH_TOKEN_PATH}; HttpOnly; SameSite=Strict; Max-Age=0"
    );
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Set-Cookie headers for both auth cookies after register/login.
pub(super) fn auth_cookies(
    config: &AuthConfig,
    access_token: &str,
    refresh_token: &str,
) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    headers.append(SET_COOKIE, access_token_cookie(config, access_token)?);
    headers.append(SET_COOKIE, refresh_token_cookie(config, refresh_token)?);
    Ok(headers)
}

/// Set-Cookie headers clearing both auth cookies.
/// Header construction from fixed strings cannot fail, so this is infallible.
pub(super) fn clear_auth_cookies(config: &AuthConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = clear_access_token_cookie(config) {
        headers.append(SET_COOKIE, cookie);
    }
    if let Ok(cookie) = clear_refresh_token_cookie(config) {
        headers.append(SET_COOKIE, cookie);
    }
    headers
}

/// Extract a cookie value from the request `Cookie` header.
/// Pairs without `=` are skipped so one malformed segment never hides the rest.
pub(crate) fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let Some((key, val)) = pair.trim().split_once('=') else {
            continue;
        };
        if key.trim() == name {
            return Some(val.trim().to_string());
        }
    }
    None
}
