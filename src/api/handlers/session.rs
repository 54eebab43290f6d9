//! Session cookie and bearer token plumbing shared by the handlers.

use anyhow::anyhow;
use axum::{
    http::{
        header::{InvalidHeaderValue, AUTHORIZATION, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Json, Response},
};

use crate::auth::{AccountError, AuthConfig, Session};

pub const SESSION_COOKIE_NAME: &str = "session";

/// Build the `HttpOnly` cookie carrying a session token.
///
/// # Errors
/// Returns an error if the token contains bytes not allowed in a header.
pub fn session_cookie(config: &AuthConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build a cookie that makes the browser drop the session.
///
/// # Errors
/// Never in practice; the value is static apart from the `Secure` flag.
pub fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Respond with the session's user and set the session cookie.
///
/// # Errors
/// `Internal` if the cookie header cannot be built.
pub fn session_response(
    status: StatusCode,
    config: &AuthConfig,
    session: Session,
) -> Result<Response, AccountError> {
    let cookie = session_cookie(config, &session.token)
        .map_err(|err| AccountError::Internal(anyhow!("failed to build session cookie: {err}")))?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok((status, headers, Json(session.user)).into_response())
}

/// Session token from `Authorization: Bearer` or, failing that, the session cookie.
#[must_use]
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let Some((key, val)) = pair.trim().split_once('=') else {
                continue;
            };
            if key.trim() == SESSION_COOKIE_NAME && !val.trim().is_empty() {
                return Some(val.trim().to_string());
            }
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(name: axum::http::HeaderName, value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn cookie_attributes() {
        let config = AuthConfig::new().with_session_ttl_seconds(60);
        let cookie = session_cookie(&config, "a.b.c").map(|v| v.to_str().map(str::to_string));
        assert_eq!(
            cookie.ok().and_then(Result::ok).as_deref(),
            Some("session=a.b.c; Path=/; HttpOnly; SameSite=Lax; Max-Age=60")
        );
    }

    #[test]
    fn secure_flag_when_configured() {
        let config = AuthConfig::new().with_session_cookie_secure(true);
        let cookie = session_cookie(&config, "t").ok();
        assert!(cookie.is_some_and(|v| v.to_str().is_ok_and(|s| s.ends_with("; Secure"))));

        let cleared = clear_session_cookie(&config).ok();
        assert!(cleared.is_some_and(|v| v.to_str().is_ok_and(|s| s.contains("Max-Age=0"))));
    }

    #[test]
    fn reads_cookie_among_others() {
        let headers = headers_with(COOKIE, "theme=dark; session=abc.def.ghi; lang=en");
        assert_eq!(extract_session_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn empty_cookie_is_no_session() {
        let headers = headers_with(COOKIE, "session=; theme=dark");
        assert_eq!(extract_session_token(&headers), None);
        assert_eq!(extract_session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn bearer_wins_over_cookie() {
        let mut headers = headers_with(AUTHORIZATION, "Bearer from.header.token");
        headers.insert(COOKIE, HeaderValue::from_static("session=from.cookie.token"));
        assert_eq!(extract_session_token(&headers).as_deref(), Some("from.header.token"));
    }

    #[test]
    fn blank_bearer_ignored() {
        let headers = headers_with(AUTHORIZATION, "Bearer   ");
        assert_eq!(extract_session_token(&headers), None);
    }
}
