use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use super::session::{clear_session_cookie, extract_session_token};
use crate::auth::Authenticator;

/// Serialized as `{}`.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct SignedOut {}

#[utoipa::path(
    post,
    path = "/api/users/sign-out",
    responses(
        (status = 200, description = "Session cookie cleared", body = SignedOut,
            headers(("set-cookie" = String, description = "Expired session cookie")))
    ),
    tag = "users"
)]
pub async fn sign_out(
    headers: HeaderMap,
    authenticator: Extension<Arc<Authenticator>>,
) -> impl IntoResponse {
    let token = extract_session_token(&headers);
    authenticator.sign_out(token.as_deref());

    // Always clear the cookie, even without a usable session.
    let mut response_headers = HeaderMap::new();
    match clear_session_cookie(authenticator.config()) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build clearing cookie: {err}"),
    }
    (StatusCode::OK, response_headers, Json(SignedOut::default()))
}
