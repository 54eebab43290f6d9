//! Route handlers for the accounts API.

pub mod current_user;
pub mod health;
pub mod session;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod users;


use axum::{
    http::{header::ALLOW, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::auth::AccountError;

pub(crate) const EMPTY_BODY: &str = "Request body must not be empty";

/// Fallback for paths no route matches.
pub async fn not_found(uri: Uri) -> AccountError {
    debug!("No route for {}", uri.path());
    AccountError::NotFound
}

/// Rewrite axum's bare 405 into the JSON error body, keeping the `Allow` header.
pub async fn method_not_allowed(method: Method, response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(ALLOW).cloned();
    let mut rewritten = AccountError::MethodNotAllowed(method.to_string()).into_response();
    if let Some(allow) = allow {
        rewritten.headers_mut().insert(ALLOW, allow);
    }
    rewritten
}
