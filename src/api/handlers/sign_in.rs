use axum::{extract::Extension, http::StatusCode, response::Json, response::Response};
use std::sync::Arc;
use tracing::instrument;

use super::{session::session_response, EMPTY_BODY};
use crate::{
    api::ErrorBody,
    auth::{AccountError, Authenticator, Payload, SignInInput, UserView},
};

#[utoipa::path(
    post,
    path = "/api/users/sign-in",
    request_body = SignInInput,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = UserView,
            headers(("set-cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Missing field or invalid credentials", body = ErrorBody)
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn sign_in(
    authenticator: Extension<Arc<Authenticator>>,
    payload: Option<Json<Payload>>,
) -> Result<Response, AccountError> {
    let input = match payload {
        Some(Json(payload)) if !payload.is_empty() => SignInInput::try_from(&payload)?,
        _ => return Err(AccountError::BadRequest(EMPTY_BODY.to_string())),
    };

    let session = authenticator.sign_in(&input).await?;
    session_response(StatusCode::OK, authenticator.config(), session)
}
