use axum::{extract::Extension, http::StatusCode, response::Json, response::Response};
use std::sync::Arc;
use tracing::instrument;

use super::{session::session_response, EMPTY_BODY};
use crate::{
    api::ErrorBody,
    auth::{AccountError, Authenticator, Payload, SignUpInput, UserView},
};

#[utoipa::path(
    post,
    path = "/api/users/sign-up",
    request_body = SignUpInput,
    responses(
        (status = 201, description = "User created; session cookie set", body = UserView,
            headers(("set-cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Missing or invalid field, or email in use", body = ErrorBody)
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn sign_up(
    authenticator: Extension<Arc<Authenticator>>,
    payload: Option<Json<Payload>>,
) -> Result<Response, AccountError> {
    let input = match payload {
        Some(Json(payload)) if !payload.is_empty() => SignUpInput::try_from(&payload)?,
        _ => return Err(AccountError::BadRequest(EMPTY_BODY.to_string())),
    };

    let session = authenticator.sign_up(&input).await?;
    session_response(StatusCode::CREATED, authenticator.config(), session)
}
