use axum::{extract::Extension, http::HeaderMap, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::session::extract_session_token;
use crate::{
    api::ErrorBody,
    auth::{AccountError, Authenticator, UserView},
};

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CurrentUserResponse {
    #[serde(rename = "currentUser")]
    pub current_user: UserView,
}

#[utoipa::path(
    get,
    path = "/api/users/current-user",
    responses(
        (status = 200, description = "User behind the session", body = CurrentUserResponse),
        (status = 401, description = "No session, or the session is invalid or expired", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn current_user(
    headers: HeaderMap,
    authenticator: Extension<Arc<Authenticator>>,
) -> Result<Json<CurrentUserResponse>, AccountError> {
    let token = extract_session_token(&headers);
    let current_user = authenticator.current_user(token.as_deref())?;
    Ok(Json(CurrentUserResponse { current_user }))
}
