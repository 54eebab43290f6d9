use axum::{extract::Extension, response::Json};
use std::sync::Arc;
use tracing::instrument;

use crate::{
    api::ErrorBody,
    auth::{AccountError, Authenticator, UserView},
};

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Every registered user", body = [UserView]),
        (status = 405, description = "Method not allowed", body = ErrorBody)
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn list_users(
    authenticator: Extension<Arc<Authenticator>>,
) -> Result<Json<Vec<UserView>>, AccountError> {
    Ok(Json(authenticator.list_users().await?))
}
