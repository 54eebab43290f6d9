//! JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::auth::AccountError;

/// Body of every failed request: `{"errors":[{"message":..,"field":..}]}`.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub errors: Vec<ErrorMessage>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&AccountError> for ErrorBody {
    fn from(err: &AccountError) -> Self {
        Self {
            errors: vec![ErrorMessage {
                message: err.to_string(),
                field: err.field().map(str::to_string),
            }],
        }
    }
}

#[must_use]
pub const fn status_code(err: &AccountError) -> StatusCode {
    match err {
        AccountError::MissingField(_)
        | AccountError::InvalidType(_)
        | AccountError::InvalidEmail
        | AccountError::WeakPassword
        | AccountError::EmailInUse
        | AccountError::InvalidCredentials
        | AccountError::BadRequest(_) => StatusCode::BAD_REQUEST,
        AccountError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AccountError::NotFound => StatusCode::NOT_FOUND,
        AccountError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        AccountError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(cause) => error!("Request failed: {cause:#}"),
            Self::Unauthorized(cause) => debug!("Unauthorized: {cause}"),
            other => debug!("Request rejected: {other}"),
        }

        (status_code(&self), Json(ErrorBody::from(&self))).into_response()
    }
}
