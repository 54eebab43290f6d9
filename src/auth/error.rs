use thiserror::Error;

use super::{session::SessionError, store::StoreError};

/// Every failure a request can end in.
///
/// The HTTP mapping lives in `api::error`; `Internal` never exposes its cause to clients.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0} must be a string")]
    InvalidType(&'static str),
    #[error("Invalid contact email address")]
    InvalidEmail,
    #[error("A password must be at least 6 characters long")]
    WeakPassword,
    #[error("Email in use")]
    EmailInUse,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),
    #[error("Unauthorized")]
    Unauthorized(#[source] SessionError),
    #[error("{0}")]
    BadRequest(String),
    #[error("Not found")]
    NotFound,
    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AccountError {
    /// Name of the offending input field, when the error is about one.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField(field) | Self::InvalidType(field) => Some(*field),
            Self::InvalidEmail | Self::EmailInUse => Some("email"),
            Self::WeakPassword => Some("password"),
            _ => None,
        }
    }
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmailInUse => Self::EmailInUse,
            StoreError::Database(err) => Self::Internal(anyhow::Error::new(err)),
        }
    }
}
