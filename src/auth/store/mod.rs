//! Persistence for user records.

mod memory;
mod postgres;

pub use self::memory::MemoryUserStore;
pub use self::postgres::PgUserStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// A stored user. The password hash never leaves the auth module.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"***")
            .finish()
    }
}

impl User {
    #[must_use]
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public projection of a user.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// A user about to be inserted; `email` is already normalized.
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"***")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already in use")]
    EmailInUse,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The user collection.
///
/// Implementations must be safe to call from concurrent requests and must
/// enforce email uniqueness themselves: a caller's `find_by_email` check before
/// `insert` is only a fast path.
#[async_trait]
pub trait UserStore: Send + Sync + fmt::Debug {
    /// Look up a user by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a user, assigning its id.
    ///
    /// Returns `StoreError::EmailInUse` if the email is already taken.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Snapshot of every user, oldest first.
    async fn list_all(&self) -> Result<Vec<User>, StoreError>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}
