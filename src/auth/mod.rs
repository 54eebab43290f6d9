//! Credential and session authentication.
//!
//! Leaves first: [`validation`] and [`password`] are pure helpers, [`store`]
//! persists users, [`session`] signs and verifies session tokens, and
//! [`Authenticator`] composes them into sign-up, sign-in and current-user flows.

mod authenticator;
mod config;
mod error;
pub mod password;
pub mod session;
pub mod store;
pub mod validation;

pub use self::authenticator::{Authenticator, Session};
pub use self::config::AuthConfig;
pub use self::error::AccountError;
pub use self::password::PasswordHasher;
pub use self::session::{SessionClaims, SessionCodec, SessionError};
pub use self::store::{MemoryUserStore, NewUser, PgUserStore, StoreError, User, UserStore, UserView};
pub use self::validation::{Payload, SignInInput, SignUpInput};
