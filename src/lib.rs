//! # Accounts
//!
//! `accounts` is a small user-account service: sign-up, sign-in, cookie-backed
//! current-user lookup and sign-out.
//!
//! ## Credentials
//!
//! Passwords are hashed with Argon2id before they reach the store. Sign-in
//! collapses "unknown email" and "wrong password" into the same
//! `InvalidCredentials` answer, and both paths pay for one full hash
//! verification.
//!
//! ## Sessions
//!
//! A session is an HS256-signed token carrying `{id, email, name, iat, exp}`.
//! Nothing is kept server-side; the token lives in an `HttpOnly` cookie and
//! signing out only clears that cookie. Missing, tampered or expired tokens
//! answer `401 Unauthorized`.
//!
//! ## Storage
//!
//! Users live behind the [`auth::UserStore`] trait. `PostgreSQL` is the
//! production backend and relies on a unique index for email uniqueness; an
//! in-memory backend exists for tests and local runs.

pub mod api;
pub mod auth;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
