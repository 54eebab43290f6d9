use anyhow::anyhow;
use secrecy::SecretString;
use std::{fmt, future::Future, sync::Arc};
use tracing::{debug, info, instrument};

use super::{
    config::AuthConfig,
    error::AccountError,
    password::PasswordHasher,
    session::{SessionCodec, SessionError},
    store::{NewUser, UserStore, UserView},
    validation::{validate_credentials, validate_new_user, SignInInput, SignUpInput},
};

/// A signed-in user and the token that proves it.
#[derive(Clone)]
pub struct Session {
    pub user: UserView,
    pub token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &"***")
            .finish()
    }
}

/// Sign-up, sign-in and session resolution over a [`UserStore`].
///
/// Holds no per-user state: a session lives entirely in the signed token.
#[derive(Debug)]
pub struct Authenticator {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    sessions: SessionCodec,
    config: AuthConfig,
}

impl Authenticator {
    /// # Errors
    /// Returns an error if the session secret is empty.
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        session_secret: SecretString,
        config: AuthConfig,
    ) -> Result<Self, SessionError> {
        let sessions = SessionCodec::new(session_secret, config.session_ttl_seconds())?;
        Ok(Self {
            store,
            hasher,
            sessions,
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn UserStore> {
        Arc::clone(&self.store)
    }

    /// Register a new user and open a session for it.
    ///
    /// # Errors
    /// Validation errors, `EmailInUse`, or `Internal` for store and hashing failures.
    #[instrument(skip_all)]
    pub async fn sign_up(&self, input: &SignUpInput) -> Result<Session, AccountError> {
        let user = validate_new_user(input)?;

        // Fast path only; the store rejects duplicates on insert as well.
        let existing = self
            .bounded("find user", self.store.find_by_email(&user.email))
            .await?;
        if existing.is_some() {
            debug!("sign-up rejected: email in use");
            return Err(AccountError::EmailInUse);
        }

        let password_hash = self
            .bounded("hash password", self.hasher.hash(&user.password))
            .await?;
        let stored = self
            .bounded(
                "insert user",
                self.store.insert(NewUser {
                    name: user.name,
                    email: user.email,
                    password_hash,
                }),
            )
            .await?;

        info!(user_id = %stored.id, "user signed up");
        self.open_session(stored.view())
    }

    /// Check credentials and open a session.
    ///
    /// Unknown emails still pay for a password verification.
    ///
    /// # Errors
    /// Validation errors, `InvalidCredentials`, or `Internal`.
    #[instrument(skip_all)]
    pub async fn sign_in(&self, input: &SignInInput) -> Result<Session, AccountError> {
        let credentials = validate_credentials(input)?;

        let found = self
            .bounded("find user", self.store.find_by_email(&credentials.email))
            .await?;
        let Some(user) = found else {
            self.bounded(
                "verify password",
                self.hasher.verify_decoy(&credentials.password),
            )
            .await?;
            debug!("sign-in rejected: unknown email");
            return Err(AccountError::InvalidCredentials);
        };

        let matches = self
            .bounded(
                "verify password",
                self.hasher.verify(&user.password_hash, &credentials.password),
            )
            .await?;
        if !matches {
            debug!(user_id = %user.id, "sign-in rejected: wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user signed in");
        self.open_session(user.view())
    }

    /// Resolve the user behind a session token.
    ///
    /// # Errors
    /// `Unauthorized` when the token is absent, forged, malformed or expired.
    pub fn current_user(&self, token: Option<&str>) -> Result<UserView, AccountError> {
        let token = token.ok_or(AccountError::Unauthorized(SessionError::Missing))?;
        let claims = self.sessions.verify(token).map_err(|err| {
            debug!("session rejected: {err}");
            AccountError::Unauthorized(err)
        })?;
        Ok(claims.view())
    }

    /// Sessions are client-held, so signing out only has to be logged; the
    /// handler clears the cookie.
    pub fn sign_out(&self, token: Option<&str>) {
        match token.map(|token| self.sessions.verify(token)) {
            Some(Ok(claims)) => info!(user_id = %claims.id, "user signed out"),
            Some(Err(err)) => debug!("sign-out with unusable session: {err}"),
            None => debug!("sign-out without session"),
        }
    }

    /// Every stored user, oldest first.
    ///
    /// # Errors
    /// `Internal` if the store fails or times out.
    pub async fn list_users(&self) -> Result<Vec<UserView>, AccountError> {
        let users = self.bounded("list users", self.store.list_all()).await?;
        Ok(users.iter().map(|user| user.view()).collect())
    }

    fn open_session(&self, user: UserView) -> Result<Session, AccountError> {
        let token = self.sessions.issue(&user).map_err(|err| {
            AccountError::Internal(anyhow::Error::new(err).context("failed to issue session token"))
        })?;
        Ok(Session { user, token })
    }

    async fn bounded<T, E, F>(&self, operation: &'static str, future: F) -> Result<T, AccountError>
    where
        F: Future<Output = Result<T, E>>,
        AccountError: From<E>,
    {
        tokio::time::timeout(self.config.operation_timeout(), future)
            .await
            .map_err(|_| AccountError::Internal(anyhow!("{operation} timed out")))?
            .map_err(AccountError::from)
    }
}
