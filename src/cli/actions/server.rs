use crate::{
    api,
    auth::{AuthConfig, Authenticator, MemoryUserStore, PasswordHasher, PgUserStore, UserStore},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{fmt, sync::Arc, time::Duration};
use tracing::{info, warn};
use url::Url;

pub enum StoreBackend {
    Postgres { dsn: String },
    Memory,
}

impl fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres { dsn } => f
                .debug_struct("Postgres")
                .field("dsn", &redact_dsn(dsn))
                .finish(),
            Self::Memory => f.write_str("Memory"),
        }
    }
}

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub store: StoreBackend,
    pub jwt_key: SecretString,
    pub session_ttl_seconds: i64,
    pub cookie_secure: bool,
    pub request_timeout_seconds: u64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the store cannot be reached or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let store: Arc<dyn UserStore> = match &args.store {
        StoreBackend::Postgres { dsn } => {
            info!("Using PostgreSQL user store at {}", redact_dsn(dsn));
            let store = PgUserStore::connect(dsn).await?;
            store
                .ensure_schema()
                .await
                .context("Failed to create users schema")?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory user store; users are lost on restart");
            Arc::new(MemoryUserStore::new())
        }
    };

    let config = AuthConfig::new()
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_session_cookie_secure(args.cookie_secure)
        .with_operation_timeout(Duration::from_secs(args.request_timeout_seconds));

    let hasher = PasswordHasher::new()?;
    let authenticator = Authenticator::new(store, hasher, args.jwt_key, config)
        .context("Invalid session signing key")?;

    api::new(args.port, Arc::new(authenticator)).await
}

/// DSN with any password replaced, safe for logs.
fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<unparsable dsn>".to_string(),
    }
}
