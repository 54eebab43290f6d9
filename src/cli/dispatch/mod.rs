//! Map parsed CLI arguments to the action the binary runs.

use crate::cli::actions::{
    server::{Args, StoreBackend},
    Action,
};
use crate::cli::commands::{session, ARG_DSN, ARG_IN_MEMORY, ARG_PORT};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(4001);

    let store = if matches.get_flag(ARG_IN_MEMORY) {
        StoreBackend::Memory
    } else {
        let dsn = matches
            .get_one::<String>(ARG_DSN)
            .cloned()
            .context("missing required argument: --dsn")?;
        StoreBackend::Postgres { dsn }
    };

    let session_opts = session::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        store,
        jwt_key: session_opts.jwt_key,
        session_ttl_seconds: session_opts.session_ttl_seconds,
        cookie_secure: session_opts.cookie_secure,
        request_timeout_seconds: session_opts.request_timeout_seconds,
    }))
}
