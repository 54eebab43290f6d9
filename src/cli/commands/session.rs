use anyhow::{Context, Result};
use clap::{builder::BoolishValueParser, Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_JWT_KEY: &str = "jwt-key";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";
pub const ARG_REQUEST_TIMEOUT_SECONDS: &str = "request-timeout-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_KEY)
                .long(ARG_JWT_KEY)
                .help("Secret used to sign session tokens")
                .env("ACCOUNTS_JWT_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session token and cookie lifetime in seconds")
                .env("ACCOUNTS_SESSION_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Mark the session cookie Secure (serve over HTTPS)")
                .env("ACCOUNTS_COOKIE_SECURE")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        )
        .arg(
            Arg::new(ARG_REQUEST_TIMEOUT_SECONDS)
                .long(ARG_REQUEST_TIMEOUT_SECONDS)
                .help("Upper bound for a single store call or password hash, in seconds")
                .env("ACCOUNTS_REQUEST_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub jwt_key: SecretString,
    pub session_ttl_seconds: i64,
    pub cookie_secure: bool,
    pub request_timeout_seconds: u64,
}

impl Options {
    /// # Errors
    /// Returns an error if a required session argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let jwt_key = matches
            .get_one::<String>(ARG_JWT_KEY)
            .cloned()
            .context("missing required argument: --jwt-key")?;

        Ok(Self {
            jwt_key: SecretString::from(jwt_key),
            session_ttl_seconds: matches
                .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(86_400),
            cookie_secure: matches.get_flag(ARG_COOKIE_SECURE),
            request_timeout_seconds: matches
                .get_one::<u64>(ARG_REQUEST_TIMEOUT_SECONDS)
                .copied()
                .unwrap_or(10),
        })
    }
}
