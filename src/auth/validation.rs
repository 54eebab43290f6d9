//! Input checks for sign-up and sign-in payloads.

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use utoipa::ToSchema;

use super::AccountError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A request body as decoded JSON, before any field is typed.
pub type Payload = Map<String, Value>;

#[derive(ToSchema, Deserialize, Default, Clone)]
pub struct SignUpInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<&Payload> for SignUpInput {
    type Error = AccountError;

    fn try_from(payload: &Payload) -> Result<Self, Self::Error> {
        Ok(Self {
            name: string_field(payload, "name")?,
            email: string_field(payload, "email")?,
            password: string_field(payload, "password")?,
        })
    }
}

#[derive(ToSchema, Deserialize, Default, Clone)]
pub struct SignInInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<&Payload> for SignInInput {
    type Error = AccountError;

    fn try_from(payload: &Payload) -> Result<Self, Self::Error> {
        Ok(Self {
            email: string_field(payload, "email")?,
            password: string_field(payload, "password")?,
        })
    }
}

// Unknown keys are ignored; `null` counts as absent.
fn string_field(payload: &Payload, field: &'static str) -> Result<Option<String>, AccountError> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(AccountError::InvalidType(field)),
    }
}

/// A sign-up payload that passed every check.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidNewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A sign-in payload that passed every check.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignUpInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpInput")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Debug for SignInInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInInput")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Debug for ValidNewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidNewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic mailbox shape check on already-normalized input.
#[must_use]
pub fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

// Blank text counts as missing for name and email.
fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, AccountError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AccountError::MissingField(field)),
    }
}

// Passwords are taken as typed: only an empty string is missing.
fn required_password(value: Option<&str>) -> Result<&str, AccountError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AccountError::MissingField("password")),
    }
}

/// Validate a sign-up payload.
///
/// # Errors
/// `MissingField` for the first absent field (name, email, password order),
/// then `InvalidEmail`, then `WeakPassword`.
pub fn validate_new_user(input: &SignUpInput) -> Result<ValidNewUser, AccountError> {
    let name = required(input.name.as_deref(), "name")?;
    let email = required(input.email.as_deref(), "email")?;
    let password = required_password(input.password.as_deref())?;

    let email = normalize_email(email);
    if !valid_email(&email) {
        return Err(AccountError::InvalidEmail);
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AccountError::WeakPassword);
    }

    Ok(ValidNewUser {
        name: name.trim().to_string(),
        email,
        password: password.to_string(),
    })
}

/// Validate a sign-in payload. Password length is not checked here; the stored
/// hash is the only judge.
///
/// # Errors
/// `MissingField` or `InvalidEmail`.
pub fn validate_credentials(input: &SignInInput) -> Result<Credentials, AccountError> {
    let email = required(input.email.as_deref(), "email")?;
    let password = required_password(input.password.as_deref())?;

    let email = normalize_email(email);
    if !valid_email(&email) {
        return Err(AccountError::InvalidEmail);
    }

    Ok(Credentials {
        email,
        password: password.to_string(),
    })
}
