//! HS256 session tokens.
//!
//! A token is `base64url(header).base64url(claims).base64url(hmac)`, the
//! compact JWT serialization. Claims are only decoded after the signature has
//! been checked, so a forged payload is never parsed.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};
use thiserror::Error;
use uuid::Uuid;

use super::store::UserView;

type HmacSha256 = Hmac<Sha256>;

const ALG_HS256: &str = "HS256";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("missing session token")]
    Missing,
    #[error("session secret must not be empty")]
    EmptySecret,
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct SessionHeader {
    alg: String,
    typ: String,
}

impl SessionHeader {
    fn hs256() -> Self {
        Self {
            alg: ALG_HS256.to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Identity carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    #[must_use]
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Signs and verifies session tokens with a server-held secret.
pub struct SessionCodec {
    secret: SecretString,
    ttl_seconds: i64,
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec")
            .field("secret", &"***")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl SessionCodec {
    /// # Errors
    /// Returns `EmptySecret` if the secret is empty.
    pub fn new(secret: SecretString, ttl_seconds: i64) -> Result<Self, SessionError> {
        if secret.expose_secret().is_empty() {
            return Err(SessionError::EmptySecret);
        }
        Ok(Self {
            secret,
            ttl_seconds,
        })
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Build claims for `user` valid from `now` for the configured TTL.
    #[must_use]
    pub fn claims_for(&self, user: &UserView, now_unix_seconds: i64) -> SessionClaims {
        SessionClaims {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            iat: now_unix_seconds,
            exp: now_unix_seconds.saturating_add(self.ttl_seconds),
        }
    }

    /// Issue a token for `user` starting now.
    ///
    /// # Errors
    /// Returns an error if the claims cannot be encoded.
    pub fn issue(&self, user: &UserView) -> Result<String, SessionError> {
        self.sign(&self.claims_for(user, now_unix_seconds()))
    }

    /// Sign an explicit claim set.
    ///
    /// # Errors
    /// Returns an error if the header or claims cannot be encoded.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        let header_b64 = b64e_json(&SessionHeader::hs256())?;
        let claims_b64 = b64e_json(claims)?;
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_b64 = Base64UrlUnpadded::encode_string(&signature);

        Ok(format!("{signing_input}.{signature_b64}"))
    }

    /// Verify a token against the current time.
    ///
    /// # Errors
    /// See [`SessionCodec::verify_at`].
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        self.verify_at(token, now_unix_seconds())
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    /// Returns an error if:
    /// - the token is malformed or contains invalid base64/json,
    /// - the header names any algorithm other than HS256,
    /// - the signature does not match,
    /// - `exp` is not after `now_unix_seconds`.
    pub fn verify_at(
        &self,
        token: &str,
        now_unix_seconds: i64,
    ) -> Result<SessionClaims, SessionError> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(SessionError::TokenFormat)?;
        let claims_b64 = parts.next().ok_or(SessionError::TokenFormat)?;
        let sig_b64 = parts.next().ok_or(SessionError::TokenFormat)?;
        if parts.next().is_some() {
            return Err(SessionError::TokenFormat);
        }

        let header: SessionHeader = b64d_json(header_b64)?;
        if header.alg != ALG_HS256 {
            return Err(SessionError::UnsupportedAlg(header.alg));
        }

        let signature = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| SessionError::Base64)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::InvalidSignature)?;

        let claims: SessionClaims = b64d_json(claims_b64)?;
        if claims.exp <= now_unix_seconds {
            return Err(SessionError::Expired);
        }

        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| SessionError::EmptySecret)
    }
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, SessionError> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, SessionError> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| SessionError::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub(crate) fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn codec(secret: &str) -> SessionCodec {
        SessionCodec::new(SecretString::from(secret.to_string()), 3600)
            .unwrap_or_else(|err| panic!("codec: {err}"))
    }

    fn bob() -> UserView {
        UserView {
            id: Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef),
            name: "Bob".to_string(),
            email: "test@test.com".to_string(),
        }
    }

    #[test]
    fn sign_and_verify_round_trip() -> Result<(), SessionError> {
        let codec = codec("adffa");
        let claims = codec.claims_for(&bob(), NOW);
        assert_eq!(claims.exp, NOW + 3600);

        let token = codec.sign(&claims)?;
        assert_eq!(token.split('.').count(), 3);

        let verified = codec.verify_at(&token, NOW)?;
        assert_eq!(verified, claims);
        assert_eq!(verified.view(), bob());
        Ok(())
    }

    #[test]
    fn issue_uses_current_time() -> Result<(), SessionError> {
        let codec = codec("adffa");
        let token = codec.issue(&bob())?;
        let claims = codec.verify(&token)?;
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.email, "test@test.com");
        Ok(())
    }

    #[test]
    fn header_is_standard_hs256() -> Result<(), SessionError> {
        let token = codec("adffa").sign(&codec("adffa").claims_for(&bob(), NOW))?;
        let header_b64 = token.split('.').next().unwrap_or_default();
        let header: SessionHeader = b64d_json(header_b64)?;
        assert_eq!(header, SessionHeader::hs256());
        Ok(())
    }

    #[test]
    fn rejects_empty_secret() {
        let result = SessionCodec::new(SecretString::from(String::new()), 60);
        assert!(matches!(result, Err(SessionError::EmptySecret)));
    }

    #[test]
    fn rejects_other_key() -> Result<(), SessionError> {
        let token = codec("adffa").sign(&codec("adffa").claims_for(&bob(), NOW))?;
        let result = codec("another-key").verify_at(&token, NOW);
        assert!(matches!(result, Err(SessionError::InvalidSignature)));
        Ok(())
    }

    #[test]
    fn rejects_tampered_claims() -> Result<(), SessionError> {
        let codec = codec("adffa");
        let token = codec.sign(&codec.claims_for(&bob(), NOW))?;
        let parts: Vec<&str> = token.split('.').collect();

        let mut forged = codec.claims_for(&bob(), NOW);
        forged.email = "admin@test.com".to_string();
        let forged_b64 = b64e_json(&forged)?;
        let tampered = format!("{}.{}.{}", parts[0], forged_b64, parts[2]);

        let result = codec.verify_at(&tampered, NOW);
        assert!(matches!(result, Err(SessionError::InvalidSignature)));
        Ok(())
    }

    #[test]
    fn rejects_tampered_signature() -> Result<(), SessionError> {
        let codec = codec("adffa");
        let token = codec.sign(&codec.claims_for(&bob(), NOW))?;
        let (signing_input, signature) = token.rsplit_once('.').unwrap_or_default();
        let mut bytes = Base64UrlUnpadded::decode_vec(signature).map_err(|_| SessionError::Base64)?;
        bytes[0] ^= 0x01;
        let tampered = format!("{signing_input}.{}", Base64UrlUnpadded::encode_string(&bytes));

        let result = codec.verify_at(&tampered, NOW);
        assert!(matches!(result, Err(SessionError::InvalidSignature)));
        Ok(())
    }

    #[test]
    fn rejects_alg_none() -> Result<(), SessionError> {
        let codec = codec("adffa");
        let header = b64e_json(&SessionHeader {
            alg: "none".to_string(),
            typ: "JWT".to_string(),
        })?;
        let claims = b64e_json(&codec.claims_for(&bob(), NOW))?;
        let result = codec.verify_at(&format!("{header}.{claims}."), NOW);
        assert!(matches!(result, Err(SessionError::UnsupportedAlg(alg)) if alg == "none"));
        Ok(())
    }

    #[test]
    fn rejects_expired() -> Result<(), SessionError> {
        let codec = codec("adffa");
        let token = codec.sign(&codec.claims_for(&bob(), NOW))?;
        assert!(codec.verify_at(&token, NOW + 3599).is_ok());
        assert!(matches!(
            codec.verify_at(&token, NOW + 3600),
            Err(SessionError::Expired)
        ));
        Ok(())
    }

    #[test]
    fn rejects_malformed() {
        let codec = codec("adffa");
        assert!(matches!(codec.verify_at("", NOW), Err(SessionError::TokenFormat)));
        assert!(matches!(codec.verify_at("a.b", NOW), Err(SessionError::TokenFormat)));
        assert!(matches!(codec.verify_at("a.b.c.d", NOW), Err(SessionError::TokenFormat)));
        assert!(matches!(codec.verify_at("!!.b.c", NOW), Err(SessionError::Base64)));
    }

    #[test]
    fn debug_hides_secret() {
        let debug = format!("{:?}", codec("super-secret"));
        assert!(!debug.contains("super-secret"));
    }
}
