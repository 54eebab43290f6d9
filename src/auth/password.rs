//! Argon2id password hashing.
//!
//! Hashes are PHC strings carrying their own salt and parameters, so cost
//! changes only affect new hashes. All work runs on the blocking pool.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::SaltString, Algorithm, Argon2, Params, PasswordHash,
    PasswordHasher as _, PasswordVerifier, Version,
};
use rand::rngs::OsRng;
use std::{fmt, sync::Arc};
use tokio::task;

// Never a real password: it only exists to burn the same CPU on unknown emails.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    decoy_hash: Arc<str>,
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// Hasher with the Argon2 crate's default cost (19 MiB, 2 passes, 1 lane).
    ///
    /// # Errors
    /// Returns an error if the decoy hash cannot be computed.
    pub fn new() -> Result<Self> {
        Self::with_params(Params::default())
    }

    /// Hasher with explicit Argon2 cost parameters.
    ///
    /// # Errors
    /// Returns an error if the parameters are out of range.
    pub fn with_cost(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|err| anyhow!("invalid Argon2 parameters: {err}"))?;
        Self::with_params(params)
    }

    fn with_params(params: Params) -> Result<Self> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let decoy_hash = hash_with(&argon2, DECOY_PASSWORD)?;
        Ok(Self {
            argon2,
            decoy_hash: Arc::from(decoy_hash),
        })
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error if hashing fails or the blocking task is cancelled.
    pub async fn hash(&self, plaintext: &str) -> Result<String> {
        let argon2 = self.argon2.clone();
        let plaintext = plaintext.to_owned();
        task::spawn_blocking(move || hash_with(&argon2, &plaintext))
            .await
            .context("password hashing task failed")?
    }

    /// Check a candidate password against a stored hash.
    ///
    /// A malformed stored hash never verifies.
    ///
    /// # Errors
    /// Returns an error only if the blocking task is cancelled.
    pub async fn verify(&self, stored_hash: &str, candidate: &str) -> Result<bool> {
        let argon2 = self.argon2.clone();
        let stored_hash = stored_hash.to_owned();
        let candidate = candidate.to_owned();
        task::spawn_blocking(move || verify_with(&argon2, &stored_hash, &candidate))
            .await
            .context("password verification task failed")
    }

    /// Run a full verification against the decoy hash and discard the result.
    ///
    /// # Errors
    /// Returns an error only if the blocking task is cancelled.
    pub async fn verify_decoy(&self, candidate: &str) -> Result<()> {
        let decoy_hash = Arc::clone(&self.decoy_hash);
        self.verify(&decoy_hash, candidate).await.map(|_| ())
    }
}

fn hash_with(argon2: &Argon2<'_>, plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?
        .to_string();
    Ok(hash)
}

fn verify_with(argon2: &Argon2<'_>, stored_hash: &str, candidate: &str) -> bool {
    PasswordHash::new(stored_hash).is_ok_and(|parsed| {
        argon2
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    })
}
