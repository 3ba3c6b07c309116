//! Trigger Authentication - Bearer Secret Check
//!
//! The scheduled trigger and the seed endpoint require
//! `Authorization: Bearer <secret>`, compared against a secret loaded
//! from the environment. Both sides are reduced to SHA-256 digests and
//! compared without early exit, so response timing does not depend on
//! how much of the secret matched.

use anyhow::{Context, Result};

/// Verifier for the configured bearer secret.
pub struct TriggerAuth {
    secret_digest: [u8; 32],
}

impl TriggerAuth {
    /// Build from a secret value.
    ///
    /// # Errors
    /// Rejects an empty secret.
    pub fn new(secret: &str) -> Result<Self> {
        anyhow::ensure!(!secret.is_empty(), "Trigger secret must not be empty");
        Ok(Self {
            secret_digest: hmac_sha256::Hash::hash(secret.as_bytes()),
        })
    }

    /// Load the secret from the named environment variable.
    pub fn from_env(var: &str) -> Result<Self> {
        let secret = std::env::var(var).with_context(|| format!("{var} not set"))?;
        Self::new(&secret)
    }

    /// Check an `Authorization` header value.
    pub fn verify(&self, header: Option<&str>) -> bool {
        let Some(token) = header.and_then(|h| h.strip_prefix("Bearer ")) else {
            return false;
        };
        let digest = hmac_sha256::Hash::hash(token.trim().as_bytes());
        digest
            .iter()
            .zip(self.secret_digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}
