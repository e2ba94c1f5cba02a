//! Guest password hashing.
//!
//! Guests pick a password when posting and reuse it to edit or delete their
//! message. Only an Argon2 PHC string is stored; verification reads the
//! parameters back out of the hash, so rows hashed with different costs verify
//! the same way.

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Algorithm, Argon2, Params, PasswordHash, Version};
use rand::rngs::OsRng;

use crate::celebration_msg::errors::CelebrationMsgError;

#[derive(Clone, Default)]
pub struct CredentialHasher {
    argon: Argon2<'static>,
}

impl CredentialHasher {
    /// Argon2id with explicit costs.
    pub fn with_params(params: Params) -> Self {
        Self { argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params) }
    }

    pub fn hash(&self, password: &str) -> Result<String, CelebrationMsgError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| CelebrationMsgError::Store(format!("password hashing failed: {e}")))
    }
}

/// Constant-time check of `password` against a stored PHC hash.
/// A malformed hash never matches.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
pub(crate) fn cheap_hasher() -> CredentialHasher {
    CredentialHasher::with_params(Params::new(256, 1, 1, None).expect("valid argon2 params"))
}
