use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::SealError;

/// Slow, salted at-rest protection for refresh tokens.
///
/// Produces an Argon2id PHC string with a fresh random salt per call. The
/// output is not deterministic and therefore never usable as a lookup key: it
/// is checked only after a record has been found by its keyed digest.
#[derive(Debug, Default, Clone)]
pub struct TokenSealer {
    argon2: Argon2<'static>,
}

impl TokenSealer {
    /// Create a sealer with Argon2id default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seal a plaintext token.
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `SealingFailed` - Hashing operation failed
    pub fn seal(&self, plaintext: &str) -> Result<String, SealError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| SealError::SealingFailed(e.to_string()))
    }

    /// Check a plaintext token against a stored seal.
    ///
    /// # Errors
    /// * `MalformedSeal` - Stored value is not a PHC string
    pub fn verify(&self, plaintext: &str, seal: &str) -> Result<bool, SealError> {
        let parsed = PasswordHash::new(seal).map_err(|e| SealError::MalformedSeal(e.to_string()))?;

        Ok(self
            .argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok())
    }
}
