use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;

use super::errors::DigestError;

type HmacSha256 = Hmac<Sha256>;

/// Keyed one-way digest used as the storage lookup key for refresh tokens.
///
/// The digest is deterministic for a given server key, so a presented token
/// can be re-hashed and looked up directly. The server key plays the role of a
/// salt shared by every record: a leaked digest table cannot be reversed or
/// matched without it.
#[derive(Clone)]
pub struct TokenHasher {
    key: Vec<u8>,
}

impl std::fmt::Debug for TokenHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenHasher").finish_non_exhaustive()
    }
}

impl TokenHasher {
    /// Minimum accepted key length.
    pub const MIN_KEY_LENGTH: usize = 32;

    /// Create a hasher with a server-side key.
    ///
    /// # Errors
    /// * `WeakKey` - Key shorter than 32 bytes
    pub fn new(key: &[u8]) -> Result<Self, DigestError> {
        if key.len() < Self::MIN_KEY_LENGTH {
            return Err(DigestError::WeakKey {
                min: Self::MIN_KEY_LENGTH,
                actual: key.len(),
            });
        }

        Ok(Self { key: key.to_vec() })
    }

    /// Compute the lookup digest of a plaintext token.
    ///
    /// # Returns
    /// Lowercase hex HMAC-SHA256 (64 characters)
    pub fn digest(&self, plaintext: &str) -> Result<String, DigestError> {
        let mac = self.mac_for(plaintext)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Check a plaintext token against a stored digest in constant time.
    ///
    /// A digest that is not valid hex never matches.
    pub fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, DigestError> {
        let Ok(expected) = hex::decode(digest) else {
            return Ok(false);
        };

        let mac = self.mac_for(plaintext)?;
        Ok(mac.verify_slice(&expected).is_ok())
    }

    fn mac_for(&self, plaintext: &str) -> Result<HmacSha256, DigestError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| DigestError::ComputationFailed(e.to_string()))?;
        mac.update(plaintext.as_bytes());
        Ok(mac)
    }
}
