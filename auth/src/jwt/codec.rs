use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::AccessTokenClaims;
use super::errors::JwtError;
use crate::clock::Clock;

/// Signed access token together with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Stateless signer and verifier for short-lived access tokens.
///
/// Tokens are HS512 JWTs carrying [`AccessTokenClaims`]. Signing and
/// verification are pure CPU work over the secret and the injected clock, so a
/// single codec can be shared by any number of tasks without locking.
pub struct AccessTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for AccessTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenCodec")
            .field("algorithm", &Self::ALGORITHM)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl AccessTokenCodec {
    /// Minimum accepted secret length for HS512.
    pub const MIN_SECRET_LENGTH: usize = 32;

    const ALGORITHM: Algorithm = Algorithm::HS512;

    /// Create a new codec.
    ///
    /// # Arguments
    /// * `secret` - Symmetric signing secret (at least 32 bytes)
    /// * `ttl` - Lifetime of issued tokens
    /// * `clock` - Time source for issue and expiry checks
    ///
    /// # Errors
    /// * `WeakSecret` - Secret shorter than 32 bytes
    pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Result<Self, JwtError> {
        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(JwtError::WeakSecret {
                min: Self::MIN_SECRET_LENGTH,
                actual: secret.len(),
            });
        }

        // Time checks are done against the injected clock in `verify`, so the
        // library only checks structure, algorithm and signature.
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
            clock,
        })
    }

    /// Lifetime of tokens issued by this codec.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a new access token for `user_id`.
    ///
    /// # Returns
    /// Serialized token and its expiry instant
    ///
    /// # Errors
    /// * `EncodingFailed` - Key or serialization failure
    pub fn sign(&self, user_id: &str) -> Result<SignedAccessToken, JwtError> {
        let claims = AccessTokenClaims::new(user_id, self.clock.now(), self.ttl);
        let header = Header::new(Self::ALGORITHM);

        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))?;

        Ok(SignedAccessToken {
            token,
            expires_at: claims.expires_at(),
        })
    }

    /// Verify a token and return the user identifier it carries.
    ///
    /// # Errors
    /// * `TokenExpired` - Signature is valid but the token is past `exp`
    /// * `InvalidToken` - Bad signature, wrong algorithm, malformed structure,
    ///   missing claim, or not yet valid
    pub fn verify(&self, token: &str) -> Result<String, JwtError> {
        let claims = self.decode(token)?;
        let now = self.clock.now();

        if claims.is_premature(now) {
            return Err(JwtError::InvalidToken("token not yet valid".to_string()));
        }

        if claims.is_expired(now) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims.user_id)
    }

    /// Check signature and structure without looking at the validity window.
    ///
    /// # Errors
    /// * `InvalidToken` - Any signature or structural failure
    pub fn decode(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

        if token_data.claims.user_id.is_empty() {
            return Err(JwtError::InvalidToken("empty user_id claim".to_string()));
        }

        Ok(token_data.claims)
    }
}
