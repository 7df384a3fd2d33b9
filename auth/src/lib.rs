//! Token cryptography library
//!
//! Provides the stateless building blocks of the token service:
//! - Access token signing and verification (HS512 JWT)
//! - Keyed lookup digests for refresh tokens (HMAC-SHA256)
//! - Optional at-rest seals for refresh tokens (Argon2id)
//! - Opaque refresh token generation
//! - An injectable clock
//!
//! Nothing here performs I/O; storage and orchestration live in the service.
//!
//! # Examples
//!
//! ## Access Tokens
//! ```
//! use std::sync::Arc;
//!
//! use auth::{AccessTokenCodec, SystemClock};
//! use chrono::Duration;
//!
//! let codec = AccessTokenCodec::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     Duration::minutes(15),
//!     Arc::new(SystemClock),
//! )
//! .unwrap();
//! let signed = codec.sign("user-123").unwrap();
//! let user_id = codec.verify(&signed.token).unwrap();
//! assert_eq!(user_id, "user-123");
//! ```
//!
//! ## Refresh Tokens
//! ```
//! use auth::{generate_refresh_token, TokenHasher};
//!
//! let hasher = TokenHasher::new(b"digest_key_at_least_32_bytes_long!").unwrap();
//! let token = generate_refresh_token().unwrap();
//! let digest = hasher.digest(&token).unwrap();
//! assert!(hasher.verify(&token, &digest).unwrap());
//! ```

pub mod clock;
pub mod digest;
pub mod jwt;
pub mod refresh;
pub mod seal;

// Re-export commonly used items
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use digest::DigestError;
pub use digest::TokenHasher;
pub use jwt::AccessTokenClaims;
pub use jwt::AccessTokenCodec;
pub use jwt::JwtError;
pub use jwt::SignedAccessToken;
pub use refresh::generate_refresh_token;
pub use refresh::RefreshTokenError;
pub use seal::SealError;
pub use seal::TokenSealer;
