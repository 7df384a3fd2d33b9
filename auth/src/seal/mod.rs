pub mod argon2id;
pub mod errors;

pub use argon2id::TokenSealer;
pub use errors::SealError;
