pub mod errors;
pub mod keyed;

pub use errors::DigestError;
pub use keyed::TokenHasher;
