pub mod memory;
pub mod refresh_token;

pub use memory::InMemoryRefreshTokenStore;
pub use refresh_token::PostgresRefreshTokenStore;
