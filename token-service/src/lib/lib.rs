pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use domain::token;
pub use outbound::repositories;

// Re-export commonly used types
pub use domain::token::errors::TokenError;
pub use domain::token::models::*;
pub use domain::token::service::RotationManager;
pub use domain::token::service::RotationSettings;
