//! Middleware de la aplicación

pub mod auth;
pub mod cors;

pub use auth::{auth_middleware, AuthenticatedUser};
pub use cors::{cors_middleware, cors_middleware_with_origins};
