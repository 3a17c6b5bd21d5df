//! Updeight Server — axum HTTP surface over the domain services.
//!
//! Sessions travel in a private cookie; [`middleware::require_member`]
//! resolves it once per request. Errors become failure envelopes in
//! [`error::ApiError`].

pub mod config;
pub mod cookie;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{CookieConfig, ServerConfig};
pub use cookie::SessionCookie;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
