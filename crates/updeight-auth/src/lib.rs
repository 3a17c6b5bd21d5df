//! Updeight Auth — credential hashing, the session store and the two
//! session expiry mechanisms (per-session timers and the daily sweep).

pub mod config;
pub mod error;
pub mod password;
pub mod scheduler;
pub mod session;
pub mod sweep;

pub use config::AuthConfig;
pub use error::AuthError;
pub use password::{Argon2Credentials, CredentialVerifier};
pub use scheduler::ExpiryScheduler;
pub use session::SessionStore;
pub use sweep::spawn_daily_sweep;
