//! Authentication error types.

use thiserror::Error;
use updeight_core::error::UpdeightError;

/// Message returned whenever a request carries no usable session.
pub const SESSION_REQUIRED: &str = "Session not found, please login.";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Both collapse into one error so
    /// callers cannot tell which field was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("Session not found, please login.")]
    SessionRequired,

    #[error("cryptography error: {0}")]
    Crypto(String),

    #[error("invalid auth configuration: {0}")]
    Config(String),
}

impl From<AuthError> for UpdeightError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => UpdeightError::not_found("member", "credentials"),
            AuthError::SessionRequired => UpdeightError::unauthorized(SESSION_REQUIRED),
            AuthError::Crypto(msg) => UpdeightError::Crypto(msg),
            AuthError::Config(msg) => UpdeightError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_credentials_look_like_a_missing_member() {
        let err: UpdeightError = AuthError::InvalidCredentials.into();
        assert_eq!(err.to_string(), "member not found");
    }

    #[test]
    fn missing_session_is_unauthorized() {
        let err: UpdeightError = AuthError::SessionRequired.into();
        assert!(matches!(err, UpdeightError::Unauthorized { .. }));
        assert_eq!(err.to_string(), SESSION_REQUIRED);
    }
}
