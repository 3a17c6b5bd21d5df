//! Authentication configuration.

use chrono::Duration;
use serde::Deserialize;

use crate::error::AuthError;

/// Upper bound on `session_lifetime_secs`: one year.
pub const MAX_SESSION_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration for sessions and password handling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Session lifetime in seconds (default: 604_800 = 7 days).
    pub session_lifetime_secs: u64,
    /// Local hour (0-23) at which the daily expiry sweep runs
    /// (default: 23).
    pub sweep_hour: u32,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    pub min_password_length: usize,
}

impl AuthConfig {
    /// Reject values the session store cannot honour.
    pub fn validate(&self) -> Result<(), AuthError> {
        if !(1..=MAX_SESSION_LIFETIME_SECS).contains(&self.session_lifetime_secs) {
            return Err(AuthError::Config(format!(
                "session_lifetime_secs must be between 1 and {MAX_SESSION_LIFETIME_SECS}, got {}",
                self.session_lifetime_secs
            )));
        }
        if self.sweep_hour > 23 {
            return Err(AuthError::Config(format!(
                "sweep_hour must be between 0 and 23, got {}",
                self.sweep_hour
            )));
        }
        Ok(())
    }

    /// The configured lifetime, clamped to `1..=MAX_SESSION_LIFETIME_SECS`.
    pub fn session_lifetime(&self) -> Duration {
        let secs = self.session_lifetime_secs.clamp(1, MAX_SESSION_LIFETIME_SECS);
        Duration::seconds(secs as i64)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_lifetime_secs: 604_800,
            sweep_hour: 23,
            pepper: None,
            min_password_length: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use updeight_core::models::session::SESSION_LIFETIME;

    use super::*;

    #[test]
    fn default_lifetime_matches_session_model() {
        assert_eq!(AuthConfig::default().session_lifetime(), SESSION_LIFETIME);
    }

    #[test]
    fn defaults_are_valid() {
        assert!(AuthConfig::default().validate().is_ok());
    }

    #[test]
    fn oversized_lifetime_is_rejected_and_clamped() {
        let config = AuthConfig {
            session_lifetime_secs: u64::MAX,
            ..AuthConfig::default()
        };
        assert!(matches!(config.validate(), Err(AuthError::Config(_))));
        assert_eq!(
            config.session_lifetime(),
            Duration::seconds(MAX_SESSION_LIFETIME_SECS as i64)
        );
    }

    #[test]
    fn zero_lifetime_and_bad_sweep_hour_are_rejected() {
        let zero = AuthConfig {
            session_lifetime_secs: 0,
            ..AuthConfig::default()
        };
        assert!(zero.validate().is_err());

        let late = AuthConfig {
            sweep_hour: 24,
            ..AuthConfig::default()
        };
        assert!(late.validate().is_err());
    }
}
