//! Server configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, then `UPDEIGHT_`-prefixed environment variables with nested
//! keys separated by `__` (e.g. `UPDEIGHT_DB__URL`).

use std::net::SocketAddr;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;
use thiserror::Error;
use tower_cookies::Key;
use tracing::warn;
use updeight_auth::{AuthConfig, AuthError};
use updeight_db::DbConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Invalid cookie key: {0}")]
    CookieKey(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub cookie: CookieConfig,
    pub db: DbConfig,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            cookie: CookieConfig::default(),
            db: DbConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load and validate the configuration. A missing file is not an
    /// error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path).extract()?;
        config.auth.validate()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("UPDEIGHT_").split("__"))
    }
}

/// Session cookie settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    /// Base64 encoded key of at least 64 bytes used to encrypt and
    /// authenticate the cookie.
    pub key: Option<String>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "session".into(),
            secure: false,
            key: None,
        }
    }
}

impl CookieConfig {
    /// Decode the configured key, or generate a fresh one when none is
    /// set. Cookies issued under a generated key do not survive a
    /// restart.
    pub fn key(&self) -> Result<Key, ConfigError> {
        let Some(encoded) = &self.key else {
            warn!("No cookie key configured, generating an ephemeral one");
            return Ok(Key::generate());
        };

        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ConfigError::CookieKey(e.to_string()))?;
        Key::try_from(bytes.as_slice()).map_err(|e| ConfigError::CookieKey(e.to_string()))
    }
}
