//! Error types for the Updeight system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdeightError {
    /// Input was well-formed but refers to something that does not
    /// exist from the caller's point of view (e.g. an unknown invite
    /// code).
    #[error("{message}")]
    BadRequest { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// No valid session, or an identity operation on someone else.
    #[error("{reason}")]
    Unauthorized { reason: String },

    /// Absent, or outside the caller's organizations. The id is kept
    /// for logging only and is not part of the display text.
    #[error("{entity} not found")]
    NotFound { entity: String, id: String },

    #[error("{entity} already exists")]
    AlreadyExists { entity: String },

    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UpdeightError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    /// `true` for errors raised by the store or crypto layers rather
    /// than by a domain rule.
    pub fn is_unexpected(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Crypto(_) | Self::Internal(_)
        )
    }
}

pub type UpdeightResult<T> = Result<T, UpdeightError>;
