//! Database-specific error types and conversions.

use updeight_core::error::UpdeightError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated on {entity}")]
    AlreadyExists { entity: String },
}

impl DbError {
    /// Classifies a failed statement. Unique index violations become
    /// [`DbError::AlreadyExists`]; everything else is a query failure.
    pub(crate) fn from_check(entity: &str, err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            Self::AlreadyExists {
                entity: entity.to_string(),
            }
        } else {
            Self::Query(message)
        }
    }

    pub(crate) fn not_found(entity: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }
}

pub(crate) fn parse_uuid(field: &str, value: &str) -> Result<uuid::Uuid, DbError> {
    uuid::Uuid::parse_str(value).map_err(|e| DbError::Corrupt(format!("invalid {field} UUID: {e}")))
}

impl From<DbError> for UpdeightError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => UpdeightError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => UpdeightError::AlreadyExists { entity },
            other => UpdeightError::Database(other.to_string()),
        }
    }
}
