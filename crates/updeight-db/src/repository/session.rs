//! SurrealDB implementation of [`SessionRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};
use updeight_core::error::UpdeightResult;
use updeight_core::models::session::{CreateSession, Session};
use updeight_core::repository::SessionRepository;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct SessionRow {
    member_id: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

fn row_to_session(row: SessionRow, id: Uuid) -> Result<Session, DbError> {
    Ok(Session {
        id,
        member_id: parse_uuid("member", &row.member_id)?,
        expires_at: row.expires_at,
        created_at: row.created_at,
    })
}

#[derive(Debug, SurrealValue)]
struct SessionRowWithId {
    record_id: String,
    member_id: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl SessionRowWithId {
    fn try_into_session(self) -> Result<Session, DbError> {
        let id = parse_uuid("session", &self.record_id)?;
        row_to_session(
            SessionRow {
                member_id: self.member_id,
                expires_at: self.expires_at,
                created_at: self.created_at,
            },
            id,
        )
    }
}

/// SurrealDB implementation of the Session repository.
#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn create(&self, input: CreateSession) -> UpdeightResult<Session> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // Both timestamps are bound so `expires_at - created_at` is exact.
        let result = self
            .db
            .query(
                "CREATE type::record('session', $id) SET \
                 member_id = $member_id, \
                 created_at = $created_at, \
                 expires_at = $expires_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("member_id", input.member_id.to_string()))
            .bind(("created_at", input.created_at))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("session", e))?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("session", id_str))?;

        debug!(session_id = %id, member_id = %input.member_id, "Session stored");
        row_to_session(row, id).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> UpdeightResult<Session> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('session', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("session", id_str))?;

        row_to_session(row, id).map_err(Into::into)
    }

    async fn list_all(&self) -> UpdeightResult<Vec<Session>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM session ORDER BY expires_at ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;

        let sessions = rows
            .into_iter()
            .map(|row| row.try_into_session())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(sessions)
    }

    async fn delete(&self, id: Uuid) -> UpdeightResult<u64> {
        let mut result = self
            .db
            .query("DELETE type::record('session', $id) RETURN BEFORE")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> UpdeightResult<u64> {
        let mut result = self
            .db
            .query("DELETE session WHERE expires_at <= $now RETURN BEFORE")
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let deleted = rows.len() as u64;

        if deleted > 0 {
            info!(deleted, "Expired sessions removed");
        }
        Ok(deleted)
    }
}
