//! SurrealDB implementation of [`TrackerRepository`].
//!
//! Toggle transitions are single conditional `UPDATE` statements; the
//! number of rows they return tells the caller whether the transition
//! applied.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};
use updeight_core::error::UpdeightResult;
use updeight_core::models::tracker::{CreateTracker, Tracker, UpdateTracker};
use updeight_core::repository::TrackerRepository;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct TrackerRow {
    client_id: String,
    member_id: String,
    is_toggled_on: bool,
    last_toggled_on: DateTime<Utc>,
    created_for: DateTime<Utc>,
    before_duration: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TrackerRow {
    fn try_into_tracker(self, id: Uuid) -> Result<Tracker, DbError> {
        Ok(Tracker {
            id,
            client_id: parse_uuid("client", &self.client_id)?,
            member_id: parse_uuid("member", &self.member_id)?,
            is_toggled_on: self.is_toggled_on,
            last_toggled_on: self.last_toggled_on,
            created_for: self.created_for,
            before_duration: self.before_duration,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct TrackerRowWithId {
    record_id: String,
    client_id: String,
    member_id: String,
    is_toggled_on: bool,
    last_toggled_on: DateTime<Utc>,
    created_for: DateTime<Utc>,
    before_duration: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TrackerRowWithId {
    fn try_into_tracker(self) -> Result<Tracker, DbError> {
        let id = parse_uuid("tracker", &self.record_id)?;
        TrackerRow {
            client_id: self.client_id,
            member_id: self.member_id,
            is_toggled_on: self.is_toggled_on,
            last_toggled_on: self.last_toggled_on,
            created_for: self.created_for,
            before_duration: self.before_duration,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_tracker(id)
    }
}

/// SurrealDB implementation of the Tracker repository.
#[derive(Clone)]
pub struct SurrealTrackerRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTrackerRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn list_where(
        &self,
        filter: &str,
        member_id: Uuid,
        bounds: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> UpdeightResult<Vec<Tracker>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM tracker \
             WHERE member_id = $member_id {filter} \
             ORDER BY created_for ASC, created_at ASC"
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("member_id", member_id.to_string()));
        if let Some((from, to)) = bounds {
            builder = builder.bind(("from", from)).bind(("to", to));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<TrackerRowWithId> = result.take(0).map_err(DbError::from)?;

        let trackers = rows
            .into_iter()
            .map(|row| row.try_into_tracker())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(trackers)
    }
}

impl<C: Connection> TrackerRepository for SurrealTrackerRepository<C> {
    async fn create(&self, input: CreateTracker) -> UpdeightResult<Tracker> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('tracker', $id) SET \
                 client_id = $client_id, member_id = $member_id, \
                 is_toggled_on = $is_toggled_on, \
                 last_toggled_on = $last_toggled_on, \
                 created_for = $created_for, \
                 before_duration = 0",
            )
            .bind(("id", id_str.clone()))
            .bind(("client_id", input.client_id.to_string()))
            .bind(("member_id", input.member_id.to_string()))
            .bind(("is_toggled_on", input.is_toggled_on))
            .bind(("last_toggled_on", input.last_toggled_on))
            .bind(("created_for", input.created_for))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("tracker", e))?;

        let rows: Vec<TrackerRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("tracker", id_str))?;

        info!(tracker_id = %id, member_id = %input.member_id, "Tracker created");
        row.try_into_tracker(id).map_err(Into::into)
    }

    async fn get_owned(&self, id: Uuid, member_id: Uuid) -> UpdeightResult<Tracker> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('tracker', $id) \
                 WHERE member_id = $member_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("member_id", member_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TrackerRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("tracker", id_str))?;

        row.try_into_tracker(id).map_err(Into::into)
    }

    async fn list_by_member(&self, member_id: Uuid) -> UpdeightResult<Vec<Tracker>> {
        self.list_where("", member_id, None).await
    }

    async fn list_by_member_between(
        &self,
        member_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> UpdeightResult<Vec<Tracker>> {
        self.list_where(
            "AND created_for >= $from AND created_for <= $to",
            member_id,
            Some((from, to)),
        )
        .await
    }

    async fn toggle_on(&self, id: Uuid, member_id: Uuid, now: DateTime<Utc>) -> UpdeightResult<u64> {
        let result = self
            .db
            .query(
                "UPDATE type::record('tracker', $id) SET \
                 is_toggled_on = true, \
                 last_toggled_on = $now, \
                 updated_at = time::now() \
                 WHERE member_id = $member_id AND is_toggled_on = false",
            )
            .bind(("id", id.to_string()))
            .bind(("member_id", member_id.to_string()))
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("tracker", e))?;

        let rows: Vec<TrackerRow> = result.take(0).map_err(DbError::from)?;
        debug!(tracker_id = %id, applied = rows.len(), "Toggle on");
        Ok(rows.len() as u64)
    }

    async fn toggle_off(
        &self,
        id: Uuid,
        member_id: Uuid,
        observed_last_toggled_on: DateTime<Utc>,
        now: DateTime<Utc>,
        elapsed_ms: i64,
    ) -> UpdeightResult<u64> {
        let result = self
            .db
            .query(
                "UPDATE type::record('tracker', $id) SET \
                 is_toggled_on = false, \
                 last_toggled_on = $now, \
                 before_duration += $elapsed, \
                 updated_at = time::now() \
                 WHERE member_id = $member_id \
                 AND is_toggled_on = true \
                 AND last_toggled_on = $observed",
            )
            .bind(("id", id.to_string()))
            .bind(("member_id", member_id.to_string()))
            .bind(("observed", observed_last_toggled_on))
            .bind(("now", now))
            .bind(("elapsed", elapsed_ms))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("tracker", e))?;

        let rows: Vec<TrackerRow> = result.take(0).map_err(DbError::from)?;
        debug!(tracker_id = %id, applied = rows.len(), elapsed_ms, "Toggle off");
        Ok(rows.len() as u64)
    }

    async fn update(&self, id: Uuid, member_id: Uuid, input: UpdateTracker) -> UpdeightResult<u64> {
        let mut sets = Vec::new();
        if input.client_id.is_some() {
            sets.push("client_id = $client_id");
        }
        if input.created_for.is_some() {
            sets.push("created_for = $created_for");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('tracker', $id) SET {} \
             WHERE member_id = $member_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("member_id", member_id.to_string()));
        if let Some(client_id) = input.client_id {
            builder = builder.bind(("client_id", client_id.to_string()));
        }
        if let Some(created_for) = input.created_for {
            builder = builder.bind(("created_for", created_for));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("tracker", e))?;

        let rows: Vec<TrackerRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }

    async fn delete(&self, id: Uuid, member_id: Uuid) -> UpdeightResult<u64> {
        let mut result = self
            .db
            .query(
                "DELETE type::record('tracker', $id) \
                 WHERE member_id = $member_id RETURN BEFORE",
            )
            .bind(("id", id.to_string()))
            .bind(("member_id", member_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TrackerRow> = result.take(0).map_err(DbError::from)?;
        let deleted = rows.len() as u64;

        if deleted > 0 {
            info!(tracker_id = %id, "Tracker deleted");
        }
        Ok(deleted)
    }
}
