//! Tracker service.
//!
//! Trackers belong to exactly one member, who alone can read or change
//! them. Toggle transitions are conditional writes: a toggle that finds
//! the tracker in the wrong state changes nothing.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use updeight_core::authz;
use updeight_core::error::{UpdeightError, UpdeightResult};
use updeight_core::models::member::Member;
use updeight_core::models::tracker::{CreateTracker, Tracker, UpdateTracker, truncate_to_day};
use updeight_core::repository::{ClientRepository, TrackerRepository};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrackerInput {
    pub client_id: Uuid,
    pub created_for: DateTime<Utc>,
    #[serde(default)]
    pub is_toggled_on: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrackerInput {
    pub created_for: Option<DateTime<Utc>>,
    pub client_id: Option<Uuid>,
}

/// Inclusive `[from, to]` bounds of a calendar month in UTC, or of the
/// whole year when `month` is `None`.
pub fn month_bounds(year: i32, month: Option<u32>) -> UpdeightResult<(DateTime<Utc>, DateTime<Utc>)> {
    let invalid_year = || UpdeightError::validation(format!("year {year} is out of range"));

    let (first, next) = match month {
        Some(month) if !(1..=12).contains(&month) => {
            return Err(UpdeightError::validation("month must be between 1 and 12"));
        }
        Some(12) => (
            NaiveDate::from_ymd_opt(year, 12, 1),
            NaiveDate::from_ymd_opt(year.checked_add(1).ok_or_else(invalid_year)?, 1, 1),
        ),
        Some(month) => (
            NaiveDate::from_ymd_opt(year, month, 1),
            NaiveDate::from_ymd_opt(year, month + 1, 1),
        ),
        None => (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year.checked_add(1).ok_or_else(invalid_year)?, 1, 1),
        ),
    };

    let first = first.ok_or_else(invalid_year)?;
    let next = next.ok_or_else(invalid_year)?;

    let from = first.and_time(NaiveTime::MIN).and_utc();
    let to = next.and_time(NaiveTime::MIN).and_utc() - Duration::milliseconds(1);
    Ok((from, to))
}

pub struct TrackerService<T: TrackerRepository, C: ClientRepository> {
    trackers: T,
    clients: C,
}

impl<T: TrackerRepository, C: ClientRepository> TrackerService<T, C> {
    pub fn new(trackers: T, clients: C) -> Self {
        Self { trackers, clients }
    }

    /// Fails with `NotFound` unless the client belongs to one of the
    /// caller's organizations.
    async fn ensure_client_visible(&self, client_id: Uuid, caller: &Member) -> UpdeightResult<()> {
        let client = self.clients.get_by_id(client_id).await?;
        authz::ensure_member_of(caller, client.organization_id, "client", client_id)
    }

    pub async fn list_for_member(&self, caller: &Member) -> UpdeightResult<Vec<Tracker>> {
        self.trackers.list_by_member(caller.id).await
    }

    /// Trackers of the caller whose day falls in the given month (or the
    /// whole year). `year` defaults to the current UTC year.
    pub async fn get_all_for_month(
        &self,
        caller: &Member,
        month: Option<u32>,
        year: Option<i32>,
    ) -> UpdeightResult<Vec<Tracker>> {
        let year = year.unwrap_or_else(|| Utc::now().year());
        let (from, to) = month_bounds(year, month)?;
        self.trackers
            .list_by_member_between(caller.id, from, to)
            .await
    }

    pub async fn create(&self, input: CreateTrackerInput, caller: &Member) -> UpdeightResult<Tracker> {
        self.ensure_client_visible(input.client_id, caller).await?;

        self.trackers
            .create(CreateTracker {
                client_id: input.client_id,
                member_id: caller.id,
                is_toggled_on: input.is_toggled_on.unwrap_or(false),
                last_toggled_on: Utc::now(),
                created_for: truncate_to_day(input.created_for),
            })
            .await
    }

    pub async fn toggle_on(&self, id: Uuid, caller: &Member) -> UpdeightResult<Vec<Tracker>> {
        if self.trackers.toggle_on(id, caller.id, Utc::now()).await? == 0 {
            warn!(tracker_id = %id, member_id = %caller.id, "Toggle on rejected");
            return Err(UpdeightError::not_found("tracker", id));
        }
        info!(tracker_id = %id, "Tracker toggled on");
        self.list_for_member(caller).await
    }

    /// Stop a running tracker and add the elapsed time to its
    /// accumulated duration. The write only applies if no other toggle
    /// happened since the tracker was read; otherwise `Conflict`.
    pub async fn toggle_off(&self, id: Uuid, caller: &Member) -> UpdeightResult<Vec<Tracker>> {
        let tracker = self.trackers.get_owned(id, caller.id).await?;
        if !tracker.is_toggled_on {
            return Err(UpdeightError::conflict("tracker is not running"));
        }

        let now = Utc::now();
        let elapsed_ms = (now - tracker.last_toggled_on).num_milliseconds().max(0);

        let applied = self
            .trackers
            .toggle_off(id, caller.id, tracker.last_toggled_on, now, elapsed_ms)
            .await?;
        if applied == 0 {
            warn!(tracker_id = %id, "Toggle off lost a concurrent update");
            return Err(UpdeightError::conflict("tracker was modified concurrently"));
        }

        info!(tracker_id = %id, elapsed_ms, "Tracker toggled off");
        self.list_for_member(caller).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateTrackerInput,
        caller: &Member,
    ) -> UpdeightResult<Vec<Tracker>> {
        if let Some(client_id) = input.client_id {
            self.ensure_client_visible(client_id, caller).await?;
        }

        let patch = UpdateTracker {
            client_id: input.client_id,
            created_for: input.created_for.map(truncate_to_day),
        };
        if self.trackers.update(id, caller.id, patch).await? == 0 {
            return Err(UpdeightError::not_found("tracker", id));
        }
        self.list_for_member(caller).await
    }

    pub async fn delete(&self, id: Uuid, caller: &Member) -> UpdeightResult<Vec<Tracker>> {
        if self.trackers.delete(id, caller.id).await? == 0 {
            return Err(UpdeightError::not_found("tracker", id));
        }
        info!(tracker_id = %id, "Tracker deleted");
        self.list_for_member(caller).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn june_bounds() {
        let (from, to) = month_bounds(2023, Some(6)).unwrap();
        assert_eq!(from, utc("2023-06-01T00:00:00Z"));
        assert_eq!(to, utc("2023-06-30T23:59:59.999Z"));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let (from, to) = month_bounds(2023, Some(12)).unwrap();
        assert_eq!(from, utc("2023-12-01T00:00:00Z"));
        assert_eq!(to, utc("2023-12-31T23:59:59.999Z"));
    }

    #[test]
    fn leap_february() {
        let (_, to) = month_bounds(2024, Some(2)).unwrap();
        assert_eq!(to, utc("2024-02-29T23:59:59.999Z"));
    }

    #[test]
    fn absent_month_covers_the_year() {
        let (from, to) = month_bounds(2023, None).unwrap();
        assert_eq!(from, utc("2023-01-01T00:00:00Z"));
        assert_eq!(to, utc("2023-12-31T23:59:59.999Z"));
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        for month in [0, 13] {
            assert!(matches!(
                month_bounds(2023, Some(month)),
                Err(UpdeightError::Validation { .. })
            ));
        }
    }

    #[test]
    fn year_at_the_integer_limit_is_rejected() {
        for month in [None, Some(12), Some(6)] {
            assert!(matches!(
                month_bounds(i32::MAX, month),
                Err(UpdeightError::Validation { .. })
            ));
        }
    }
}
