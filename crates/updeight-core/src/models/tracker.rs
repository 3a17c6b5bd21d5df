//! Tracker domain model.
//!
//! A tracker is one member's time record against one client for a
//! single UTC day. `before_duration` accumulates milliseconds and only
//! grows, once per on→off toggle.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracker {
    pub id: Uuid,
    pub client_id: Uuid,
    pub member_id: Uuid,
    pub is_toggled_on: bool,
    pub last_toggled_on: DateTime<Utc>,
    /// Always midnight UTC.
    pub created_for: DateTime<Utc>,
    /// Accumulated milliseconds.
    pub before_duration: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTracker {
    pub client_id: Uuid,
    pub member_id: Uuid,
    pub is_toggled_on: bool,
    pub last_toggled_on: DateTime<Utc>,
    pub created_for: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTracker {
    pub client_id: Option<Uuid>,
    pub created_for: Option<DateTime<Utc>>,
}

impl UpdateTracker {
    pub fn is_empty(&self) -> bool {
        self.client_id.is_none() && self.created_for.is_none()
    }
}

/// Discard the time-of-day, keeping the UTC calendar date.
pub fn truncate_to_day(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_afternoon_to_midnight() {
        let at: DateTime<Utc> = "2023-06-12T15:30:00Z".parse().unwrap();
        let expected: DateTime<Utc> = "2023-06-12T00:00:00Z".parse().unwrap();
        assert_eq!(truncate_to_day(at), expected);
    }

    #[test]
    fn truncation_is_idempotent() {
        let midnight: DateTime<Utc> = "2024-02-29T00:00:00Z".parse().unwrap();
        assert_eq!(truncate_to_day(midnight), midnight);
    }

    #[test]
    fn truncation_uses_utc_date_of_offset_input() {
        // 01:30 at +02:00 is still the previous UTC day.
        let at = DateTime::parse_from_rfc3339("2023-06-12T01:30:00+02:00")
            .unwrap()
            .with_timezone(&Utc);
        let expected: DateTime<Utc> = "2023-06-11T00:00:00Z".parse().unwrap();
        assert_eq!(truncate_to_day(at), expected);
    }
}
