//! Session domain model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{UpdeightError, UpdeightResult};

/// Fixed lifetime of every session: 7 days (604 800 000 ms).
pub const SESSION_LIFETIME: Duration = Duration::days(7);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub member_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone)]
pub struct CreateSession {
    pub member_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CreateSession {
    /// A session for `member_id` starting at `now` and lasting
    /// `lifetime`. Fails when the expiry is not a representable instant.
    pub fn starting_at(
        member_id: Uuid,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> UpdeightResult<Self> {
        let expires_at = now.checked_add_signed(lifetime).ok_or_else(|| {
            UpdeightError::Internal(format!("session expiry overflows: {now} + {lifetime}"))
        })?;
        Ok(Self {
            member_id,
            created_at: now,
            expires_at,
        })
    }
}
