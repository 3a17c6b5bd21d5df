//! Organization domain model.
//!
//! Organizations own clients and are joined by members through a
//! random invite code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of every generated invite code.
pub const INVITE_CODE_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    /// 10-character alphanumeric code, unique across organizations.
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateOrganization {
    pub name: String,
    pub invite_code: String,
    /// Member joined to the organization in the same write.
    pub founder_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOrganization {
    pub name: Option<String>,
}
