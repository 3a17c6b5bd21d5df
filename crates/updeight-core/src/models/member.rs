//! Member domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public projection of a member, including the organizations it
/// belongs to. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub organization_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A member together with its stored password hash. Only produced for
/// the login flow.
#[derive(Debug, Clone)]
pub struct MemberCredentials {
    pub member: Member,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct CreateMember {
    pub name: String,
    pub email: String,
    /// Already hashed; repositories never see plaintext.
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateMember {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UpdateMember {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password_hash.is_none()
    }
}
