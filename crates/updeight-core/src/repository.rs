//! Repository trait definitions (the persistence gateway).
//!
//! All operations are async. Mutations that the services express as
//! conditional writes return the number of affected rows so callers
//! can collapse "absent", "not owned" and "wrong state" into a single
//! `NotFound`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::UpdeightResult;
use crate::models::{
    client::{Client, CreateClient, UpdateClient},
    member::{CreateMember, Member, MemberCredentials, UpdateMember},
    organization::{CreateOrganization, Organization, UpdateOrganization},
    session::{CreateSession, Session},
    tracker::{CreateTracker, Tracker, UpdateTracker},
};

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

pub trait MemberRepository: Send + Sync {
    fn create(&self, input: CreateMember) -> impl Future<Output = UpdeightResult<Member>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = UpdeightResult<Member>> + Send;
    fn get_credentials_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = UpdeightResult<MemberCredentials>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateMember,
    ) -> impl Future<Output = UpdeightResult<Member>> + Send;
    /// Deletes the member together with its membership edges, sessions
    /// and trackers. Returns the number of member rows removed.
    fn delete(&self, id: Uuid) -> impl Future<Output = UpdeightResult<u64>> + Send;
    fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = UpdeightResult<Vec<Member>>> + Send;
}

// ---------------------------------------------------------------------------
// Organization
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    /// Creates the organization and, when `founder_id` is set, its first
    /// membership edge in the same transaction.
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = UpdeightResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = UpdeightResult<Organization>> + Send;
    fn get_by_invite_code(
        &self,
        code: &str,
    ) -> impl Future<Output = UpdeightResult<Organization>> + Send;
    fn list_by_ids(
        &self,
        ids: &[Uuid],
    ) -> impl Future<Output = UpdeightResult<Vec<Organization>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateOrganization,
    ) -> impl Future<Output = UpdeightResult<Organization>> + Send;
    /// Deletes the organization, its clients, their trackers and all
    /// membership edges. Returns the number of organization rows removed.
    fn delete(&self, id: Uuid) -> impl Future<Output = UpdeightResult<u64>> + Send;
    /// Idempotent: adding an existing membership is a no-op.
    fn add_member(
        &self,
        organization_id: Uuid,
        member_id: Uuid,
    ) -> impl Future<Output = UpdeightResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub trait ClientRepository: Send + Sync {
    fn create(&self, input: CreateClient) -> impl Future<Output = UpdeightResult<Client>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = UpdeightResult<Client>> + Send;
    fn list_by_organizations(
        &self,
        organization_ids: &[Uuid],
    ) -> impl Future<Output = UpdeightResult<Vec<Client>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateClient,
    ) -> impl Future<Output = UpdeightResult<Client>> + Send;
    /// Deletes the client and its trackers.
    fn delete(&self, id: Uuid) -> impl Future<Output = UpdeightResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = UpdeightResult<Session>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = UpdeightResult<Session>> + Send;
    fn list_all(&self) -> impl Future<Output = UpdeightResult<Vec<Session>>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = UpdeightResult<u64>> + Send;
    /// Deletes every session with `expires_at <= now`.
    fn delete_expired(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = UpdeightResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

pub trait TrackerRepository: Send + Sync {
    fn create(&self, input: CreateTracker)
    -> impl Future<Output = UpdeightResult<Tracker>> + Send;
    /// Fetches a tracker only if it is owned by `member_id`.
    fn get_owned(
        &self,
        id: Uuid,
        member_id: Uuid,
    ) -> impl Future<Output = UpdeightResult<Tracker>> + Send;
    fn list_by_member(
        &self,
        member_id: Uuid,
    ) -> impl Future<Output = UpdeightResult<Vec<Tracker>>> + Send;
    /// Trackers whose `created_for` lies in `[from, to]`.
    fn list_by_member_between(
        &self,
        member_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = UpdeightResult<Vec<Tracker>>> + Send;
    /// Conditional write: applies only when the tracker is owned by
    /// `member_id` and currently off.
    fn toggle_on(
        &self,
        id: Uuid,
        member_id: Uuid,
        now: DateTime<Utc>,
    ) -> impl Future<Output = UpdeightResult<u64>> + Send;
    /// Compare-and-set: applies only when the tracker is owned by
    /// `member_id`, currently on, and `last_toggled_on` still equals
    /// `observed_last_toggled_on`.
    fn toggle_off(
        &self,
        id: Uuid,
        member_id: Uuid,
        observed_last_toggled_on: DateTime<Utc>,
        now: DateTime<Utc>,
        elapsed_ms: i64,
    ) -> impl Future<Output = UpdeightResult<u64>> + Send;
    fn update(
        &self,
        id: Uuid,
        member_id: Uuid,
        input: UpdateTracker,
    ) -> impl Future<Output = UpdeightResult<u64>> + Send;
    fn delete(&self, id: Uuid, member_id: Uuid)
    -> impl Future<Output = UpdeightResult<u64>> + Send;
}
