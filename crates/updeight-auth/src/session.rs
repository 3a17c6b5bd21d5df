//! Session store: the binding between an opaque session id and a
//! member.
//!
//! Sessions expire through two independent paths. Every session gets a
//! one-shot timer at creation ([`ExpiryScheduler`]), and a daily sweep
//! ([`crate::sweep`]) removes whatever the timers missed. Resolution
//! also ignores sessions past `expires_at`, so a session never outlives
//! its lifetime even when both paths are late.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use updeight_core::error::{UpdeightError, UpdeightResult};
use updeight_core::models::member::Member;
use updeight_core::models::session::{CreateSession, Session};
use updeight_core::repository::{MemberRepository, SessionRepository};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::scheduler::ExpiryScheduler;

pub struct SessionStore<S: SessionRepository, M: MemberRepository> {
    sessions: Arc<S>,
    members: M,
    scheduler: ExpiryScheduler,
    lifetime: Duration,
}

impl<S, M> SessionStore<S, M>
where
    S: SessionRepository + 'static,
    M: MemberRepository,
{
    pub fn new(sessions: S, members: M, config: &AuthConfig) -> Self {
        Self {
            sessions: Arc::new(sessions),
            members,
            scheduler: ExpiryScheduler::new(),
            lifetime: config.session_lifetime(),
        }
    }

    pub fn scheduler(&self) -> &ExpiryScheduler {
        &self.scheduler
    }

    /// Look up a live session and its member.
    ///
    /// Absent, expired and orphaned sessions all yield `Ok(None)`; only
    /// store failures are errors.
    pub async fn resolve_member(&self, session_id: Uuid) -> UpdeightResult<Option<Member>> {
        let session = match self.sessions.get_by_id(session_id).await {
            Ok(session) => session,
            Err(UpdeightError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        if session.is_expired_at(Utc::now()) {
            debug!(%session_id, expires_at = %session.expires_at, "Ignoring expired session");
            return Ok(None);
        }

        match self.members.get_by_id(session.member_id).await {
            Ok(member) => Ok(Some(member)),
            Err(UpdeightError::NotFound { .. }) => {
                warn!(%session_id, member_id = %session.member_id, "Session without member");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Like [`resolve_member`](Self::resolve_member) but fails with
    /// `Unauthorized` when there is no live session.
    pub async fn require_member(&self, session_id: Uuid) -> UpdeightResult<Member> {
        self.resolve_member(session_id)
            .await?
            .ok_or_else(|| AuthError::SessionRequired.into())
    }

    /// Persist a new session for `member_id` and arm its expiry timer.
    ///
    /// Existing sessions of the member are left untouched.
    pub async fn create_session(&self, member_id: Uuid) -> UpdeightResult<Session> {
        let input = CreateSession::starting_at(member_id, Utc::now(), self.lifetime)?;
        let session = self.sessions.create(input).await?;
        self.arm(&session);

        info!(session_id = %session.id, %member_id, expires_at = %session.expires_at, "Session created");
        Ok(session)
    }

    /// Idempotent: deleting an unknown session succeeds.
    pub async fn delete_session(&self, session_id: Uuid) -> UpdeightResult<()> {
        self.scheduler.cancel(&session_id);
        let deleted = self.sessions.delete(session_id).await?;
        debug!(%session_id, deleted, "Session deleted");
        Ok(())
    }

    /// Delete every session with `expires_at <= now`.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> UpdeightResult<u64> {
        let deleted = self.sessions.delete_expired(now).await?;
        info!(deleted, "Session sweep finished");
        Ok(deleted)
    }

    /// Re-arm timers for sessions persisted by a previous process.
    /// Sessions that already expired are removed instead. Returns the
    /// number of timers armed.
    pub async fn restore_timers(&self) -> UpdeightResult<usize> {
        let now = Utc::now();
        let removed = self.sessions.delete_expired(now).await?;

        let sessions = self.sessions.list_all().await?;
        for session in &sessions {
            self.arm(session);
        }

        info!(armed = sessions.len(), removed, "Session timers restored");
        Ok(sessions.len())
    }

    fn arm(&self, session: &Session) {
        let delay = (session.expires_at - Utc::now())
            .to_std()
            .unwrap_or_default();
        let sessions = Arc::clone(&self.sessions);
        let session_id = session.id;

        self.scheduler.schedule(session_id, delay, async move {
            match sessions.delete(session_id).await {
                Ok(deleted) => debug!(%session_id, deleted, "Session expired"),
                Err(e) => warn!(%session_id, error = %e, "Failed to delete expired session"),
            }
        });
    }
}
