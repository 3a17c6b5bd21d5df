//! Shared application state handed to every handler.

use std::sync::Arc;

use surrealdb::{Connection, Surreal};
use updeight_auth::{Argon2Credentials, AuthConfig, SessionStore};
use updeight_db::repository::{
    SurrealClientRepository, SurrealMemberRepository, SurrealOrganizationRepository,
    SurrealSessionRepository, SurrealTrackerRepository,
};
use updeight_service::{ClientService, MemberService, OrganizationService, TrackerService};

use crate::cookie::SessionCookie;

pub type Sessions<C> = SessionStore<SurrealSessionRepository<C>, SurrealMemberRepository<C>>;
pub type Members<C> =
    MemberService<SurrealMemberRepository<C>, SurrealSessionRepository<C>, Argon2Credentials>;
pub type Organizations<C> = OrganizationService<SurrealOrganizationRepository<C>>;
pub type Clients<C> = ClientService<SurrealClientRepository<C>>;
pub type Trackers<C> = TrackerService<SurrealTrackerRepository<C>, SurrealClientRepository<C>>;

/// Every service wired to one SurrealDB handle, plus the cookie binding.
pub struct AppState<C: Connection> {
    pub sessions: Arc<Sessions<C>>,
    pub members: Arc<Members<C>>,
    pub organizations: Arc<Organizations<C>>,
    pub clients: Arc<Clients<C>>,
    pub trackers: Arc<Trackers<C>>,
    pub cookie: Arc<SessionCookie>,
}

impl<C: Connection> AppState<C> {
    pub fn new(db: Surreal<C>, auth: &AuthConfig, cookie: SessionCookie) -> Self {
        let sessions = Arc::new(SessionStore::new(
            SurrealSessionRepository::new(db.clone()),
            SurrealMemberRepository::new(db.clone()),
            auth,
        ));
        let members = MemberService::new(
            SurrealMemberRepository::new(db.clone()),
            Arc::clone(&sessions),
            Argon2Credentials::new(auth.pepper.clone()),
            auth.min_password_length,
        );

        Self {
            members: Arc::new(members),
            organizations: Arc::new(OrganizationService::new(
                SurrealOrganizationRepository::new(db.clone()),
            )),
            clients: Arc::new(ClientService::new(SurrealClientRepository::new(db.clone()))),
            trackers: Arc::new(TrackerService::new(
                SurrealTrackerRepository::new(db.clone()),
                SurrealClientRepository::new(db),
            )),
            sessions,
            cookie: Arc::new(cookie),
        }
    }
}

impl<C: Connection> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            members: Arc::clone(&self.members),
            organizations: Arc::clone(&self.organizations),
            clients: Arc::clone(&self.clients),
            trackers: Arc::clone(&self.trackers),
            cookie: Arc::clone(&self.cookie),
        }
    }
}
