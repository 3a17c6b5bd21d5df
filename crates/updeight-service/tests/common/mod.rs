//! Shared fixture: every service wired to one in-memory SurrealDB.

#![allow(dead_code)]

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use updeight_auth::{Argon2Credentials, AuthConfig, SessionStore};
use updeight_core::models::member::Member;
use updeight_db::repository::{
    SurrealClientRepository, SurrealMemberRepository, SurrealOrganizationRepository,
    SurrealSessionRepository, SurrealTrackerRepository,
};
use updeight_service::{
    Authenticated, ClientService, MemberService, OrganizationService, RegisterInput,
    TrackerService,
};

pub type Store = SessionStore<SurrealSessionRepository<Db>, SurrealMemberRepository<Db>>;

pub struct Fixture {
    pub db: Surreal<Db>,
    pub sessions: Arc<Store>,
    pub members: MemberService<
        SurrealMemberRepository<Db>,
        SurrealSessionRepository<Db>,
        Argon2Credentials,
    >,
    pub organizations: OrganizationService<SurrealOrganizationRepository<Db>>,
    pub clients: ClientService<SurrealClientRepository<Db>>,
    pub trackers: TrackerService<SurrealTrackerRepository<Db>, SurrealClientRepository<Db>>,
}

impl Fixture {
    pub async fn new() -> Self {
        let db = Surreal::new::<Mem>(()).await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();
        updeight_db::run_migrations(&db).await.unwrap();

        let config = AuthConfig::default();
        let sessions = Arc::new(SessionStore::new(
            SurrealSessionRepository::new(db.clone()),
            SurrealMemberRepository::new(db.clone()),
            &config,
        ));

        Self {
            members: MemberService::new(
                SurrealMemberRepository::new(db.clone()),
                Arc::clone(&sessions),
                Argon2Credentials::default(),
                config.min_password_length,
            ),
            organizations: OrganizationService::new(SurrealOrganizationRepository::new(
                db.clone(),
            )),
            clients: ClientService::new(SurrealClientRepository::new(db.clone())),
            trackers: TrackerService::new(
                SurrealTrackerRepository::new(db.clone()),
                SurrealClientRepository::new(db.clone()),
            ),
            sessions,
            db,
        }
    }

    pub async fn register(&self, name: &str, email: &str) -> Authenticated {
        self.members
            .register(RegisterInput {
                name: name.into(),
                email: email.into(),
                password: "secure-pw".into(),
            })
            .await
            .unwrap()
    }

    /// Re-resolve a member so its organization ids are current, as the
    /// request middleware does on every call.
    pub async fn refresh(&self, auth: &Authenticated) -> Member {
        self.sessions
            .require_member(auth.session.id)
            .await
            .unwrap()
    }
}
