//! Integration tests for the Session and Tracker repositories.

use chrono::{Duration, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use updeight_core::models::client::CreateClient;
use updeight_core::models::member::CreateMember;
use updeight_core::models::organization::CreateOrganization;
use updeight_core::models::session::{CreateSession, SESSION_LIFETIME};
use updeight_core::models::tracker::{CreateTracker, UpdateTracker, truncate_to_day};
use updeight_core::repository::{
    ClientRepository, MemberRepository, OrganizationRepository, SessionRepository,
    TrackerRepository,
};
use updeight_db::repository::{
    SurrealClientRepository, SurrealMemberRepository, SurrealOrganizationRepository,
    SurrealSessionRepository, SurrealTrackerRepository,
};
use uuid::Uuid;

/// Helper: in-memory DB with migrations, one member and one client.
async fn setup() -> (Surreal<Db>, Uuid, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    updeight_db::run_migrations(&db).await.unwrap();

    let member = SurrealMemberRepository::new(db.clone())
        .create(CreateMember {
            name: "johndoe2002".into(),
            email: "johndoe@email.com".into(),
            password_hash: "hash".into(),
        })
        .await
        .unwrap();

    let org = SurrealOrganizationRepository::new(db.clone())
        .create(CreateOrganization {
            name: "Acme".into(),
            invite_code: "AbCdEf1234".into(),
            founder_id: Some(member.id),
        })
        .await
        .unwrap();

    let client = SurrealClientRepository::new(db.clone())
        .create(CreateClient {
            name: "Globex".into(),
            thumbnail: None,
            organization_id: org.id,
        })
        .await
        .unwrap();

    (db, member.id, client.id)
}

// -----------------------------------------------------------------------
// Session
// -----------------------------------------------------------------------

#[tokio::test]
async fn session_expiry_is_exactly_seven_days() {
    let (db, member_id, _) = setup().await;
    let repo = SurrealSessionRepository::new(db);

    let now = Utc::now();
    let session = repo
        .create(CreateSession::starting_at(member_id, now, SESSION_LIFETIME).unwrap())
        .await
        .unwrap();
    assert_eq!(session.expires_at - session.created_at, SESSION_LIFETIME);

    let fetched = repo.get_by_id(session.id).await.unwrap();
    assert_eq!(fetched.member_id, member_id);
    assert_eq!(fetched.expires_at, session.expires_at);
}

#[tokio::test]
async fn session_delete_is_idempotent() {
    let (db, member_id, _) = setup().await;
    let repo = SurrealSessionRepository::new(db);

    let session = repo
        .create(CreateSession::starting_at(member_id, Utc::now(), SESSION_LIFETIME).unwrap())
        .await
        .unwrap();

    assert_eq!(repo.delete(session.id).await.unwrap(), 1);
    assert_eq!(repo.delete(session.id).await.unwrap(), 0);
    assert_eq!(repo.delete(Uuid::new_v4()).await.unwrap(), 0);
}

#[tokio::test]
async fn delete_expired_removes_only_expired() {
    let (db, member_id, _) = setup().await;
    let repo = SurrealSessionRepository::new(db);

    let now = Utc::now();
    let expired = repo
        .create(CreateSession::starting_at(
            member_id,
            now - Duration::days(8),
            SESSION_LIFETIME,
        )
        .unwrap())
        .await
        .unwrap();
    let boundary = repo
        .create(CreateSession {
            member_id,
            created_at: now - SESSION_LIFETIME,
            expires_at: now,
        })
        .await
        .unwrap();
    let live = repo
        .create(CreateSession::starting_at(member_id, now, SESSION_LIFETIME).unwrap())
        .await
        .unwrap();

    assert_eq!(repo.delete_expired(now).await.unwrap(), 2);

    assert!(repo.get_by_id(expired.id).await.is_err());
    assert!(repo.get_by_id(boundary.id).await.is_err());
    assert!(repo.get_by_id(live.id).await.is_ok());
    assert_eq!(repo.list_all().await.unwrap().len(), 1);
}

// -----------------------------------------------------------------------
// Tracker
// -----------------------------------------------------------------------

fn new_tracker(client_id: Uuid, member_id: Uuid) -> CreateTracker {
    let now = Utc::now();
    CreateTracker {
        client_id,
        member_id,
        is_toggled_on: false,
        last_toggled_on: now,
        created_for: truncate_to_day(now),
    }
}

#[tokio::test]
async fn toggle_on_applies_once() {
    let (db, member_id, client_id) = setup().await;
    let repo = SurrealTrackerRepository::new(db);

    let tracker = repo.create(new_tracker(client_id, member_id)).await.unwrap();
    assert_eq!(tracker.before_duration, 0);

    let now = Utc::now();
    assert_eq!(repo.toggle_on(tracker.id, member_id, now).await.unwrap(), 1);
    assert_eq!(repo.toggle_on(tracker.id, member_id, now).await.unwrap(), 0);

    let on = repo.get_owned(tracker.id, member_id).await.unwrap();
    assert!(on.is_toggled_on);
    assert_eq!(on.last_toggled_on, now);
}

#[tokio::test]
async fn toggle_on_rejects_foreign_member() {
    let (db, member_id, client_id) = setup().await;
    let repo = SurrealTrackerRepository::new(db);

    let tracker = repo.create(new_tracker(client_id, member_id)).await.unwrap();
    let stranger = Uuid::new_v4();

    assert_eq!(repo.toggle_on(tracker.id, stranger, Utc::now()).await.unwrap(), 0);
    assert!(repo.get_owned(tracker.id, stranger).await.is_err());
}

#[tokio::test]
async fn toggle_off_is_compare_and_set() {
    let (db, member_id, client_id) = setup().await;
    let repo = SurrealTrackerRepository::new(db);

    let tracker = repo.create(new_tracker(client_id, member_id)).await.unwrap();
    let started = Utc::now();
    repo.toggle_on(tracker.id, member_id, started).await.unwrap();

    let stopped = started + Duration::milliseconds(1500);
    let applied = repo
        .toggle_off(tracker.id, member_id, started, stopped, 1500)
        .await
        .unwrap();
    assert_eq!(applied, 1);

    // Same observation again: the row has moved on.
    let stale = repo
        .toggle_off(tracker.id, member_id, started, stopped, 1500)
        .await
        .unwrap();
    assert_eq!(stale, 0);

    let off = repo.get_owned(tracker.id, member_id).await.unwrap();
    assert!(!off.is_toggled_on);
    assert_eq!(off.before_duration, 1500);
    assert_eq!(off.last_toggled_on, stopped);
}

#[tokio::test]
async fn list_between_filters_by_created_for() {
    let (db, member_id, client_id) = setup().await;
    let repo = SurrealTrackerRepository::new(db);

    let june = "2023-06-12T00:00:00Z".parse().unwrap();
    let july = "2023-07-01T00:00:00Z".parse().unwrap();
    for created_for in [june, july] {
        repo.create(CreateTracker {
            created_for,
            ..new_tracker(client_id, member_id)
        })
        .await
        .unwrap();
    }

    let from = "2023-06-01T00:00:00Z".parse().unwrap();
    let to = "2023-06-30T23:59:59.999Z".parse().unwrap();
    let in_june = repo.list_by_member_between(member_id, from, to).await.unwrap();
    assert_eq!(in_june.len(), 1);
    assert_eq!(in_june[0].created_for, june);

    assert_eq!(repo.list_by_member(member_id).await.unwrap().len(), 2);
    assert!(repo.list_by_member(Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_and_delete_are_owner_scoped() {
    let (db, member_id, client_id) = setup().await;
    let repo = SurrealTrackerRepository::new(db);

    let tracker = repo.create(new_tracker(client_id, member_id)).await.unwrap();
    let new_day = "2023-06-12T00:00:00Z".parse().unwrap();
    let patch = UpdateTracker {
        client_id: None,
        created_for: Some(new_day),
    };

    assert_eq!(repo.update(tracker.id, Uuid::new_v4(), patch.clone()).await.unwrap(), 0);
    assert_eq!(repo.update(tracker.id, member_id, patch).await.unwrap(), 1);
    assert_eq!(
        repo.get_owned(tracker.id, member_id).await.unwrap().created_for,
        new_day
    );

    assert_eq!(repo.delete(tracker.id, Uuid::new_v4()).await.unwrap(), 0);
    assert_eq!(repo.delete(tracker.id, member_id).await.unwrap(), 1);
    assert_eq!(repo.delete(tracker.id, member_id).await.unwrap(), 0);
}
