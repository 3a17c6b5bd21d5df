//! Member service scenarios.

mod common;

use common::Fixture;
use updeight_core::error::UpdeightError;
use updeight_service::{LoginInput, OrganizationInput, RegisterInput, UpdateMemberInput};

#[tokio::test]
async fn register_opens_a_session() {
    let fx = Fixture::new().await;

    let auth = fx.register("johndoe2002", "johndoe@email.com").await;
    assert_eq!(auth.member.name, "johndoe2002");
    assert_eq!(auth.session.member_id, auth.member.id);

    let resolved = fx
        .sessions
        .resolve_member(auth.session.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.id, auth.member.id);
    assert_eq!(resolved.email, "johndoe@email.com");
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let fx = Fixture::new().await;
    fx.register("johndoe2002", "johndoe@email.com").await;

    let err = fx
        .members
        .register(RegisterInput {
            name: "other".into(),
            email: "johndoe@email.com".into(),
            password: "secure-pw".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, UpdeightError::AlreadyExists { .. }));
}

#[tokio::test]
async fn register_validates_input() {
    let fx = Fixture::new().await;

    for (name, email, password) in [
        ("", "johndoe@email.com", "secure-pw"),
        ("johndoe2002", "not-an-email", "secure-pw"),
        ("johndoe2002", "johndoe@email.com", "short"),
    ] {
        let err = fx
            .members
            .register(RegisterInput {
                name: name.into(),
                email: email.into(),
                password: password.into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UpdeightError::Validation { .. }), "{err:?}");
    }
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let fx = Fixture::new().await;
    fx.register("johndoe2002", "johndoe@email.com").await;

    let wrong_password = fx
        .members
        .login(LoginInput {
            email: "johndoe@email.com".into(),
            password: "wrong-password".into(),
        })
        .await
        .unwrap_err();
    let unknown_email = fx
        .members
        .login(LoginInput {
            email: "nobody@email.com".into(),
            password: "secure-pw".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, UpdeightError::NotFound { .. }));
    assert!(matches!(unknown_email, UpdeightError::NotFound { .. }));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn login_creates_an_additional_session() {
    let fx = Fixture::new().await;
    let registered = fx.register("johndoe2002", "johndoe@email.com").await;

    let logged_in = fx
        .members
        .login(LoginInput {
            email: "johndoe@email.com".into(),
            password: "secure-pw".into(),
        })
        .await
        .unwrap();

    assert_eq!(logged_in.member.id, registered.member.id);
    assert_ne!(logged_in.session.id, registered.session.id);
    assert!(
        fx.sessions
            .resolve_member(registered.session.id)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let fx = Fixture::new().await;
    let auth = fx.register("johndoe2002", "johndoe@email.com").await;

    fx.members.logout(auth.session.id).await.unwrap();
    assert!(fx.sessions.resolve_member(auth.session.id).await.unwrap().is_none());

    // Idempotent.
    fx.members.logout(auth.session.id).await.unwrap();
}

#[tokio::test]
async fn update_self_requires_ownership() {
    let fx = Fixture::new().await;
    let john = fx.register("johndoe2002", "johndoe@email.com").await;
    let jane = fx.register("jane", "jane@email.com").await;

    let err = fx
        .members
        .update_self(
            jane.member.id,
            &john.member,
            UpdateMemberInput {
                name: Some("hijacked".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UpdeightError::Unauthorized { .. }));

    let updated = fx
        .members
        .update_self(
            john.member.id,
            &john.member,
            UpdateMemberInput {
                name: Some("john".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "john");
}

#[tokio::test]
async fn email_change_to_a_taken_address_conflicts() {
    let fx = Fixture::new().await;
    let john = fx.register("johndoe2002", "johndoe@email.com").await;
    fx.register("jane", "jane@email.com").await;

    let err = fx
        .members
        .update_self(
            john.member.id,
            &john.member,
            UpdateMemberInput {
                email: Some("jane@email.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UpdeightError::AlreadyExists { .. }));
}

#[tokio::test]
async fn password_change_needs_confirmation_and_rehashes() {
    let fx = Fixture::new().await;
    let john = fx.register("johndoe2002", "johndoe@email.com").await;

    let mismatch = fx
        .members
        .update_self(
            john.member.id,
            &john.member,
            UpdateMemberInput {
                password: Some("new-secure-pw".into()),
                confirm_password: Some("something-else".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(mismatch, UpdeightError::Validation { .. }));

    fx.members
        .update_self(
            john.member.id,
            &john.member,
            UpdateMemberInput {
                password: Some("new-secure-pw".into()),
                confirm_password: Some("new-secure-pw".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let login = |password: &str| LoginInput {
        email: "johndoe@email.com".into(),
        password: password.into(),
    };
    assert!(fx.members.login(login("secure-pw")).await.is_err());
    assert!(fx.members.login(login("new-secure-pw")).await.is_ok());
}

#[tokio::test]
async fn delete_self_closes_session_and_removes_member() {
    let fx = Fixture::new().await;
    let john = fx.register("johndoe2002", "johndoe@email.com").await;
    let jane = fx.register("jane", "jane@email.com").await;

    let err = fx
        .members
        .delete_self(jane.member.id, &john.member, john.session.id)
        .await
        .unwrap_err();
    assert!(matches!(err, UpdeightError::Unauthorized { .. }));

    fx.members
        .delete_self(john.member.id, &john.member, john.session.id)
        .await
        .unwrap();
    assert!(fx.sessions.resolve_member(john.session.id).await.unwrap().is_none());
    assert!(matches!(
        fx.members.get_by_id(john.member.id).await,
        Err(UpdeightError::NotFound { .. })
    ));

    // The row is already gone.
    let again = fx
        .members
        .delete_self(john.member.id, &john.member, john.session.id)
        .await
        .unwrap_err();
    assert!(matches!(again, UpdeightError::NotFound { .. }));
}

#[tokio::test]
async fn organization_roster_requires_membership() {
    let fx = Fixture::new().await;
    let john = fx.register("johndoe2002", "johndoe@email.com").await;
    let jane = fx.register("jane", "jane@email.com").await;

    let acme = fx
        .organizations
        .create(OrganizationInput { name: "Acme".into() }, &john.member)
        .await
        .unwrap();
    let john_now = fx.refresh(&john).await;

    let roster = fx
        .members
        .list_for_organization(acme.id, &john_now)
        .await
        .unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].id, john.member.id);

    let err = fx
        .members
        .list_for_organization(acme.id, &jane.member)
        .await
        .unwrap_err();
    assert!(matches!(err, UpdeightError::NotFound { .. }));

    let current = fx.members.current(&john_now).await.unwrap();
    assert_eq!(current.organization_ids, vec![acme.id]);
}
