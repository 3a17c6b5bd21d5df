//! Authorization predicates.
//!
//! Organization-scoped misses surface as `NotFound` so callers cannot
//! probe for entities outside their organizations. Identity checks
//! surface as `Unauthorized`.

use uuid::Uuid;

use crate::error::{UpdeightError, UpdeightResult};
use crate::models::member::Member;

pub fn member_belongs_to_org(member: &Member, organization_id: Uuid) -> bool {
    member.organization_ids.contains(&organization_id)
}

pub fn owns_resource(member: &Member, resource_owner_id: Uuid) -> bool {
    member.id == resource_owner_id
}

/// Fails with `NotFound { entity, id }` when the member is not part of
/// `organization_id`.
pub fn ensure_member_of(
    member: &Member,
    organization_id: Uuid,
    entity: &'static str,
    id: Uuid,
) -> UpdeightResult<()> {
    if member_belongs_to_org(member, organization_id) {
        Ok(())
    } else {
        Err(UpdeightError::not_found(entity, id))
    }
}

pub fn ensure_owner(member: &Member, resource_owner_id: Uuid) -> UpdeightResult<()> {
    if owns_resource(member, resource_owner_id) {
        Ok(())
    } else {
        Err(UpdeightError::unauthorized(
            "You are not allowed to act on another member",
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn member_in(orgs: Vec<Uuid>) -> Member {
        Member {
            id: Uuid::new_v4(),
            name: "johndoe2002".into(),
            email: "johndoe@email.com".into(),
            organization_ids: orgs,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn belongs_only_to_listed_organizations() {
        let acme = Uuid::new_v4();
        let member = member_in(vec![acme]);
        assert!(member_belongs_to_org(&member, acme));
        assert!(!member_belongs_to_org(&member, Uuid::new_v4()));
    }

    #[test]
    fn outsider_gets_not_found() {
        let member = member_in(vec![]);
        let client_id = Uuid::new_v4();
        let err = ensure_member_of(&member, Uuid::new_v4(), "client", client_id).unwrap_err();
        match err {
            UpdeightError::NotFound { entity, id } => {
                assert_eq!(entity, "client");
                assert_eq!(id, client_id.to_string());
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn ownership_is_identity() {
        let member = member_in(vec![]);
        assert!(owns_resource(&member, member.id));
        assert!(ensure_owner(&member, member.id).is_ok());
        assert!(matches!(
            ensure_owner(&member, Uuid::new_v4()),
            Err(UpdeightError::Unauthorized { .. })
        ));
    }
}
