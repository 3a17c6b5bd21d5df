//! Organization service.
//!
//! Organizations are visible only to their members; every lookup by id
//! outside the caller's memberships is reported as `NotFound`.

use rand::Rng;
use serde::Deserialize;
use tracing::{info, warn};
use updeight_core::authz;
use updeight_core::error::{UpdeightError, UpdeightResult};
use updeight_core::models::member::Member;
use updeight_core::models::organization::{
    CreateOrganization, INVITE_CODE_LEN, Organization, UpdateOrganization,
};
use updeight_core::repository::OrganizationRepository;
use uuid::Uuid;

use crate::validation::validate_name;

const INVITE_CODE_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Attempts before a colliding invite code is reported.
const INVITE_CODE_ATTEMPTS: usize = 3;

/// Body of both create and rename requests.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationInput {
    pub name: String,
}

impl OrganizationInput {
    pub fn validate(&self) -> UpdeightResult<()> {
        validate_name("name", &self.name)
    }
}

/// Ten characters drawn uniformly from `[A-Za-z0-9]`.
pub fn generate_invite_code() -> String {
    let mut rng = rand::rng();
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_CODE_ALPHABET[rng.random_range(0..INVITE_CODE_ALPHABET.len())] as char)
        .collect()
}

pub struct OrganizationService<O: OrganizationRepository> {
    organizations: O,
}

impl<O: OrganizationRepository> OrganizationService<O> {
    pub fn new(organizations: O) -> Self {
        Self { organizations }
    }

    pub async fn list_for_member(&self, caller: &Member) -> UpdeightResult<Vec<Organization>> {
        self.organizations.list_by_ids(&caller.organization_ids).await
    }

    pub async fn get_by_id(&self, id: Uuid, caller: &Member) -> UpdeightResult<Organization> {
        authz::ensure_member_of(caller, id, "organization", id)?;
        self.organizations.get_by_id(id).await
    }

    /// Create an organization and join the caller to it.
    pub async fn create(
        &self,
        input: OrganizationInput,
        caller: &Member,
    ) -> UpdeightResult<Organization> {
        self.create_with(input, caller, generate_invite_code).await
    }

    async fn create_with(
        &self,
        input: OrganizationInput,
        caller: &Member,
        mut next_code: impl FnMut() -> String,
    ) -> UpdeightResult<Organization> {
        input.validate()?;

        let mut attempt = 0;
        let organization = loop {
            attempt += 1;
            let result = self
                .organizations
                .create(CreateOrganization {
                    name: input.name.clone(),
                    invite_code: next_code(),
                    founder_id: Some(caller.id),
                })
                .await;
            match result {
                Ok(organization) => break organization,
                Err(UpdeightError::AlreadyExists { .. }) if attempt < INVITE_CODE_ATTEMPTS => {
                    warn!(attempt, "Invite code collision, regenerating");
                }
                Err(e) => return Err(e),
            }
        };

        info!(organization_id = %organization.id, creator = %caller.id, "Organization created");
        Ok(organization)
    }

    /// Join the organization owning `code`. Joining twice is a no-op.
    pub async fn join_by_invite_code(
        &self,
        caller: &Member,
        code: &str,
    ) -> UpdeightResult<Organization> {
        let organization = match self.organizations.get_by_invite_code(code).await {
            Ok(organization) => organization,
            Err(UpdeightError::NotFound { .. }) => {
                warn!(member_id = %caller.id, "Join rejected: unknown invite code");
                return Err(UpdeightError::bad_request("Invalid invite code"));
            }
            Err(e) => return Err(e),
        };

        self.organizations
            .add_member(organization.id, caller.id)
            .await?;
        Ok(organization)
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: OrganizationInput,
        caller: &Member,
    ) -> UpdeightResult<Organization> {
        authz::ensure_member_of(caller, id, "organization", id)?;
        input.validate()?;

        let organization = self
            .organizations
            .update(
                id,
                UpdateOrganization {
                    name: Some(input.name),
                },
            )
            .await?;
        info!(organization_id = %id, "Organization renamed");
        Ok(organization)
    }

    /// Remove the organization with its clients, their trackers and all
    /// memberships.
    pub async fn delete(&self, id: Uuid, caller: &Member) -> UpdeightResult<()> {
        authz::ensure_member_of(caller, id, "organization", id)?;

        if self.organizations.delete(id).await? == 0 {
            return Err(UpdeightError::not_found("organization", id));
        }
        info!(organization_id = %id, deleted_by = %caller.id, "Organization deleted");
        Ok(())
    }
}
