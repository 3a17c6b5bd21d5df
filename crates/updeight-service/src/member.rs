//! Member service: registration, login, identity reads and
//! self-service updates.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};
use updeight_auth::{AuthError, CredentialVerifier, SessionStore};
use updeight_core::authz;
use updeight_core::error::{UpdeightError, UpdeightResult};
use updeight_core::models::member::{CreateMember, Member, UpdateMember};
use updeight_core::models::session::Session;
use updeight_core::repository::{MemberRepository, SessionRepository};
use uuid::Uuid;

use crate::validation::{validate_email, validate_name, validate_password};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterInput {
    pub fn validate(&self, min_password_length: usize) -> UpdeightResult<()> {
        validate_name("name", &self.name)?;
        validate_email(&self.email)?;
        validate_password(&self.password, min_password_length)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl UpdateMemberInput {
    pub fn validate(&self, min_password_length: usize) -> UpdeightResult<()> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(password) = &self.password {
            validate_password(password, min_password_length)?;
            if self.confirm_password.as_deref() != Some(password.as_str()) {
                return Err(UpdeightError::validation(
                    "confirmPassword must match password",
                ));
            }
        }
        Ok(())
    }
}

/// A member together with the session that was just opened for it.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub member: Member,
    pub session: Session,
}

pub struct MemberService<M, S, V>
where
    M: MemberRepository,
    S: SessionRepository,
    V: CredentialVerifier,
{
    members: M,
    sessions: Arc<SessionStore<S, M>>,
    credentials: V,
    min_password_length: usize,
}

impl<M, S, V> MemberService<M, S, V>
where
    M: MemberRepository,
    S: SessionRepository + 'static,
    V: CredentialVerifier,
{
    pub fn new(
        members: M,
        sessions: Arc<SessionStore<S, M>>,
        credentials: V,
        min_password_length: usize,
    ) -> Self {
        Self {
            members,
            sessions,
            credentials,
            min_password_length,
        }
    }

    /// Create a member and log it in.
    pub async fn register(&self, input: RegisterInput) -> UpdeightResult<Authenticated> {
        input.validate(self.min_password_length)?;

        let password_hash = self.credentials.hash(&input.password)?;
        let member = self
            .members
            .create(CreateMember {
                name: input.name,
                email: input.email,
                password_hash,
            })
            .await?;
        let session = self.sessions.create_session(member.id).await?;

        info!(member_id = %member.id, "Member registered");
        Ok(Authenticated { member, session })
    }

    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, input: LoginInput) -> UpdeightResult<Authenticated> {
        let credentials = match self.members.get_credentials_by_email(&input.email).await {
            Ok(credentials) => credentials,
            Err(UpdeightError::NotFound { .. }) => {
                warn!("Login rejected: unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        if !self
            .credentials
            .verify(&input.password, &credentials.password_hash)?
        {
            warn!(member_id = %credentials.member.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let member = credentials.member;
        let session = self.sessions.create_session(member.id).await?;

        info!(member_id = %member.id, session_id = %session.id, "Member logged in");
        Ok(Authenticated { member, session })
    }

    pub async fn logout(&self, session_id: Uuid) -> UpdeightResult<()> {
        self.sessions.delete_session(session_id).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> UpdeightResult<Member> {
        self.members.get_by_id(id).await
    }

    /// Fresh copy of the calling member.
    pub async fn current(&self, caller: &Member) -> UpdeightResult<Member> {
        self.members.get_by_id(caller.id).await
    }

    pub async fn list_for_organization(
        &self,
        organization_id: Uuid,
        caller: &Member,
    ) -> UpdeightResult<Vec<Member>> {
        authz::ensure_member_of(caller, organization_id, "organization", organization_id)?;
        self.members.list_by_organization(organization_id).await
    }

    pub async fn update_self(
        &self,
        target_id: Uuid,
        caller: &Member,
        input: UpdateMemberInput,
    ) -> UpdeightResult<Member> {
        if let Err(e) = authz::ensure_owner(caller, target_id) {
            warn!(caller = %caller.id, %target_id, "Member update rejected");
            return Err(e);
        }
        input.validate(self.min_password_length)?;

        let password_hash = input
            .password
            .as_deref()
            .map(|password| self.credentials.hash(password))
            .transpose()?;
        let patch = UpdateMember {
            name: input.name,
            email: input.email,
            password_hash,
        };
        if patch.is_empty() {
            return self.members.get_by_id(target_id).await;
        }

        let member = self.members.update(target_id, patch).await?;
        info!(member_id = %member.id, "Member updated");
        Ok(member)
    }

    /// Delete the caller's account. The current session is closed
    /// first; memberships, remaining sessions and trackers go with the
    /// member row.
    pub async fn delete_self(
        &self,
        target_id: Uuid,
        caller: &Member,
        current_session: Uuid,
    ) -> UpdeightResult<()> {
        if let Err(e) = authz::ensure_owner(caller, target_id) {
            warn!(caller = %caller.id, %target_id, "Member deletion rejected");
            return Err(e);
        }

        self.sessions.delete_session(current_session).await?;
        if self.members.delete(target_id).await? == 0 {
            return Err(UpdeightError::not_found("member", target_id));
        }

        info!(member_id = %target_id, "Member deleted");
        Ok(())
    }
}
