//! SurrealDB implementation of [`MemberRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};
use updeight_core::error::UpdeightResult;
use updeight_core::models::member::{CreateMember, Member, MemberCredentials, UpdateMember};
use updeight_core::repository::MemberRepository;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

/// Projection shared by every member read. Organization ids are
/// collected from the `member_of` edges in the same statement.
const MEMBER_PROJECTION: &str = "meta::id(id) AS record_id, name, email, \
     password_hash, created_at, updated_at, \
     (SELECT VALUE meta::id(out) FROM member_of WHERE in = $parent.id) \
     AS organization_ids";

/// DB-side row struct for freshly created records.
#[derive(Debug, SurrealValue)]
struct MemberRecord {
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct MemberRow {
    record_id: String,
    name: String,
    email: String,
    password_hash: String,
    organization_ids: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MemberRow {
    fn try_into_credentials(self) -> Result<MemberCredentials, DbError> {
        let id = parse_uuid("member", &self.record_id)?;
        let organization_ids = self
            .organization_ids
            .iter()
            .map(|s| parse_uuid("organization", s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MemberCredentials {
            member: Member {
                id,
                name: self.name,
                email: self.email,
                organization_ids,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            password_hash: self.password_hash,
        })
    }

    fn try_into_member(self) -> Result<Member, DbError> {
        self.try_into_credentials().map(|c| c.member)
    }
}

/// SurrealDB implementation of the Member repository.
#[derive(Clone)]
pub struct SurrealMemberRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMemberRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MemberRepository for SurrealMemberRepository<C> {
    async fn create(&self, input: CreateMember) -> UpdeightResult<Member> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('member', $id) SET \
                 name = $name, email = $email, \
                 password_hash = $password_hash",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("password_hash", input.password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("member", e))?;

        let rows: Vec<MemberRecord> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("member", id_str))?;

        info!(member_id = %id, "Member created");

        Ok(Member {
            id,
            name: row.name,
            email: row.email,
            organization_ids: Vec::new(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> UpdeightResult<Member> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {MEMBER_PROJECTION} FROM type::record('member', $id)"
            ))
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MemberRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("member", id_str))?;

        row.try_into_member().map_err(Into::into)
    }

    async fn get_credentials_by_email(&self, email: &str) -> UpdeightResult<MemberCredentials> {
        let email_owned = email.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {MEMBER_PROJECTION} FROM member WHERE email = $email"
            ))
            .bind(("email", email_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MemberRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("member", format!("email={email_owned}")))?;

        row.try_into_credentials().map_err(Into::into)
    }

    async fn update(&self, id: Uuid, input: UpdateMember) -> UpdeightResult<Member> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.password_hash.is_some() {
            sets.push("password_hash = $password_hash");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('member', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(password_hash) = input.password_hash {
            builder = builder.bind(("password_hash", password_hash));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("member", e))?;

        let rows: Vec<MemberRecord> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::not_found("member", id_str).into());
        }

        debug!(member_id = %id, "Member updated");
        self.get_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> UpdeightResult<u64> {
        let id_str = id.to_string();

        // Dependent rows first, then the member itself.
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE member_of WHERE in = type::record('member', $id); \
                 DELETE session WHERE member_id = $id; \
                 DELETE tracker WHERE member_id = $id; \
                 DELETE type::record('member', $id) RETURN BEFORE; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("member", e))?;

        let rows: Vec<MemberRecord> = result.take(3).map_err(DbError::from)?;
        let deleted = rows.len() as u64;

        info!(member_id = %id, deleted, "Member deleted");
        Ok(deleted)
    }

    async fn list_by_organization(&self, organization_id: Uuid) -> UpdeightResult<Vec<Member>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {MEMBER_PROJECTION} FROM member \
                 WHERE id IN (\
                     SELECT VALUE in FROM member_of \
                     WHERE out = type::record('organization', $organization_id)\
                 ) \
                 ORDER BY created_at ASC"
            ))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MemberRow> = result.take(0).map_err(DbError::from)?;

        let members = rows
            .into_iter()
            .map(|row| row.try_into_member())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(members)
    }
}
