//! SurrealDB implementation of [`OrganizationRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};
use updeight_core::error::UpdeightResult;
use updeight_core::models::organization::{
    CreateOrganization, Organization, UpdateOrganization,
};
use updeight_core::repository::OrganizationRepository;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    name: String,
    invite_code: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn into_organization(self, id: Uuid) -> Organization {
        Organization {
            id,
            name: self.name,
            invite_code: self.invite_code,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct OrganizationRowWithId {
    record_id: String,
    name: String,
    invite_code: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRowWithId {
    fn try_into_organization(self) -> Result<Organization, DbError> {
        Ok(Organization {
            id: parse_uuid("organization", &self.record_id)?,
            name: self.name,
            invite_code: self.invite_code,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> UpdeightResult<Organization> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let mut script = String::from(
            "BEGIN TRANSACTION;\n\
             CREATE type::record('organization', $id) SET \
             name = $name, invite_code = $invite_code;\n",
        );
        if let Some(founder_id) = input.founder_id {
            script.push_str(&format!(
                "RELATE member:`{founder_id}` -> member_of -> organization:`{id_str}`;\n"
            ));
        }
        script.push_str("COMMIT TRANSACTION;");

        let result = self
            .db
            .query(script)
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("invite_code", input.invite_code))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("organization", e))?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("organization", id_str))?;

        info!(organization_id = %id, founder_id = ?input.founder_id, "Organization created");
        Ok(row.into_organization(id))
    }

    async fn get_by_id(&self, id: Uuid) -> UpdeightResult<Organization> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('organization', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("organization", id_str))?;

        Ok(row.into_organization(id))
    }

    async fn get_by_invite_code(&self, code: &str) -> UpdeightResult<Organization> {
        let code_owned = code.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 WHERE invite_code = $code",
            )
            .bind(("code", code_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("organization", format!("invite_code={code_owned}")))?;

        row.try_into_organization().map_err(Into::into)
    }

    async fn list_by_ids(&self, ids: &[Uuid]) -> UpdeightResult<Vec<Organization>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 WHERE meta::id(id) IN $ids \
                 ORDER BY created_at ASC",
            )
            .bind(("ids", ids))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;

        let organizations = rows
            .into_iter()
            .map(|row| row.try_into_organization())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(organizations)
    }

    async fn update(&self, id: Uuid, input: UpdateOrganization) -> UpdeightResult<Organization> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('organization', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("organization", e))?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("organization", id_str))?;

        debug!(organization_id = %id, "Organization updated");
        Ok(row.into_organization(id))
    }

    async fn delete(&self, id: Uuid) -> UpdeightResult<u64> {
        let id_str = id.to_string();

        // Trackers of the organization's clients, the clients, the
        // membership edges, then the organization itself.
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE tracker WHERE client_id IN (\
                     SELECT VALUE meta::id(id) FROM client \
                     WHERE organization_id = $id\
                 ); \
                 DELETE client WHERE organization_id = $id; \
                 DELETE member_of WHERE out = type::record('organization', $id); \
                 DELETE type::record('organization', $id) RETURN BEFORE; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("organization", e))?;

        let rows: Vec<OrganizationRow> = result.take(3).map_err(DbError::from)?;
        let deleted = rows.len() as u64;

        info!(organization_id = %id, deleted, "Organization deleted");
        Ok(deleted)
    }

    async fn add_member(&self, organization_id: Uuid, member_id: Uuid) -> UpdeightResult<()> {
        let organization_id_str = organization_id.to_string();
        let member_id_str = member_id.to_string();

        let mut check = self
            .db
            .query(
                "SELECT count() AS total FROM member_of \
                 WHERE in = type::record('member', $member_id) \
                 AND out = type::record('organization', $organization_id) \
                 GROUP ALL",
            )
            .bind(("member_id", member_id_str.clone()))
            .bind(("organization_id", organization_id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let existing: Vec<CountRow> = check.take(0).map_err(DbError::from)?;
        if existing.first().map(|r| r.total).unwrap_or(0) > 0 {
            debug!(%organization_id, %member_id, "Membership already present");
            return Ok(());
        }

        let query = format!(
            "RELATE member:`{member_id_str}` -> member_of -> organization:`{organization_id_str}`;"
        );

        let outcome = self
            .db
            .query(query)
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_check("member_of", e));

        match outcome {
            Ok(_) => {
                info!(%organization_id, %member_id, "Member joined organization");
                Ok(())
            }
            // A concurrent join created the same edge first.
            Err(DbError::AlreadyExists { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
