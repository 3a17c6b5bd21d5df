//! SurrealDB implementation of [`ClientRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};
use updeight_core::error::UpdeightResult;
use updeight_core::models::client::{Client, CreateClient, UpdateClient};
use updeight_core::repository::ClientRepository;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct ClientRow {
    name: String,
    thumbnail: Option<String>,
    organization_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ClientRow {
    fn try_into_client(self, id: Uuid) -> Result<Client, DbError> {
        Ok(Client {
            id,
            name: self.name,
            thumbnail: self.thumbnail,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct ClientRowWithId {
    record_id: String,
    name: String,
    thumbnail: Option<String>,
    organization_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ClientRowWithId {
    fn try_into_client(self) -> Result<Client, DbError> {
        let id = parse_uuid("client", &self.record_id)?;
        ClientRow {
            name: self.name,
            thumbnail: self.thumbnail,
            organization_id: self.organization_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_client(id)
    }
}

/// SurrealDB implementation of the Client repository.
#[derive(Clone)]
pub struct SurrealClientRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealClientRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ClientRepository for SurrealClientRepository<C> {
    async fn create(&self, input: CreateClient) -> UpdeightResult<Client> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('client', $id) SET \
                 name = $name, thumbnail = $thumbnail, \
                 organization_id = $organization_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("thumbnail", input.thumbnail))
            .bind(("organization_id", input.organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("client", e))?;

        let rows: Vec<ClientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("client", id_str))?;

        info!(client_id = %id, organization_id = %input.organization_id, "Client created");
        row.try_into_client(id).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> UpdeightResult<Client> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('client', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("client", id_str))?;

        row.try_into_client(id).map_err(Into::into)
    }

    async fn list_by_organizations(&self, organization_ids: &[Uuid]) -> UpdeightResult<Vec<Client>> {
        if organization_ids.is_empty() {
            return Ok(Vec::new());
        }
        let organization_ids: Vec<String> =
            organization_ids.iter().map(Uuid::to_string).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM client \
                 WHERE organization_id IN $organization_ids \
                 ORDER BY created_at ASC",
            )
            .bind(("organization_ids", organization_ids))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClientRowWithId> = result.take(0).map_err(DbError::from)?;

        let clients = rows
            .into_iter()
            .map(|row| row.try_into_client())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(clients)
    }

    async fn update(&self, id: Uuid, input: UpdateClient) -> UpdeightResult<Client> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.thumbnail.is_some() {
            sets.push("thumbnail = $thumbnail");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('client', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(thumbnail) = input.thumbnail {
            builder = builder.bind(("thumbnail", thumbnail));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("client", e))?;

        let rows: Vec<ClientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("client", id_str))?;

        debug!(client_id = %id, "Client updated");
        row.try_into_client(id).map_err(Into::into)
    }

    async fn delete(&self, id: Uuid) -> UpdeightResult<u64> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE tracker WHERE client_id = $id; \
                 DELETE type::record('client', $id) RETURN BEFORE; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check("client", e))?;

        let rows: Vec<ClientRow> = result.take(1).map_err(DbError::from)?;
        let deleted = rows.len() as u64;

        info!(client_id = %id, deleted, "Client deleted");
        Ok(deleted)
    }
}
