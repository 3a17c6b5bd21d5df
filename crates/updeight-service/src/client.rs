//! Client service. Every operation is scoped to the caller's
//! organizations; anything outside them is `NotFound`.

use serde::Deserialize;
use tracing::info;
use updeight_core::authz;
use updeight_core::error::{UpdeightError, UpdeightResult};
use updeight_core::models::client::{Client, CreateClient, UpdateClient};
use updeight_core::models::member::Member;
use updeight_core::repository::ClientRepository;
use uuid::Uuid;

use crate::validation::{double_option, validate_name};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientInput {
    pub name: String,
    pub organization_id: Uuid,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClientInput {
    pub name: Option<String>,
    /// Absent leaves the thumbnail alone, `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub thumbnail: Option<Option<String>>,
}

pub struct ClientService<C: ClientRepository> {
    clients: C,
}

impl<C: ClientRepository> ClientService<C> {
    pub fn new(clients: C) -> Self {
        Self { clients }
    }

    pub async fn list_for_member(&self, caller: &Member) -> UpdeightResult<Vec<Client>> {
        self.clients
            .list_by_organizations(&caller.organization_ids)
            .await
    }

    pub async fn list_for_organization(
        &self,
        organization_id: Uuid,
        caller: &Member,
    ) -> UpdeightResult<Vec<Client>> {
        authz::ensure_member_of(caller, organization_id, "organization", organization_id)?;
        self.clients.list_by_organizations(&[organization_id]).await
    }

    pub async fn get_by_id(&self, id: Uuid, caller: &Member) -> UpdeightResult<Client> {
        let client = self.clients.get_by_id(id).await?;
        authz::ensure_member_of(caller, client.organization_id, "client", id)?;
        Ok(client)
    }

    pub async fn create(&self, input: CreateClientInput, caller: &Member) -> UpdeightResult<Client> {
        validate_name("name", &input.name)?;
        authz::ensure_member_of(
            caller,
            input.organization_id,
            "organization",
            input.organization_id,
        )?;

        self.clients
            .create(CreateClient {
                name: input.name,
                thumbnail: input.thumbnail,
                organization_id: input.organization_id,
            })
            .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateClientInput,
        caller: &Member,
    ) -> UpdeightResult<Client> {
        if let Some(name) = &input.name {
            validate_name("name", name)?;
        }
        self.get_by_id(id, caller).await?;

        let client = self
            .clients
            .update(
                id,
                UpdateClient {
                    name: input.name,
                    thumbnail: input.thumbnail,
                },
            )
            .await?;
        info!(client_id = %id, updated_by = %caller.id, "Client updated");
        Ok(client)
    }

    pub async fn delete(&self, id: Uuid, caller: &Member) -> UpdeightResult<()> {
        self.get_by_id(id, caller).await?;

        if self.clients.delete(id).await? == 0 {
            return Err(UpdeightError::not_found("client", id));
        }
        info!(client_id = %id, deleted_by = %caller.id, "Client deleted");
        Ok(())
    }
}
