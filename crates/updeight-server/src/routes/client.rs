use axum::Router;
use axum::extract::{Extension, State};
use axum::routing::get;
use surrealdb::Connection;
use updeight_service::{CreateClientInput, UpdateClientInput};

use super::{ApiResult, IdQuery, ScopeQuery, respond};
use crate::extract::{JsonBody, QueryParams};
use crate::middleware::CurrentMember;
use crate::state::AppState;

pub fn routes<C: Connection>() -> Router<AppState<C>> {
    Router::new().route(
        "/client",
        get(read::<C>)
            .post(create::<C>)
            .put(update::<C>)
            .delete(remove::<C>),
    )
}

/// One client, the clients of one organization, or every client the
/// caller can see.
async fn read<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    QueryParams(query): QueryParams<ScopeQuery>,
) -> ApiResult {
    if let Some(id) = query.id {
        return respond(state.clients.get_by_id(id, &member).await?);
    }
    if let Some(organization_id) = query.organization {
        return respond(
            state
                .clients
                .list_for_organization(organization_id, &member)
                .await?,
        );
    }
    respond(state.clients.list_for_member(&member).await?)
}

async fn create<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    JsonBody(input): JsonBody<CreateClientInput>,
) -> ApiResult {
    respond(state.clients.create(input, &member).await?)
}

async fn update<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    QueryParams(query): QueryParams<IdQuery>,
    JsonBody(input): JsonBody<UpdateClientInput>,
) -> ApiResult {
    respond(state.clients.update(query.id, input, &member).await?)
}

async fn remove<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    QueryParams(query): QueryParams<IdQuery>,
) -> ApiResult {
    state.clients.delete(query.id, &member).await?;
    respond(true)
}
