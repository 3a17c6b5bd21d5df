use axum::Router;
use axum::extract::{Extension, Path, State};
use axum::routing::{get, post};
use surrealdb::Connection;
use updeight_service::OrganizationInput;

use super::{ApiResult, IdQuery, ScopeQuery, respond};
use crate::extract::{JsonBody, QueryParams};
use crate::middleware::CurrentMember;
use crate::state::AppState;

pub fn routes<C: Connection>() -> Router<AppState<C>> {
    Router::new()
        .route(
            "/organization",
            get(read::<C>)
                .post(create::<C>)
                .put(update::<C>)
                .delete(remove::<C>),
        )
        .route("/organization/join/{code}", post(join::<C>))
}

async fn read<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    QueryParams(query): QueryParams<ScopeQuery>,
) -> ApiResult {
    match query.id {
        Some(id) => respond(state.organizations.get_by_id(id, &member).await?),
        None => respond(state.organizations.list_for_member(&member).await?),
    }
}

async fn create<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    JsonBody(input): JsonBody<OrganizationInput>,
) -> ApiResult {
    respond(state.organizations.create(input, &member).await?)
}

async fn update<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    QueryParams(query): QueryParams<IdQuery>,
    JsonBody(input): JsonBody<OrganizationInput>,
) -> ApiResult {
    respond(state.organizations.update(query.id, input, &member).await?)
}

async fn remove<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    QueryParams(query): QueryParams<IdQuery>,
) -> ApiResult {
    state.organizations.delete(query.id, &member).await?;
    respond(true)
}

async fn join<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    Path(code): Path<String>,
) -> ApiResult {
    respond(state.organizations.join_by_invite_code(&member, &code).await?)
}
