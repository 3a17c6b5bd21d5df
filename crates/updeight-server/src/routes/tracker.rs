use axum::Router;
use axum::extract::{Extension, State};
use axum::routing::{get, post};
use serde::Deserialize;
use surrealdb::Connection;
use updeight_service::{CreateTrackerInput, UpdateTrackerInput};

use super::{ApiResult, IdQuery, respond};
use crate::extract::{JsonBody, QueryParams};
use crate::middleware::CurrentMember;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct MonthQuery {
    month: Option<u32>,
    year: Option<i32>,
}

pub fn routes<C: Connection>() -> Router<AppState<C>> {
    Router::new()
        .route(
            "/tracker",
            get(for_month::<C>)
                .post(create::<C>)
                .put(update::<C>)
                .delete(remove::<C>),
        )
        .route(
            "/tracker/toggle",
            post(toggle_on::<C>).delete(toggle_off::<C>),
        )
}

async fn for_month<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    QueryParams(query): QueryParams<MonthQuery>,
) -> ApiResult {
    respond(
        state
            .trackers
            .get_all_for_month(&member, query.month, query.year)
            .await?,
    )
}

async fn create<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    JsonBody(input): JsonBody<CreateTrackerInput>,
) -> ApiResult {
    respond(state.trackers.create(input, &member).await?)
}

async fn toggle_on<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    QueryParams(query): QueryParams<IdQuery>,
) -> ApiResult {
    respond(state.trackers.toggle_on(query.id, &member).await?)
}

async fn toggle_off<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    QueryParams(query): QueryParams<IdQuery>,
) -> ApiResult {
    respond(state.trackers.toggle_off(query.id, &member).await?)
}

async fn update<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    QueryParams(query): QueryParams<IdQuery>,
    JsonBody(input): JsonBody<UpdateTrackerInput>,
) -> ApiResult {
    respond(state.trackers.update(query.id, input, &member).await?)
}

async fn remove<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    QueryParams(query): QueryParams<IdQuery>,
) -> ApiResult {
    respond(state.trackers.delete(query.id, &member).await?)
}
