use axum::Router;
use axum::extract::{Extension, State};
use axum::routing::{get, post};
use surrealdb::Connection;
use tower_cookies::Cookies;
use tracing::info;
use updeight_service::{LoginInput, RegisterInput, UpdateMemberInput};

use super::{ApiResult, ScopeQuery, respond};
use crate::extract::{JsonBody, QueryParams};
use crate::middleware::{CurrentMember, CurrentSession};
use crate::state::AppState;

pub fn public<C: Connection>() -> Router<AppState<C>> {
    Router::new()
        .route("/member", post(register::<C>))
        .route("/member/login", post(login::<C>))
        .route("/member/logout", post(logout::<C>))
}

pub fn protected<C: Connection>() -> Router<AppState<C>> {
    Router::new().route(
        "/member",
        get(read::<C>).put(update::<C>).delete(remove::<C>),
    )
}

async fn register<C: Connection>(
    State(state): State<AppState<C>>,
    cookies: Cookies,
    JsonBody(input): JsonBody<RegisterInput>,
) -> ApiResult {
    let auth = state.members.register(input).await?;
    state.cookie.set(&cookies, auth.session.id);
    respond(auth.member)
}

async fn login<C: Connection>(
    State(state): State<AppState<C>>,
    cookies: Cookies,
    JsonBody(input): JsonBody<LoginInput>,
) -> ApiResult {
    let auth = state.members.login(input).await?;
    state.cookie.set(&cookies, auth.session.id);
    respond(auth.member)
}

async fn logout<C: Connection>(State(state): State<AppState<C>>, cookies: Cookies) -> ApiResult {
    if let Some(session_id) = state.cookie.session_id(&cookies) {
        state.members.logout(session_id).await?;
        info!(%session_id, "Member logged out");
    }
    state.cookie.clear(&cookies);
    respond(true)
}

/// One member by id, the roster of an organization, or the caller.
async fn read<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    QueryParams(query): QueryParams<ScopeQuery>,
) -> ApiResult {
    if let Some(id) = query.id {
        return respond(state.members.get_by_id(id).await?);
    }
    if let Some(organization_id) = query.organization {
        return respond(
            state
                .members
                .list_for_organization(organization_id, &member)
                .await?,
        );
    }
    respond(state.members.current(&member).await?)
}

async fn update<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    QueryParams(query): QueryParams<ScopeQuery>,
    JsonBody(input): JsonBody<UpdateMemberInput>,
) -> ApiResult {
    let target = query.id.unwrap_or(member.id);
    respond(state.members.update_self(target, &member, input).await?)
}

async fn remove<C: Connection>(
    State(state): State<AppState<C>>,
    cookies: Cookies,
    Extension(CurrentMember(member)): Extension<CurrentMember>,
    Extension(CurrentSession(session_id)): Extension<CurrentSession>,
    QueryParams(query): QueryParams<ScopeQuery>,
) -> ApiResult {
    let target = query.id.unwrap_or(member.id);
    state
        .members
        .delete_self(target, &member, session_id)
        .await?;
    state.cookie.clear(&cookies);
    respond(true)
}
