//! HTTP routes. Every response body is an [`Envelope`].

mod client;
mod member;
mod organization;
mod tracker;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde::{Deserialize, Serialize};
use surrealdb::Connection;
use tower_cookies::CookieManagerLayer;
use updeight_core::Envelope;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{require_member, trace_request};
use crate::state::AppState;

pub type ApiResult = Result<Response, ApiError>;

/// `?id=` on routes acting on one resource.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Uuid,
}

/// `?id=&organization=` on read routes; both optional.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    pub id: Option<Uuid>,
    pub organization: Option<Uuid>,
}

pub fn respond<T: Serialize>(data: T) -> ApiResult {
    Ok(Json(Envelope::success(data)).into_response())
}

async fn health() -> Json<Envelope<&'static str>> {
    Json(Envelope::success("ok"))
}

pub fn router<C: Connection>(state: AppState<C>) -> Router {
    let protected = Router::new()
        .merge(member::protected())
        .merge(organization::routes())
        .merge(client::routes())
        .merge(tracker::routes())
        .route_layer(from_fn_with_state(state.clone(), require_member::<C>));

    Router::new()
        .route("/health", get(health))
        .merge(member::public())
        .merge(protected)
        .layer(CookieManagerLayer::new())
        .layer(from_fn(trace_request))
        .with_state(state)
}
