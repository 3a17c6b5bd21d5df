//! Request middleware: per-request trace span and member resolution.

use axum::extract::{Query, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use serde::Deserialize;
use surrealdb::Connection;
use tower_cookies::Cookies;
use tracing::{Instrument, debug, info_span, warn};
use updeight_auth::AuthError;
use updeight_core::UpdeightError;
use updeight_core::models::member::Member;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// The member behind the request's session cookie.
#[derive(Debug, Clone)]
pub struct CurrentMember(pub Member);

/// Id of the session the request was authenticated with.
#[derive(Debug, Clone, Copy)]
pub struct CurrentSession(pub Uuid);

#[derive(Debug, Deserialize)]
struct TraceQuery {
    #[serde(rename = "trace-id")]
    trace_id: Option<String>,
}

/// Trace id from the `trace-id` query parameter, then the `x-trace-id`
/// header, else a fresh UUIDv4.
pub fn trace_id(parts: &Parts) -> String {
    let from_query = Query::<TraceQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(query)| query.trace_id);
    let from_header = || {
        parts
            .headers
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };

    from_query
        .filter(|id| !id.is_empty())
        .or_else(from_header)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub async fn trace_request(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let span = info_span!(
        "request",
        trace_id = %trace_id(&parts),
        method = %parts.method,
        path = %parts.uri.path(),
    );
    let request = Request::from_parts(parts, body);

    async move {
        debug!("Request received");
        let response = next.run(request).await;
        debug!(status = response.status().as_u16(), "Request completed");
        response
    }
    .instrument(span)
    .await
}

/// Resolve the session cookie to a member once and hand it to the
/// handler as a [`CurrentMember`] extension.
pub async fn require_member<C: Connection>(
    State(state): State<AppState<C>>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(session_id) = state.cookie.session_id(&cookies) else {
        warn!("Request without a valid session cookie");
        return Err(UpdeightError::from(AuthError::SessionRequired).into());
    };

    let member = state.sessions.require_member(session_id).await?;
    debug!(member_id = %member.id, "Session resolved");

    request.extensions_mut().insert(CurrentMember(member));
    request.extensions_mut().insert(CurrentSession(session_id));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use axum::http::Request as HttpRequest;

    use super::*;

    fn parts(uri: &str, header: Option<&str>) -> Parts {
        let mut builder = HttpRequest::builder().uri(uri);
        if let Some(value) = header {
            builder = builder.header(TRACE_ID_HEADER, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn query_parameter_wins() {
        let parts = parts("/tracker?month=6&trace-id=abc", Some("from-header"));
        assert_eq!(trace_id(&parts), "abc");
    }

    #[test]
    fn header_is_the_fallback() {
        let parts = parts("/tracker?month=6", Some("from-header"));
        assert_eq!(trace_id(&parts), "from-header");
    }

    #[test]
    fn query_value_is_percent_decoded() {
        let spaced = parts("/tracker?trace-id=a%20b&year=2023", None);
        assert_eq!(trace_id(&spaced), "a b");

        let mixed = parts("/tracker?trace-id=a+b%2Fc", None);
        assert_eq!(trace_id(&mixed), "a b/c");
    }

    #[test]
    fn generated_when_absent() {
        let parts = parts("/tracker?trace-id=", None);
        assert!(Uuid::parse_str(&trace_id(&parts)).is_ok());
    }
}
