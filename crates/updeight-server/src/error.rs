//! The single boundary where errors become HTTP responses.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};
use updeight_core::{Envelope, UpdeightError};

/// Message rendered for store, crypto and internal failures.
pub const UNEXPECTED_ERROR: &str = "Something unexpected happened, please try again later.";

#[derive(Debug)]
pub struct ApiError(pub UpdeightError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            UpdeightError::BadRequest { .. } | UpdeightError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            UpdeightError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            UpdeightError::NotFound { .. } => StatusCode::NOT_FOUND,
            UpdeightError::AlreadyExists { .. } | UpdeightError::Conflict { .. } => {
                StatusCode::CONFLICT
            }
            UpdeightError::Database(_) | UpdeightError::Crypto(_) | UpdeightError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        if self.0.is_unexpected() {
            UNEXPECTED_ERROR.to_string()
        } else {
            self.0.to_string()
        }
    }
}

impl From<UpdeightError> for ApiError {
    fn from(err: UpdeightError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(UpdeightError::bad_request(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(UpdeightError::bad_request(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self.0 {
            UpdeightError::NotFound { entity, id } => {
                warn!(%entity, %id, "Request rejected: not found");
            }
            err if err.is_unexpected() => error!(error = %err, "Request failed"),
            err => warn!(error = %err, status = status.as_u16(), "Request rejected"),
        }

        (status, Json(Envelope::<()>::failure(self.message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: UpdeightError) -> StatusCode {
        ApiError(err).status()
    }

    #[test]
    fn taxonomy_maps_to_status() {
        assert_eq!(status_of(UpdeightError::bad_request("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(UpdeightError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(UpdeightError::unauthorized("x")), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(UpdeightError::not_found("client", "1")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(UpdeightError::AlreadyExists {
                entity: "member".into()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(UpdeightError::conflict("x")), StatusCode::CONFLICT);
        assert_eq!(
            status_of(UpdeightError::Database("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(UpdeightError::Crypto("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(UpdeightError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unexpected_errors_are_not_rendered() {
        let err = ApiError(UpdeightError::Database("connection reset on 10.0.0.3".into()));
        assert_eq!(err.message(), UNEXPECTED_ERROR);
    }

    #[test]
    fn not_found_hides_the_id() {
        let id = "0b7e6c5e-6c1a-4a83-9a2f-6b3a3a0d8f11";
        let err = ApiError(UpdeightError::not_found("client", id));
        assert_eq!(err.message(), "client not found");
    }
}
