use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::typed_header::TypedHeaderRejection;
use json::Json;
use kommentar_common::model::{
    Id,
    auth::{AuthTokenDecodeError, AuthTokenHashError},
    comment::CommentMarker,
};
use kommentar_db::store::{CommentStore, IdentityVerifier, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

mod auth;
pub mod cors;
mod json;
mod policy;
mod query;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, FromRef)]
pub struct ServerState {
    pub store: Arc<dyn CommentStore>,
    pub identity: Arc<dyn IdentityVerifier>,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Query string rejected: {0}")]
    QueryRejection(#[from] QueryRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Authorization header was missing or invalid: {0}")]
    InvalidAuthorizationHeader(TypedHeaderRejection),
    #[error("The provided auth token could not be decoded: {0}")]
    InvalidAuthToken(#[from] AuthTokenDecodeError),
    #[error("The auth token could not be hashed: {0}")]
    AuthTokenHash(#[from] AuthTokenHashError),
    #[error("Provided token was invalid")]
    InvalidToken,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Comment with id {0} was not found.")]
    CommentByIdNotFound(Id<CommentMarker>),
    #[error("POST operation not supported on /comments")]
    CollectionPostNotSupported,
    #[error("PUT operation not supported on /comments")]
    CollectionPutNotSupported,
    #[error("DELETE operation not supported on /comments")]
    CollectionDeleteNotSupported,
    #[error("POST operation not supported on /comments/{0}")]
    ItemPostNotSupported(Id<CommentMarker>),
    #[error("You are not authorized to update this comment!")]
    UpdateNotAuthorized,
    #[error("You are not authorized to delete this comment!")]
    DeleteNotAuthorized,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::CommentByIdNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidAuthorizationHeader(rejection) if rejection.is_missing() => {
                StatusCode::UNAUTHORIZED
            }
            ServerError::InvalidToken => StatusCode::UNAUTHORIZED,
            ServerError::QueryRejection(_)
            | ServerError::JsonRejection(_)
            | ServerError::InvalidAuthorizationHeader(_)
            | ServerError::InvalidAuthToken(_) => StatusCode::BAD_REQUEST,
            ServerError::CollectionPostNotSupported
            | ServerError::CollectionPutNotSupported
            | ServerError::CollectionDeleteNotSupported
            | ServerError::ItemPostNotSupported(_)
            | ServerError::UpdateNotAuthorized
            | ServerError::DeleteNotAuthorized => StatusCode::FORBIDDEN,
            ServerError::JsonResponse(_)
            | ServerError::Store(_)
            | ServerError::AuthTokenHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
struct ErrorResponse {
    status: u16,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        // Denials reply with their fixed message as plain text, everything
        // else with the generic JSON error body.
        if status == StatusCode::FORBIDDEN {
            return (status, self.to_string()).into_response();
        }

        let error_response = ErrorResponse {
            status: status.as_u16(),
        };
        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use crate::server::ServerError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use kommentar_common::model::Id;

    #[test]
    fn denials_map_to_forbidden() {
        let denials = [
            ServerError::CollectionPostNotSupported,
            ServerError::CollectionPutNotSupported,
            ServerError::CollectionDeleteNotSupported,
            ServerError::ItemPostNotSupported(Id::generate()),
            ServerError::UpdateNotAuthorized,
            ServerError::DeleteNotAuthorized,
        ];

        for denial in denials {
            assert_eq!(denial.status(), StatusCode::FORBIDDEN);
        }
    }

    #[test]
    fn denial_responses_are_plain_text() {
        let response = ServerError::UpdateNotAuthorized.into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("text/plain"));
    }

    #[test]
    fn missing_comments_map_to_not_found() {
        assert_eq!(
            ServerError::CommentByIdNotFound(Id::generate()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn item_denial_message_references_the_id() {
        let id = Id::generate();

        assert_eq!(
            ServerError::ItemPostNotSupported(id).to_string(),
            format!("POST operation not supported on /comments/{id}")
        );
    }
}
