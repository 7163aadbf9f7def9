use crate::server::ServerError;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use kommentar_common::model::{
    Id,
    auth::{AuthToken, Caller},
    user::UserMarker,
};
use kommentar_db::store::IdentityVerifier;
use std::sync::Arc;

type AuthorizationHeader = TypedHeader<Authorization<Bearer>>;

/// Extractor that resolves the request's bearer token to a caller before
/// the handler body runs. Handlers that take it cannot run anonymously.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct AuthenticatedCaller(Caller);

impl AuthenticatedCaller {
    #[must_use]
    pub fn user_id(self) -> Id<UserMarker> {
        self.0.id
    }

    #[must_use]
    pub fn caller(self) -> Caller {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthenticatedCaller
where
    Arc<dyn IdentityVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let request_token: AuthToken = AuthorizationHeader::from_request_parts(parts, state)
            .await
            .map_err(ServerError::InvalidAuthorizationHeader)?
            .token()
            .parse()?;

        let token_hash = request_token.hash()?;

        let caller = Arc::<dyn IdentityVerifier>::from_ref(state)
            .verify(&token_hash)
            .await?
            .ok_or(ServerError::InvalidToken)?;

        Ok(Self(caller))
    }
}
