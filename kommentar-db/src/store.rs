use async_trait::async_trait;
use kommentar_common::model::{
    Id, ModelValidationError,
    auth::{AuthTokenHash, Caller},
    comment::{Comment, CommentFilter, CommentMarker, CommentPatch, CreateComment},
    user::UserMarker,
};
use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("An object in the store was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("Query execution failed: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Query capability the comment handlers are written against. The
/// conditional `update`/`remove` carry the ownership check into the single
/// statement, so there is no read-then-write window to race through.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// All comments matching the filter, authors expanded, oldest first.
    async fn list(&self, filter: &CommentFilter) -> Result<Vec<Comment>>;

    /// One comment by id, author expanded.
    async fn fetch(&self, id: Id<CommentMarker>) -> Result<Option<Comment>>;

    async fn create(&self, comment: &CreateComment) -> Result<Id<CommentMarker>>;

    /// Applies the patch iff the comment exists and is authored by `author`.
    /// Returns whether a row was updated.
    async fn update(
        &self,
        id: Id<CommentMarker>,
        author: Id<UserMarker>,
        patch: &CommentPatch,
    ) -> Result<bool>;

    /// Removes the comment iff it is authored by `author`. Returns whether
    /// a row was removed.
    async fn remove(&self, id: Id<CommentMarker>, author: Id<UserMarker>) -> Result<bool>;

    /// Removes every comment, returning how many there were.
    async fn remove_all(&self) -> Result<u64>;

    async fn exists(&self, id: Id<CommentMarker>) -> Result<bool>;
}

/// Resolves a presented token hash to the caller it belongs to, or `None`
/// for unknown and expired tokens.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token_hash: &AuthTokenHash) -> Result<Option<Caller>>;
}
