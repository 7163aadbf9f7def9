use crate::record::{AuthenticationRecord, FullCommentRecord};
use crate::store::{CommentStore, IdentityVerifier, Result, StoreError};
use async_trait::async_trait;
use kommentar_common::model::{
    Id,
    auth::{AuthTokenHash, Caller},
    comment::{Comment, CommentFilter, CommentMarker, CommentPatch, CreateComment},
    user::UserMarker,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use time::{Duration, UtcDateTime};

const COMMENT_WITH_AUTHOR: &str = "
    SELECT
        comments.comment_id,
        comments.rating,
        comments.text,
        comments.created_at,
        comments.updated_at,
        users.user_id,
        users.handle,
        users.admin
    FROM
        comments.comments JOIN users.users ON users.user_id = comments.author
";

pub struct DbClient {
    pool: PgPool,
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        StoreError::Backend(Box::new(value))
    }
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl CommentStore for DbClient {
    async fn list(&self, filter: &CommentFilter) -> Result<Vec<Comment>> {
        let records = sqlx::query_as::<_, FullCommentRecord>(&format!(
            "
            {COMMENT_WITH_AUTHOR}
            WHERE
                ($1::uuid IS NULL OR comments.author = $1)
                AND ($2::smallint IS NULL OR comments.rating = $2)
            ORDER BY
                comments.created_at
            "
        ))
        .bind(filter.author.map(Id::uuid))
        .bind(filter.rating)
        .fetch_all(&self.pool)
        .await?;

        let comments = records
            .into_iter()
            .map(|record| Comment::try_from(record).map_err(StoreError::from))
            .collect::<Result<_>>()?;
        Ok(comments)
    }

    async fn fetch(&self, id: Id<CommentMarker>) -> Result<Option<Comment>> {
        let record = sqlx::query_as::<_, FullCommentRecord>(&format!(
            "
            {COMMENT_WITH_AUTHOR}
            WHERE
                comments.comment_id = $1
            "
        ))
        .bind(id.uuid())
        .fetch_optional(&self.pool)
        .await?;

        let comment = record.map(Comment::try_from).transpose()?;
        Ok(comment)
    }

    async fn create(&self, comment: &CreateComment) -> Result<Id<CommentMarker>> {
        let comment_id: Id<CommentMarker> = Id::generate();

        let returned_id: uuid::Uuid = sqlx::query_scalar(
            "
            INSERT INTO comments.comments (comment_id, author, rating, text)
            VALUES ($1, $2, $3, $4)
            RETURNING comments.comment_id
            ",
        )
        .bind(comment_id.uuid())
        .bind(comment.author.uuid())
        .bind(comment.rating)
        .bind(&comment.text)
        .fetch_one(&self.pool)
        .await?;

        Ok(returned_id.into())
    }

    async fn update(
        &self,
        id: Id<CommentMarker>,
        author: Id<UserMarker>,
        patch: &CommentPatch,
    ) -> Result<bool> {
        let result = sqlx::query(
            "
            UPDATE comments.comments
            SET
                rating = COALESCE($3, rating),
                text = COALESCE($4, text),
                updated_at = now()
            WHERE
                comment_id = $1 AND author = $2
            ",
        )
        .bind(id.uuid())
        .bind(author.uuid())
        .bind(patch.rating)
        .bind(patch.text.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove(&self, id: Id<CommentMarker>, author: Id<UserMarker>) -> Result<bool> {
        let result = sqlx::query(
            "
            DELETE FROM comments.comments
            WHERE
                comment_id = $1 AND author = $2
            ",
        )
        .bind(id.uuid())
        .bind(author.uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM comments.comments")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn exists(&self, id: Id<CommentMarker>) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "
            SELECT EXISTS (
                SELECT 1 FROM comments.comments WHERE comment_id = $1
            )
            ",
        )
        .bind(id.uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

#[async_trait]
impl IdentityVerifier for DbClient {
    async fn verify(&self, token_hash: &AuthTokenHash) -> Result<Option<Caller>> {
        let record = sqlx::query_as::<_, AuthenticationRecord>(
            "
            SELECT
                auth_tokens.user_id,
                users.admin,
                auth_tokens.created_at,
                auth_tokens.expires_after_seconds
            FROM
                users.auth_tokens JOIN users.users ON users.user_id = auth_tokens.user_id
            WHERE
                auth_tokens.token_hash = $1
            ",
        )
        .bind(token_hash.0.as_slice())
        .fetch_optional(&self.pool)
        .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        if let Some(seconds) = record.expires_after_seconds
            && record.created_at.to_utc() + Duration::seconds(seconds) < UtcDateTime::now()
        {
            return Ok(None);
        }

        Ok(Some(Caller {
            id: record.user_id.into(),
            admin: record.admin,
        }))
    }
}
