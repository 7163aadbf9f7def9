use kommentar_common::model::{
    ModelValidationError,
    comment::Comment,
    user::{User, UserHandle},
};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// A comment row joined with its author's user row.
#[derive(Clone, Eq, PartialEq, Debug, FromRow)]
pub(crate) struct FullCommentRecord {
    pub comment_id: Uuid,
    pub rating: i16,
    pub text: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub user_id: Uuid,
    pub handle: String,
    pub admin: bool,
}

/// An auth token row joined with the owning user's `admin` flag.
#[derive(Clone, Eq, PartialEq, Debug, FromRow)]
pub(crate) struct AuthenticationRecord {
    pub user_id: Uuid,
    pub admin: bool,
    pub created_at: OffsetDateTime,
    pub expires_after_seconds: Option<i64>,
}

impl TryFrom<FullCommentRecord> for Comment {
    type Error = ModelValidationError;

    fn try_from(value: FullCommentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.comment_id.into(),
            author: User {
                id: value.user_id.into(),
                handle: UserHandle::new(value.handle)?,
                admin: value.admin,
            },
            rating: value.rating,
            text: value.text,
            created_at: value.created_at.to_utc(),
            updated_at: value.updated_at.to_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::record::FullCommentRecord;
    use kommentar_common::model::comment::Comment;
    use time::macros::datetime;
    use uuid::Uuid;

    fn record() -> FullCommentRecord {
        FullCommentRecord {
            comment_id: Uuid::new_v4(),
            rating: 5,
            text: "lovely".to_string(),
            created_at: datetime!(2026-03-01 12:00 UTC),
            updated_at: datetime!(2026-03-02 08:30 UTC),
            user_id: Uuid::new_v4(),
            handle: "ada".to_string(),
            admin: false,
        }
    }

    #[test]
    fn comment_record_expands_into_author_and_comment() {
        let record = record();

        let comment = Comment::try_from(record.clone()).unwrap();
        assert_eq!(comment.id.uuid(), record.comment_id);
        assert_eq!(comment.author.id.uuid(), record.user_id);
        assert_eq!(comment.author.handle.get(), "ada");
        assert_eq!(comment.rating, 5);
        assert_eq!(comment.created_at, record.created_at.to_utc());
    }

    #[test]
    fn records_with_invalid_handles_are_refused() {
        let record = FullCommentRecord {
            handle: "a".repeat(200),
            ..record()
        };

        assert!(Comment::try_from(record).is_err());
    }
}
