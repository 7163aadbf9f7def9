use crate::model::Id;
use crate::model::user::{User, UserMarker};
use serde::{Deserialize, Serialize};
use time::UtcDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

/// A comment as returned to clients, with the stored author reference
/// expanded into the full user.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Comment {
    pub id: Id<CommentMarker>,
    pub author: User,
    pub rating: i16,
    pub text: String,
    pub created_at: UtcDateTime,
    pub updated_at: UtcDateTime,
}

/// Creation request body. The author is deliberately absent: it is always
/// taken from the authenticated caller, and any author key a client sends
/// is dropped during deserialization.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct NewComment {
    pub rating: i16,
    pub text: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct CreateComment {
    pub author: Id<UserMarker>,
    pub rating: i16,
    pub text: String,
}

/// Partial update of the mutable comment fields. Author and id are not
/// representable here, so they cannot be patched.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct CommentPatch {
    pub rating: Option<i16>,
    pub text: Option<String>,
}

/// The fields a comment listing can be narrowed by.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct CommentFilter {
    pub author: Option<Id<UserMarker>>,
    pub rating: Option<i16>,
}

/// Summary returned by the two delete operations.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Deserialize, Serialize)]
pub struct RemovedComments {
    pub removed: u64,
}

#[cfg(test)]
mod tests {
    use crate::model::comment::{CommentPatch, NewComment};

    #[test]
    fn author_keys_in_bodies_are_dropped() {
        let new: NewComment =
            serde_json::from_str(r#"{"rating": 4, "text": "hi", "author": "someone-else"}"#)
                .unwrap();
        assert_eq!(
            new,
            NewComment {
                rating: 4,
                text: "hi".to_string(),
            }
        );

        let patch: CommentPatch =
            serde_json::from_str(r#"{"text": "edited", "author": "someone-else"}"#).unwrap();
        assert_eq!(
            patch,
            CommentPatch {
                rating: None,
                text: Some("edited".to_string()),
            }
        );
    }

    #[test]
    fn patch_fields_are_optional() {
        let patch: CommentPatch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch, CommentPatch::default());

        let patch: CommentPatch = serde_json::from_str(r#"{"rating": 2}"#).unwrap();
        assert_eq!(patch.rating, Some(2));
        assert_eq!(patch.text, None);
    }
}
