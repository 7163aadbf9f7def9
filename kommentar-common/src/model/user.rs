use crate::model::Id;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use thiserror::Error;

pub const USER_HANDLE_MAX_LEN: usize = 50;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

/// A comment author. Users are managed elsewhere; this service only reads
/// them to expand author references and to check the `admin` flag.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct User {
    pub id: Id<UserMarker>,
    pub handle: UserHandle,
    pub admin: bool,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct UserHandle(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The user handle is invalid: {0}")]
pub struct InvalidUserHandleError(String);

impl UserHandle {
    pub fn new(handle: String) -> Result<Self, InvalidUserHandleError> {
        if handle.chars().count() <= USER_HANDLE_MAX_LEN {
            Ok(UserHandle(handle))
        } else {
            Err(InvalidUserHandleError(handle))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for UserHandle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        UserHandle::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"UserHandle"))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::user::{USER_HANDLE_MAX_LEN, UserHandle};

    #[test]
    fn handles_up_to_the_length_limit_are_accepted() {
        assert!(UserHandle::new(String::new()).is_ok());
        assert!(UserHandle::new("ada".to_string()).is_ok());
        assert!(UserHandle::new("a".repeat(USER_HANDLE_MAX_LEN)).is_ok());
    }

    #[test]
    fn overlong_handles_are_rejected() {
        assert!(UserHandle::new("a".repeat(USER_HANDLE_MAX_LEN + 1)).is_err());

        let err = serde_json::from_str::<UserHandle>(&format!(
            "\"{}\"",
            "a".repeat(USER_HANDLE_MAX_LEN + 1)
        ));
        assert!(err.is_err());
    }
}
