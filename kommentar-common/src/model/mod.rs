pub mod auth;
pub mod comment;
pub mod user;

use crate::model::user::InvalidUserHandleError;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, marker::PhantomData, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum ModelValidationError {
    #[error(transparent)]
    UserHandle(#[from] InvalidUserHandleError),
}

/// Opaque entity identifier, typed by a marker so comment and user ids
/// cannot be mixed up.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Id<Marker>(Uuid, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid, PhantomData)
    }

    /// A fresh random id, assigned exactly once at entity creation.
    #[must_use]
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4())
    }

    #[must_use]
    pub fn uuid(self) -> Uuid {
        self.0
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> FromStr for Id<Marker> {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(Self::new)
    }
}

impl<Marker> From<Uuid> for Id<Marker> {
    fn from(value: Uuid) -> Self {
        Self::new(value)
    }
}

impl<Marker> From<Id<Marker>> for Uuid {
    fn from(value: Id<Marker>) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Id;
    use crate::model::comment::CommentMarker;
    use crate::model::user::UserMarker;
    use uuid::Uuid;

    #[test]
    fn id_round_trips_through_serde() {
        let id = Id::<CommentMarker>::generate();

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));

        let parsed: Id<CommentMarker> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn id_displays_as_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = Id::<UserMarker>::new(uuid);

        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn id_parses_from_uuid_string() {
        let id = Id::<UserMarker>::generate();
        let reparsed: Id<UserMarker> = id.to_string().parse().unwrap();

        assert_eq!(reparsed, id);
        assert!("not-a-uuid".parse::<Id<UserMarker>>().is_err());
    }
}
