use crate::model::{Id, user::UserMarker};
use argon2::{Argon2, Params};
use base64::{DecodeError, Engine, display::Base64Display, prelude::BASE64_STANDARD};
use std::{
    fmt::{Debug, Formatter},
    str::FromStr,
};
use thiserror::Error;

pub const AUTH_TOKEN_CORE_LEN: usize = 24;
pub const AUTH_TOKEN_SALT_LEN: usize = 18;
pub const AUTH_TOKEN_HASH_LEN: usize = Params::DEFAULT_OUTPUT_LEN;

/// The identity a verified token resolves to. This is everything the
/// handlers are allowed to know about the caller.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Caller {
    pub id: Id<UserMarker>,
    pub admin: bool,
}

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("Hashing auth token failed: {0}")]
pub struct AuthTokenHashError(argon2::Error);

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum AuthTokenDecodeError {
    #[error("Not enough parts separated by ':'")]
    NotEnoughParts,
    #[error("Invalid user id: {0}")]
    InvalidUserId(uuid::Error),
    #[error("Decoding base64 failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("The length of the core part is incorrect")]
    InvalidCoreLength,
    #[error("The length of the salt part is incorrect")]
    InvalidSaltLength,
}

/// Bearer token presented by clients: `<user id>:<core>:<salt>` with the
/// core and salt base64-encoded. Only its argon2 hash is ever stored.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct AuthToken {
    pub user_id: Id<UserMarker>,
    pub core: [u8; AUTH_TOKEN_CORE_LEN],
    pub salt: [u8; AUTH_TOKEN_SALT_LEN],
}

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct AuthTokenHash(pub Box<[u8; AUTH_TOKEN_HASH_LEN]>);

impl AuthToken {
    #[must_use]
    pub fn generate_random(user_id: Id<UserMarker>) -> Self {
        let core = rand::random();
        let salt = rand::random();

        Self {
            user_id,
            core,
            salt,
        }
    }

    #[must_use]
    pub fn as_token_str(&self) -> String {
        let user_id = self.user_id;
        let encoded_core = Base64Display::new(&self.core, &BASE64_STANDARD);
        let encoded_salt = Base64Display::new(&self.salt, &BASE64_STANDARD);

        format!("{user_id}:{encoded_core}:{encoded_salt}")
    }

    pub fn hash(&self) -> Result<AuthTokenHash, AuthTokenHashError> {
        let argon2 = Argon2::default();

        let mut hash = Box::new([0; AUTH_TOKEN_HASH_LEN]);
        argon2
            .hash_password_into(&self.core, &self.salt, &mut *hash)
            .map_err(AuthTokenHashError)?;

        Ok(AuthTokenHash(hash))
    }
}

impl FromStr for AuthToken {
    type Err = AuthTokenDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');

        let user_id_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;
        let core_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;
        let salt_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;

        let user_id = Id::from_str(user_id_part).map_err(Self::Err::InvalidUserId)?;
        let core = BASE64_STANDARD
            .decode(core_part)?
            .try_into()
            .map_err(|_| Self::Err::InvalidCoreLength)?;
        let salt = BASE64_STANDARD
            .decode(salt_part)?
            .try_into()
            .map_err(|_| Self::Err::InvalidSaltLength)?;

        Ok(Self {
            user_id,
            core,
            salt,
        })
    }
}

impl Debug for AuthToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("user_id", &self.user_id)
            .field("core", &"[redacted]")
            .field("salt", &"[redacted]")
            .finish()
    }
}

impl Debug for AuthTokenHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AuthTokenHash").field(&"[redacted]").finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Id;
    use crate::model::auth::{AuthToken, AuthTokenDecodeError};
    use std::str::FromStr;

    #[test]
    fn token_survives_the_string_round_trip() {
        let token = AuthToken::generate_random(Id::generate());
        let reparsed = AuthToken::from_str(&token.as_token_str()).unwrap();

        assert_eq!(reparsed, token);
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert_eq!(
            AuthToken::from_str("only-one-part"),
            Err(AuthTokenDecodeError::NotEnoughParts)
        );
        assert!(matches!(
            AuthToken::from_str("not-a-uuid:QUFB:QUFB"),
            Err(AuthTokenDecodeError::InvalidUserId(_))
        ));

        let valid = AuthToken::generate_random(Id::generate()).as_token_str();
        let truncated_core = {
            let mut parts: Vec<&str> = valid.splitn(3, ':').collect();
            parts[1] = "QUFB";
            parts.join(":")
        };
        assert_eq!(
            AuthToken::from_str(&truncated_core),
            Err(AuthTokenDecodeError::InvalidCoreLength)
        );
    }

    #[test]
    fn debug_output_redacts_the_secret_parts() {
        let token = AuthToken::generate_random(Id::generate());

        let debug = format!("{token:?}");
        assert!(debug.contains("[redacted]"));
        assert!(!debug.contains(&token.as_token_str()));

        let hash_debug = format!("{:?}", token.hash().unwrap());
        assert!(hash_debug.contains("[redacted]"));
    }
}
