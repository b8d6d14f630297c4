use conectapetz_common::model::{
    Id, ModelValidationError,
    auth::{Credential, PasswordHash},
    user::{Email, User, UserName},
};
use serde::{Deserialize, Serialize};

/// A user as stored under the users key.
///
/// Older records carry a plaintext `password` instead of a `passwordHash`.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserRecord {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        let credential = match (value.password_hash, value.password) {
            (Some(hash), _) => Credential::Hashed(hash.parse::<PasswordHash>()?),
            (None, Some(plaintext)) => Credential::Legacy(plaintext),
            (None, None) => return Err(ModelValidationError::Blank("password")),
        };

        Ok(Self {
            id: Id::new(value.id),
            name: UserName::from_stored(value.name),
            email: Email::from_stored(value.email),
            credential,
            avatar: value.avatar,
        })
    }
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        let (password_hash, password) = match &user.credential {
            Credential::Hashed(hash) => (Some(hash.to_string()), None),
            Credential::Legacy(plaintext) => (None, Some(plaintext.clone())),
        };

        Self {
            id: user.id.to_string(),
            name: user.name.get().to_owned(),
            email: user.email.get().to_owned(),
            password_hash,
            password,
            avatar: user.avatar.clone(),
        }
    }
}
