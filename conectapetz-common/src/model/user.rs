use crate::model::{Id, IdPrefix, auth::Credential};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const USER_NAME_MAX_LEN: usize = 50;
pub const AVATAR_MAX_BYTES: u64 = 2 * 1024 * 1024;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;
impl IdPrefix for UserMarker {
    const PREFIX: &'static str = "user";
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct User {
    pub id: Id<UserMarker>,
    pub name: UserName,
    pub email: Email,
    pub credential: Credential,
    pub avatar: Option<String>,
}

/// What other parties get to see of a [`User`].
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Profile {
    pub id: Id<UserMarker>,
    pub name: UserName,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    /// Left unchanged when absent or blank.
    #[serde(default)]
    pub password: Option<String>,
    /// Cleared when absent.
    #[serde(default)]
    pub avatar: Option<AvatarUpload>,
}

/// A display name. [`UserName::new`] checks input; stored names are read back
/// as they were written, however old the rules they passed.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The user name is invalid: {0:?}")]
pub struct InvalidUserNameError(String);

impl UserName {
    pub fn new(name: &str) -> Result<Self, InvalidUserNameError> {
        let trimmed = name.trim();
        if !trimmed.is_empty() && trimmed.chars().count() <= USER_NAME_MAX_LEN {
            Ok(UserName(trimmed.to_owned()))
        } else {
            Err(InvalidUserNameError(name.to_owned()))
        }
    }

    /// Takes a name from storage without checking it.
    #[must_use]
    pub fn from_stored(name: String) -> Self {
        UserName(name)
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


/// An e-mail address. New ones must have the shape `local@domain.tld` without
/// whitespace; stored ones are trusted.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The e-mail address is invalid: {0:?}")]
pub struct InvalidEmailError(String);

impl Email {
    pub fn new(email: &str) -> Result<Self, InvalidEmailError> {
        let trimmed = email.trim();
        if is_valid_email(trimmed) {
            Ok(Email(trimmed.to_owned()))
        } else {
            Err(InvalidEmailError(email.to_owned()))
        }
    }

    /// Takes an address from storage without checking it.
    #[must_use]
    pub fn from_stored(email: String) -> Self {
        Email(email)
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

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // At least one character on each side of some dot in the domain.
    domain
        .char_indices()
        .any(|(index, c)| c == '.' && index > 0 && index + 1 < domain.len())
}


/// An already uploaded avatar image, described by where it lives and what it is.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarUpload {
    pub url: String,
    pub mime_type: String,
    pub size: u64,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum InvalidAvatarError {
    #[error("The avatar must be an image, got {0:?}")]
    NotAnImage(String),
    #[error("The avatar must be at most 2 MiB, got {0} bytes")]
    TooLarge(u64),
}

impl AvatarUpload {
    /// Checks the upload and returns the reference to store on the user.
    pub fn validate(self) -> Result<String, InvalidAvatarError> {
        if !self.mime_type.starts_with("image/") {
            return Err(InvalidAvatarError::NotAnImage(self.mime_type));
        }
        if self.size > AVATAR_MAX_BYTES {
            return Err(InvalidAvatarError::TooLarge(self.size));
        }

        Ok(self.url)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::user::{
        AVATAR_MAX_BYTES, AvatarUpload, Email, InvalidAvatarError, Profile, USER_NAME_MAX_LEN,
        UserName,
    };

    #[test]
    fn email_shapes() {
        for valid in ["ana@x.com", "a.b@c.d.e", "  bob@pets.org "] {
            assert!(Email::new(valid).is_ok(), "{valid} should be accepted");
        }
        for invalid in [
            "",
            "ana",
            "ana@x",
            "@x.com",
            "ana@.com",
            "ana@x.",
            "ana@@x.com",
            "an a@x.com",
            "ana@x@y.com",
        ] {
            assert!(Email::new(invalid).is_err(), "{invalid} should be rejected");
        }

        assert_eq!(Email::new(" bob@pets.org ").unwrap().get(), "bob@pets.org");
    }

    #[test]
    fn user_name_bounds() {
        assert_eq!(UserName::new(" Ana ").unwrap().get(), "Ana");
        assert!(UserName::new("   ").is_err());
        assert!(UserName::new(&"a".repeat(USER_NAME_MAX_LEN)).is_ok());
        assert!(UserName::new(&"a".repeat(USER_NAME_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn stored_profiles_are_read_without_checks() {
        let long_name = "a".repeat(USER_NAME_MAX_LEN + 10);
        let stored = format!(r#"{{"id": "1", "name": "{long_name}", "email": "apa@local"}}"#);

        let profile: Profile = serde_json::from_str(&stored).unwrap();

        assert_eq!(profile.name, UserName::from_stored(long_name));
        assert_eq!(profile.email.get(), "apa@local");
    }

    #[test]
    fn avatar_validation() {
        let upload = |mime_type: &str, size| AvatarUpload {
            url: "https://cdn.example/a.png".to_owned(),
            mime_type: mime_type.to_owned(),
            size,
        };

        assert_eq!(
            upload("image/png", AVATAR_MAX_BYTES).validate(),
            Ok("https://cdn.example/a.png".to_owned())
        );
        assert_eq!(
            upload("application/pdf", 10).validate(),
            Err(InvalidAvatarError::NotAnImage("application/pdf".to_owned()))
        );
        assert_eq!(
            upload("image/gif", AVATAR_MAX_BYTES + 1).validate(),
            Err(InvalidAvatarError::TooLarge(AVATAR_MAX_BYTES + 1))
        );
    }
}
