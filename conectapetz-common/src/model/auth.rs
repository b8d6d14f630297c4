use argon2::{Argon2, Params};
use base64::{DecodeError, Engine, display::Base64Display, prelude::BASE64_STANDARD};
use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};
use thiserror::Error;

pub const PASSWORD_SALT_LEN: usize = 16;
pub const PASSWORD_HASH_LEN: usize = Params::DEFAULT_OUTPUT_LEN;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("Hashing password failed: {0}")]
pub struct PasswordHashingError(argon2::Error);

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum InvalidPasswordHashError {
    #[error("Missing ':' between salt and hash")]
    MissingSeparator,
    #[error("Decoding base64 failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("The length of the salt part is incorrect")]
    InvalidSaltLength,
    #[error("The length of the hash part is incorrect")]
    InvalidHashLength,
}

/// An argon2 password hash with its salt, encoded as `base64(salt):base64(hash)`.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct PasswordHash {
    salt: [u8; PASSWORD_SALT_LEN],
    hash: Box<[u8; PASSWORD_HASH_LEN]>,
}

impl PasswordHash {
    pub fn generate(password: &str) -> Result<Self, PasswordHashingError> {
        Self::with_salt(password, rand::random())
    }

    pub fn with_salt(
        password: &str,
        salt: [u8; PASSWORD_SALT_LEN],
    ) -> Result<Self, PasswordHashingError> {
        let argon2 = Argon2::default();

        let mut hash = Box::new([0; PASSWORD_HASH_LEN]);
        argon2
            .hash_password_into(password.as_bytes(), &salt, &mut *hash)
            .map_err(PasswordHashingError)?;

        Ok(Self { salt, hash })
    }

    pub fn verify(&self, password: &str) -> Result<bool, PasswordHashingError> {
        let candidate = Self::with_salt(password, self.salt)?;
        Ok(candidate.hash == self.hash)
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let encoded_salt = Base64Display::new(&self.salt, &BASE64_STANDARD);
        let encoded_hash = Base64Display::new(&*self.hash, &BASE64_STANDARD);

        write!(f, "{encoded_salt}:{encoded_hash}")
    }
}

impl FromStr for PasswordHash {
    type Err = InvalidPasswordHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (salt_part, hash_part) = s.split_once(':').ok_or(Self::Err::MissingSeparator)?;

        let salt = BASE64_STANDARD
            .decode(salt_part)?
            .try_into()
            .map_err(|_| Self::Err::InvalidSaltLength)?;
        let hash = BASE64_STANDARD
            .decode(hash_part)?
            .into_boxed_slice()
            .try_into()
            .map_err(|_| Self::Err::InvalidHashLength)?;

        Ok(Self { salt, hash })
    }
}

impl Debug for PasswordHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PasswordHash").field(&"[redacted]").finish()
    }
}

/// How a user's password is kept.
#[derive(Clone, Eq, PartialEq, Hash)]
pub enum Credential {
    Hashed(PasswordHash),
    /// Plaintext left over from records written before hashing; replaced on login.
    Legacy(String),
}

impl Credential {
    pub fn verify(&self, password: &str) -> Result<bool, PasswordHashingError> {
        match self {
            Credential::Hashed(hash) => hash.verify(password),
            Credential::Legacy(plaintext) => Ok(plaintext == password),
        }
    }

    #[must_use]
    pub fn is_legacy(&self) -> bool {
        matches!(self, Credential::Legacy(_))
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Hashed(hash) => f.debug_tuple("Hashed").field(hash).finish(),
            Credential::Legacy(_) => f.debug_tuple("Legacy").field(&"[redacted]").finish(),
        }
    }
}
