pub mod auth;
pub mod comment;
pub mod post;
pub mod user;

use crate::{
    model::{
        auth::InvalidPasswordHashError,
        post::UnsupportedMediaTypeError,
        user::{InvalidAvatarError, InvalidEmailError, InvalidUserNameError},
    },
    snowflake::{Epoch, Snowflake, SnowflakeGenerator},
};
use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, fmt::Display, marker::PhantomData};
use thiserror::Error;
use time::{UtcDateTime, macros::utc_datetime};

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum ModelValidationError {
    #[error(transparent)]
    UserName(#[from] InvalidUserNameError),
    #[error(transparent)]
    Email(#[from] InvalidEmailError),
    #[error(transparent)]
    Avatar(#[from] InvalidAvatarError),
    #[error(transparent)]
    MediaType(#[from] UnsupportedMediaTypeError),
    #[error(transparent)]
    PasswordHash(#[from] InvalidPasswordHashError),
    #[error("The {0} must not be blank")]
    Blank(&'static str),
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct ConectapetzEpoch;
impl Epoch for ConectapetzEpoch {
    const EPOCH_TIME: UtcDateTime = utc_datetime!(2025-01-01 00:00);
}

pub type ConectapetzSnowflake = Snowflake<ConectapetzEpoch>;
pub type IdGenerator = SnowflakeGenerator<ConectapetzEpoch>;

/// The prefix generated identifiers of a kind start with, e.g. `post` in `post-123`.
pub trait IdPrefix {
    const PREFIX: &'static str;
}

/// A string identifier tagged with the kind of object it names.
///
/// Identifiers read from storage are taken as-is, so hand-written ones such as
/// `col-1` stay valid next to generated ones.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<Marker>(String, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into(), PhantomData)
    }

    #[must_use]
    pub fn generate(generator: &mut IdGenerator) -> Self
    where
        Marker: IdPrefix,
    {
        Self::from_snowflake(generator.generate())
    }

    #[must_use]
    pub fn from_snowflake(snowflake: ConectapetzSnowflake) -> Self
    where
        Marker: IdPrefix,
    {
        Self::new(format!("{}-{snowflake}", Marker::PREFIX))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> Borrow<str> for Id<Marker> {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<Marker> From<&str> for Id<Marker> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<Marker> From<String> for Id<Marker> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Returns the trimmed value, or [`ModelValidationError::Blank`] naming `field`.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<String, ModelValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ModelValidationError::Blank(field))
    } else {
        Ok(trimmed.to_owned())
    }
}
