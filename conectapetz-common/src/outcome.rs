use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a mutation left everything as it was.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum NoChange {
    #[error("the post does not exist")]
    PostNotFound,
    #[error("the comment does not exist")]
    CommentNotFound,
    #[error("the column does not exist")]
    ColumnNotFound,
    #[error("the card does not exist")]
    CardNotFound,
    #[error("no input was given")]
    EmptyInput,
    #[error("the drag ended outside any drop target")]
    NoDropTarget,
    #[error("the item is already at that position")]
    SamePosition,
    #[error("the change could not be written to storage")]
    NotPersisted,
    #[error("the stored collection could not be read")]
    Unreadable,
}

/// The result of a mutation that is allowed to do nothing.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
#[must_use]
pub enum Outcome<T> {
    Changed(T),
    Unchanged(NoChange),
}

impl<T> Outcome<T> {
    #[must_use]
    pub fn is_changed(&self) -> bool {
        matches!(self, Outcome::Changed(_))
    }

    #[must_use]
    pub fn changed(self) -> Option<T> {
        match self {
            Outcome::Changed(value) => Some(value),
            Outcome::Unchanged(_) => None,
        }
    }

    #[must_use]
    pub fn reason(&self) -> Option<NoChange> {
        match self {
            Outcome::Changed(_) => None,
            Outcome::Unchanged(reason) => Some(*reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Changed(value) => Outcome::Changed(f(value)),
            Outcome::Unchanged(reason) => Outcome::Unchanged(reason),
        }
    }
}

impl<T> From<Result<T, NoChange>> for Outcome<T> {
    fn from(value: Result<T, NoChange>) -> Self {
        match value {
            Ok(value) => Outcome::Changed(value),
            Err(reason) => Outcome::Unchanged(reason),
        }
    }
}
