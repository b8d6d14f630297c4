use crate::{
    model::{Id, IdPrefix, post::Author},
    outcome::NoChange,
    reaction::Reactions,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;
impl IdPrefix for CommentMarker {
    const PREFIX: &'static str = "comment";
}

/// A comment under a post.
///
/// Comments written before ids and author e-mails were recorded load with an
/// empty id and no e-mail. They are shown but can't be edited or deleted.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub id: Id<CommentMarker>,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Reactions>,
}

impl Comment {
    /// Fails with [`NoChange::EmptyInput`] when `text` is blank.
    pub fn new(
        id: Id<CommentMarker>,
        author: Author,
        text: &str,
        date: OffsetDateTime,
    ) -> Result<Self, NoChange> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NoChange::EmptyInput);
        }

        Ok(Self {
            id,
            author: author.name,
            author_email: author.email,
            text: text.to_owned(),
            date,
            reactions: None,
        })
    }

    #[must_use]
    pub fn is_authored_by(&self, email: &str) -> bool {
        self.author_email.as_deref() == Some(email)
    }
}
