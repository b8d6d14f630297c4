use crate::{
    model::{
        Id, IdPrefix, ModelValidationError, comment::Comment, require_text, user::Profile,
    },
    reaction::{Reactions, deserialize_nullable},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;
impl IdPrefix for PostMarker {
    const PREFIX: &'static str = "post";
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Id<PostMarker>,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub body: String,
    pub author: Author,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub reactions: Reactions,
}

/// Seeded posts name an author without an e-mail; nobody can edit those.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Author {
    #[must_use]
    pub fn is(&self, email: &str) -> bool {
        self.email.as_deref() == Some(email)
    }
}

impl From<&Profile> for Author {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name.get().to_owned(),
            email: Some(profile.email.get().to_owned()),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub enum MediaKind {
    #[serde(rename = "image/jpeg", alias = "image/jpg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/gif")]
    Gif,
    #[serde(rename = "application/pdf")]
    Pdf,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
#[error("Attachments must be .jpg, .jpeg, .png, .gif or .pdf, got {0:?}")]
pub struct UnsupportedMediaTypeError(String);

impl MediaKind {
    pub fn from_mime(mime_type: &str) -> Result<Self, UnsupportedMediaTypeError> {
        match mime_type {
            "image/jpeg" | "image/jpg" => Ok(MediaKind::Jpeg),
            "image/png" => Ok(MediaKind::Png),
            "image/gif" => Ok(MediaKind::Gif),
            "application/pdf" => Ok(MediaKind::Pdf),
            other => Err(UnsupportedMediaTypeError(other.to_owned())),
        }
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            MediaKind::Jpeg => "image/jpeg",
            MediaKind::Png => "image/png",
            MediaKind::Gif => "image/gif",
            MediaKind::Pdf => "application/pdf",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub url: String,
    #[serde(rename = "mimeType")]
    pub kind: MediaKind,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentUpload {
    pub url: String,
    pub mime_type: String,
}

impl TryFrom<AttachmentUpload> for Attachment {
    type Error = UnsupportedMediaTypeError;

    fn try_from(value: AttachmentUpload) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: MediaKind::from_mime(&value.mime_type)?,
            url: value.url,
        })
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct CreatePost {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub body: String,
    #[serde(default)]
    pub attachment: Option<AttachmentUpload>,
}

impl CreatePost {
    /// Builds the post with no comments and an empty reaction ledger.
    pub fn into_post(
        self,
        id: Id<PostMarker>,
        author: Author,
        date: OffsetDateTime,
    ) -> Result<Post, ModelValidationError> {
        Ok(Post {
            id,
            title: require_text("title", &self.title)?,
            summary: self.summary.trim().to_owned(),
            body: require_text("body", &self.body)?,
            author,
            date,
            attachment: self.attachment.map(Attachment::try_from).transpose()?,
            comments: Vec::new(),
            reactions: Reactions::default(),
        })
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct EditPost {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub body: String,
}

impl EditPost {
    /// Trims the fields and checks the required ones.
    pub fn validate(self) -> Result<Self, ModelValidationError> {
        Ok(Self {
            title: require_text("title", &self.title)?,
            summary: self.summary.trim().to_owned(),
            body: require_text("body", &self.body)?,
        })
    }

    pub fn apply(self, post: &mut Post) {
        post.title = self.title;
        post.summary = self.summary;
        post.body = self.body;
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{
        Id, ModelValidationError,
        post::{Attachment, AttachmentUpload, Author, CreatePost, MediaKind, Post},
    };
    use crate::reaction::{ReactionCounts, Reactions};
    use time::macros::datetime;

    fn create(title: &str, body: &str, mime_type: Option<&str>) -> CreatePost {
        CreatePost {
            title: title.to_owned(),
            summary: String::new(),
            body: body.to_owned(),
            attachment: mime_type.map(|mime_type| AttachmentUpload {
                url: "blob:pet".to_owned(),
                mime_type: mime_type.to_owned(),
            }),
        }
    }

    #[test]
    fn new_posts_start_empty() {
        let post = create(" Olá ", "Mundo", Some("image/jpg"))
            .into_post(
                Id::new("post-1"),
                Author::default(),
                datetime!(2025-11-03 10:00 UTC),
            )
            .unwrap();

        assert_eq!(post.title, "Olá");
        assert!(post.comments.is_empty());
        assert_eq!(post.reactions, Reactions::default());
        assert_eq!(post.reactions.counts(), ReactionCounts::default());
        assert_eq!(
            post.attachment,
            Some(Attachment {
                url: "blob:pet".to_owned(),
                kind: MediaKind::Jpeg
            })
        );
    }

    #[test]
    fn posts_need_title_body_and_known_media() {
        let date = datetime!(2025-11-03 10:00 UTC);

        assert_eq!(
            create("", "Mundo", None).into_post(Id::new("p"), Author::default(), date),
            Err(ModelValidationError::Blank("title"))
        );
        assert_eq!(
            create("Olá", "  ", None).into_post(Id::new("p"), Author::default(), date),
            Err(ModelValidationError::Blank("body"))
        );
        assert!(matches!(
            create("Olá", "Mundo", Some("video/mp4")).into_post(
                Id::new("p"),
                Author::default(),
                date
            ),
            Err(ModelValidationError::MediaType(_))
        ));
    }

    #[test]
    fn seeded_posts_with_legacy_fields_load() {
        let post: Post = serde_json::from_str(
            r#"{
                "id": "post-1",
                "title": "Bem-vindo",
                "summary": "Plataforma",
                "body": "Texto",
                "author": {"name": "Equipe"},
                "date": "2025-11-03T10:00:00.000Z",
                "reactions": {"like": 0, "love": 0, "question": 0},
                "comments": [{"author": "Ana", "text": "Oi", "date": "2025-11-03T11:00:00.000Z"}]
            }"#,
        )
        .unwrap();

        assert_eq!(post.author.email, None);
        assert!(post.reactions.is_legacy());
        assert!(post.comments[0].id.is_empty());
        assert_eq!(post.comments[0].author_email, None);
    }

    #[test]
    fn null_reactions_read_as_empty_ledger() {
        let post: Post = serde_json::from_str(
            r#"{"id": "post-2", "title": "t", "body": "b", "author": {"name": "n"},
                "date": "2025-11-03T10:00:00Z", "reactions": null}"#,
        )
        .unwrap();

        assert_eq!(post.reactions, Reactions::default());
    }

    #[test]
    fn author_matching_needs_an_email() {
        let seeded = Author {
            name: "Equipe".to_owned(),
            email: None,
        };
        let ana = Author {
            name: "Ana".to_owned(),
            email: Some("ana@x.com".to_owned()),
        };

        assert!(!seeded.is("ana@x.com"));
        assert!(ana.is("ana@x.com"));
    }

    #[test]
    fn media_kinds_round_trip_their_mime_types() {
        for kind in [MediaKind::Jpeg, MediaKind::Png, MediaKind::Gif, MediaKind::Pdf] {
            assert_eq!(MediaKind::from_mime(kind.mime_type()), Ok(kind));
        }
    }
}
