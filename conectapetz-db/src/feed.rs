use crate::{
    client::{Applied, DbClient, StorageKey},
    seed,
};
use conectapetz_common::{
    feed::{Feed, FeedError},
    model::{
        Id, IdGenerator,
        comment::{Comment, CommentMarker},
        post::{Author, CreatePost, EditPost, Post, PostMarker},
        user::Profile,
    },
    outcome::Outcome,
    reaction::{ReactionCounts, ReactionKind, Toggle},
};
use std::convert::Infallible;
use time::OffsetDateTime;
use tracing::debug;

pub type FeedResult<T> = Result<Applied<T, Feed>, FeedError>;

impl DbClient {
    fn default_feed(&self) -> impl FnOnce() -> Feed + use<> {
        let seed = self.seeds_defaults();
        move || if seed { seed::welcome_feed() } else { Feed::default() }
    }

    async fn apply_to_feed<T, E>(
        &self,
        mutation: impl FnOnce(&mut Feed, &mut IdGenerator) -> Result<Outcome<T>, E>,
    ) -> Result<Applied<T, Feed>, E> {
        self.apply(StorageKey::Posts, self.default_feed(), mutation)
            .await
    }

    /// All posts, newest first. Seeds the welcome posts on first access. An
    /// unreadable feed reads as empty and stays stored as it is.
    pub async fn posts(&self) -> Feed {
        self.init_if_empty(StorageKey::Posts, self.default_feed())
            .await
            .unwrap_or_default()
    }

    pub async fn post(&self, post_id: &str) -> Option<Post> {
        self.posts().await.post(post_id).cloned()
    }

    pub async fn create_post(&self, author: &Profile, post: CreatePost) -> FeedResult<Id<PostMarker>> {
        let author = Author::from(author);
        let applied = self
            .apply_to_feed(|feed, ids| -> Result<_, FeedError> {
                let post = post.into_post(Id::generate(ids), author, OffsetDateTime::now_utc())?;
                let id = post.id.clone();
                feed.publish(post);
                Ok(Outcome::Changed(id))
            })
            .await?;

        if let Outcome::Changed(id) = &applied.outcome {
            debug!(post = %id, "Created post");
        }
        Ok(applied)
    }

    pub async fn edit_post(&self, editor: &Profile, post_id: &str, edit: EditPost) -> FeedResult<()> {
        self.apply_to_feed(|feed, _| feed.edit_post(post_id, editor.email.get(), edit))
            .await
    }

    pub async fn delete_post(&self, editor: &Profile, post_id: &str) -> FeedResult<Post> {
        self.apply_to_feed(|feed, _| feed.delete_post(post_id, editor.email.get()))
            .await
    }

    pub async fn toggle_reaction(
        &self,
        user: &Profile,
        post_id: &str,
        kind: ReactionKind,
    ) -> Applied<Toggle, Feed> {
        let Ok(applied) = self
            .apply_to_feed(|feed, _| {
                Ok::<_, Infallible>(feed.toggle_reaction(post_id, user.email.get(), kind))
            })
            .await;

        applied
    }

    pub async fn user_reaction(&self, post_id: &str, user: &str) -> Option<ReactionKind> {
        self.posts().await.user_reaction(post_id, user)
    }

    pub async fn reaction_counts(&self, post_id: &str) -> Option<ReactionCounts> {
        self.posts().await.reaction_counts(post_id)
    }

    /// Blank text leaves the post alone.
    pub async fn add_comment(
        &self,
        author: &Profile,
        post_id: &str,
        text: &str,
    ) -> Applied<Id<CommentMarker>, Feed> {
        let author = Author::from(author);
        let Ok(applied) = self
            .apply_to_feed(|feed, ids| {
                let outcome =
                    match Comment::new(Id::generate(ids), author, text, OffsetDateTime::now_utc()) {
                        Ok(comment) => feed.add_comment(post_id, comment),
                        Err(reason) => Outcome::Unchanged(reason),
                    };
                Ok::<_, Infallible>(outcome)
            })
            .await;

        applied
    }

    pub async fn edit_comment(
        &self,
        editor: &Profile,
        post_id: &str,
        comment_id: &str,
        text: &str,
    ) -> FeedResult<()> {
        self.apply_to_feed(|feed, _| feed.edit_comment(post_id, comment_id, editor.email.get(), text))
            .await
    }

    pub async fn delete_comment(
        &self,
        editor: &Profile,
        post_id: &str,
        comment_id: &str,
    ) -> FeedResult<Comment> {
        self.apply_to_feed(|feed, _| feed.delete_comment(post_id, comment_id, editor.email.get()))
            .await
    }
}
