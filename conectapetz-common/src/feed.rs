//! The ordered post collection and the operations on it.
//!
//! Everything here is pure: the caller loads the feed, applies one operation
//! and writes the whole feed back when the outcome says it changed.

use crate::{
    model::{
        Id, ModelValidationError,
        comment::{Comment, CommentMarker},
        post::{EditPost, Post},
    },
    outcome::{NoChange, Outcome},
    reaction::{ReactionCounts, ReactionKind, Toggle},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum FeedError {
    #[error("Only the author may change this post")]
    NotPostAuthor,
    #[error("Only the author may change this comment")]
    NotCommentAuthor,
    #[error(transparent)]
    Validation(#[from] ModelValidationError),
}

/// Posts, newest first.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Feed {
    posts: Vec<Post>,
}

impl From<Vec<Post>> for Feed {
    fn from(posts: Vec<Post>) -> Self {
        Self { posts }
    }
}

impl Feed {
    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    #[must_use]
    pub fn post(&self, post_id: &str) -> Option<&Post> {
        self.posts.iter().find(|post| post.id.as_str() == post_id)
    }

    fn post_mut(&mut self, post_id: &str) -> Result<&mut Post, NoChange> {
        self.posts
            .iter_mut()
            .find(|post| post.id.as_str() == post_id)
            .ok_or(NoChange::PostNotFound)
    }

    /// Puts `post` at the front.
    pub fn publish(&mut self, post: Post) {
        self.posts.insert(0, post);
    }

    pub fn edit_post(
        &mut self,
        post_id: &str,
        editor: &str,
        edit: EditPost,
    ) -> Result<Outcome<()>, FeedError> {
        let edit = edit.validate()?;
        let post = match self.post_mut(post_id) {
            Ok(post) => post,
            Err(reason) => return Ok(Outcome::Unchanged(reason)),
        };
        if !post.author.is(editor) {
            return Err(FeedError::NotPostAuthor);
        }

        edit.apply(post);
        Ok(Outcome::Changed(()))
    }

    pub fn delete_post(&mut self, post_id: &str, editor: &str) -> Result<Outcome<Post>, FeedError> {
        let Some(index) = self.posts.iter().position(|post| post.id.as_str() == post_id) else {
            return Ok(Outcome::Unchanged(NoChange::PostNotFound));
        };
        if !self.posts[index].author.is(editor) {
            return Err(FeedError::NotPostAuthor);
        }

        Ok(Outcome::Changed(self.posts.remove(index)))
    }

    pub fn toggle_reaction(&mut self, post_id: &str, user: &str, kind: ReactionKind) -> Outcome<Toggle> {
        self.post_mut(post_id)
            .map(|post| post.reactions.toggle(user, kind))
            .into()
    }

    #[must_use]
    pub fn user_reaction(&self, post_id: &str, user: &str) -> Option<ReactionKind> {
        self.post(post_id)?.reactions.reaction_of(user)
    }

    #[must_use]
    pub fn reaction_counts(&self, post_id: &str) -> Option<ReactionCounts> {
        self.post(post_id).map(|post| post.reactions.counts())
    }

    pub fn add_comment(&mut self, post_id: &str, comment: Comment) -> Outcome<Id<CommentMarker>> {
        self.post_mut(post_id)
            .map(|post| {
                let id = comment.id.clone();
                post.comments.push(comment);
                id
            })
            .into()
    }

    /// The comments of `post_id` and the index of `comment_id` among them, once
    /// `editor` is known to have written it.
    fn authored_comment(
        &mut self,
        post_id: &str,
        comment_id: &str,
        editor: &str,
    ) -> Result<Result<(&mut Vec<Comment>, usize), NoChange>, FeedError> {
        let comments = match self.post_mut(post_id) {
            Ok(post) => &mut post.comments,
            Err(reason) => return Ok(Err(reason)),
        };
        let Some(index) = comments
            .iter()
            .position(|comment| !comment.id.is_empty() && comment.id.as_str() == comment_id)
        else {
            return Ok(Err(NoChange::CommentNotFound));
        };
        if !comments[index].is_authored_by(editor) {
            return Err(FeedError::NotCommentAuthor);
        }

        Ok(Ok((comments, index)))
    }

    pub fn edit_comment(
        &mut self,
        post_id: &str,
        comment_id: &str,
        editor: &str,
        text: &str,
    ) -> Result<Outcome<()>, FeedError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Outcome::Unchanged(NoChange::EmptyInput));
        }

        Ok(self
            .authored_comment(post_id, comment_id, editor)?
            .map(|(comments, index)| text.clone_into(&mut comments[index].text))
            .into())
    }

    pub fn delete_comment(
        &mut self,
        post_id: &str,
        comment_id: &str,
        editor: &str,
    ) -> Result<Outcome<Comment>, FeedError> {
        Ok(self
            .authored_comment(post_id, comment_id, editor)?
            .map(|(comments, index)| comments.remove(index))
            .into())
    }

    /// Moves post authorship, comment authorship and reaction memberships from the
    /// e-mail `old` to `new`. Author names are left as they were written.
    pub fn rename_user(&mut self, old: &str, new: &str) -> bool {
        let mut renamed = false;
        for post in &mut self.posts {
            if post.author.is(old) {
                post.author.email = Some(new.to_owned());
                renamed = true;
            }
            for comment in &mut post.comments {
                if comment.is_authored_by(old) {
                    comment.author_email = Some(new.to_owned());
                    renamed = true;
                }
            }
            renamed |= post.reactions.rename_user(old, new);
        }

        renamed
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        feed::{Feed, FeedError},
        model::{
            Id, ModelValidationError,
            comment::Comment,
            post::{Author, CreatePost, EditPost},
        },
        outcome::{NoChange, Outcome},
        reaction::{ReactionCounts, ReactionKind, Toggle},
    };
    use time::macros::datetime;

    const ANA: &str = "ana@x.com";
    const BIA: &str = "bia@x.com";

    fn author(email: Option<&str>) -> Author {
        Author {
            name: "Ana".to_owned(),
            email: email.map(str::to_owned),
        }
    }

    fn feed_with(ids: &[(&str, Option<&str>)]) -> Feed {
        let mut feed = Feed::default();
        for (id, email) in ids.iter().rev() {
            let post = CreatePost {
                title: "Olá".to_owned(),
                summary: String::new(),
                body: "Mundo".to_owned(),
                attachment: None,
            }
            .into_post(Id::new(*id), author(*email), datetime!(2025-11-03 10:00 UTC))
            .unwrap();
            feed.publish(post);
        }
        feed
    }

    fn edit(title: &str) -> EditPost {
        EditPost {
            title: title.to_owned(),
            summary: String::new(),
            body: "Outro".to_owned(),
        }
    }

    #[test]
    fn published_posts_go_first() {
        let feed = feed_with(&[("post-2", Some(ANA)), ("post-1", None)]);

        let ids: Vec<_> = feed.posts().iter().map(|post| post.id.as_str()).collect();
        assert_eq!(ids, ["post-2", "post-1"]);
    }

    #[test]
    fn reacting_to_unknown_post_changes_nothing() {
        let mut feed = feed_with(&[("post-1", None)]);
        let before = feed.clone();

        assert_eq!(
            feed.toggle_reaction("post-9", ANA, ReactionKind::Like),
            Outcome::Unchanged(NoChange::PostNotFound)
        );
        assert_eq!(feed, before);
    }

    #[test]
    fn reactions_toggle_per_post() {
        let mut feed = feed_with(&[("post-1", None), ("post-2", None)]);

        assert_eq!(
            feed.toggle_reaction("post-1", ANA, ReactionKind::Like),
            Outcome::Changed(Toggle::Added {
                kind: ReactionKind::Like
            })
        );
        feed.toggle_reaction("post-1", BIA, ReactionKind::Love);

        assert_eq!(feed.user_reaction("post-1", ANA), Some(ReactionKind::Like));
        assert_eq!(feed.user_reaction("post-2", ANA), None);
        assert_eq!(
            feed.reaction_counts("post-1"),
            Some(ReactionCounts {
                like: 1,
                love: 1,
                question: 0
            })
        );
        assert_eq!(feed.reaction_counts("post-9"), None);
    }

    #[test]
    fn only_authors_edit_and_delete_posts() {
        let mut feed = feed_with(&[("post-1", Some(ANA)), ("post-2", None)]);

        assert_eq!(
            feed.edit_post("post-1", BIA, edit("Novo")),
            Err(FeedError::NotPostAuthor)
        );
        assert_eq!(
            feed.edit_post("post-2", ANA, edit("Novo")),
            Err(FeedError::NotPostAuthor)
        );
        assert_eq!(feed.delete_post("post-1", BIA), Err(FeedError::NotPostAuthor));

        assert_eq!(
            feed.edit_post("post-1", ANA, edit(" Novo ")),
            Ok(Outcome::Changed(()))
        );
        assert_eq!(feed.posts()[0].title, "Novo");
        assert!(matches!(feed.delete_post("post-1", ANA), Ok(Outcome::Changed(post)) if post.id.as_str() == "post-1"));
        assert_eq!(feed.posts().len(), 1);
    }

    #[test]
    fn editing_checks_input_then_existence() {
        let mut feed = feed_with(&[("post-1", Some(ANA))]);

        assert_eq!(
            feed.edit_post("post-9", ANA, edit("  ")),
            Err(FeedError::Validation(ModelValidationError::Blank("title")))
        );
        assert_eq!(
            feed.edit_post("post-9", ANA, edit("Novo")),
            Ok(Outcome::Unchanged(NoChange::PostNotFound))
        );
        assert_eq!(
            feed.delete_post("post-9", ANA),
            Ok(Outcome::Unchanged(NoChange::PostNotFound))
        );
    }

    #[test]
    fn comment_lifecycle() {
        let mut feed = feed_with(&[("post-1", None)]);
        let comment = Comment::new(
            Id::new("comment-1"),
            author(Some(ANA)),
            "Que fofo",
            datetime!(2025-11-03 11:00 UTC),
        )
        .unwrap();

        assert_eq!(
            feed.add_comment("post-9", comment.clone()),
            Outcome::Unchanged(NoChange::PostNotFound)
        );
        assert_eq!(
            feed.add_comment("post-1", comment),
            Outcome::Changed(Id::new("comment-1"))
        );

        assert_eq!(
            feed.edit_comment("post-1", "comment-1", BIA, "Oi"),
            Err(FeedError::NotCommentAuthor)
        );
        assert_eq!(
            feed.edit_comment("post-1", "comment-1", ANA, "  "),
            Ok(Outcome::Unchanged(NoChange::EmptyInput))
        );
        assert_eq!(
            feed.edit_comment("post-1", "comment-2", ANA, "Oi"),
            Ok(Outcome::Unchanged(NoChange::CommentNotFound))
        );
        assert_eq!(
            feed.edit_comment("post-1", "comment-1", ANA, " Muito fofo "),
            Ok(Outcome::Changed(()))
        );
        assert_eq!(feed.posts()[0].comments[0].text, "Muito fofo");

        assert!(matches!(
            feed.delete_comment("post-1", "comment-1", ANA),
            Ok(Outcome::Changed(comment)) if comment.text == "Muito fofo"
        ));
        assert!(feed.posts()[0].comments.is_empty());
    }

    #[test]
    fn legacy_comments_without_ids_are_not_addressable() {
        let mut feed = feed_with(&[("post-1", None)]);
        let mut legacy = Comment::new(
            Id::new(""),
            author(Some(ANA)),
            "Oi",
            datetime!(2025-11-03 11:00 UTC),
        )
        .unwrap();
        legacy.author_email = None;
        let _ = feed.add_comment("post-1", legacy);

        assert_eq!(
            feed.delete_comment("post-1", "", ANA),
            Ok(Outcome::Unchanged(NoChange::CommentNotFound))
        );
    }

    #[test]
    fn renaming_rewrites_authorship_and_reactions() {
        let mut feed = feed_with(&[("post-1", Some(ANA)), ("post-2", None)]);
        let comment = Comment::new(
            Id::new("comment-1"),
            author(Some(ANA)),
            "Oi",
            datetime!(2025-11-03 11:00 UTC),
        )
        .unwrap();
        let _ = feed.add_comment("post-2", comment);
        let _ = feed.toggle_reaction("post-2", ANA, ReactionKind::Love);

        assert!(feed.rename_user(ANA, "ana@y.com"));

        assert!(feed.posts()[0].author.is("ana@y.com"));
        assert_eq!(feed.posts()[0].author.name, "Ana");
        assert!(feed.posts()[1].comments[0].is_authored_by("ana@y.com"));
        assert_eq!(
            feed.user_reaction("post-2", "ana@y.com"),
            Some(ReactionKind::Love)
        );
        assert!(!feed.rename_user(ANA, "ana@z.com"));
    }
}
