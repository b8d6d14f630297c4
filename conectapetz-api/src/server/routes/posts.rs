use crate::server::{
    MutationResponse, Result, ServerError, ServerRouter, ServerState, auth::CurrentUser,
    json::Json,
};
use axum::{Router, extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use conectapetz_common::{
    feed::Feed,
    model::{
        Id,
        comment::{Comment, CommentMarker},
        post::{CreatePost, EditPost, Post, PostMarker},
    },
    reaction::{ReactionCounts, ReactionKind, Toggle},
};
use conectapetz_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_get(list_posts)
        .typed_post(create_post)
        .typed_patch(edit_post)
        .typed_delete(delete_post)
        .typed_get(reactions)
        .typed_post(toggle_reaction)
        .typed_post(add_comment)
        .typed_patch(edit_comment)
        .typed_delete(delete_comment)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts", rejection(ServerError))]
struct PostsPath();

#[axum::debug_handler(state = ServerState)]
async fn list_posts(
    _: PostsPath,
    _: CurrentUser,
    State(db): State<Arc<DbClient>>,
) -> Json<Feed> {
    Json(db.posts().await)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/create", rejection(ServerError))]
struct CreatePostPath();

#[axum::debug_handler(state = ServerState)]
async fn create_post(
    _: CreatePostPath,
    CurrentUser(user): CurrentUser,
    State(db): State<Arc<DbClient>>,
    Json(post): Json<CreatePost>,
) -> Result<(StatusCode, Json<MutationResponse<Id<PostMarker>, Feed>>)> {
    let applied = db.create_post(&user, post).await?;
    let status = if applied.outcome.is_changed() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(applied.into())))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct EditPostPath {
    id: Id<PostMarker>,
}

#[axum::debug_handler(state = ServerState)]
async fn edit_post(
    EditPostPath { id }: EditPostPath,
    CurrentUser(user): CurrentUser,
    State(db): State<Arc<DbClient>>,
    Json(edit): Json<EditPost>,
) -> Result<Json<MutationResponse<(), Feed>>> {
    let applied = db.edit_post(&user, id.as_str(), edit).await?;

    Ok(Json(applied.into()))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct DeletePostPath {
    id: Id<PostMarker>,
}

#[axum::debug_handler(state = ServerState)]
async fn delete_post(
    DeletePostPath { id }: DeletePostPath,
    CurrentUser(user): CurrentUser,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<MutationResponse<Post, Feed>>> {
    let applied = db.delete_post(&user, id.as_str()).await?;

    Ok(Json(applied.into()))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/reactions", rejection(ServerError))]
struct ReactionsPath {
    id: Id<PostMarker>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Serialize)]
struct ReactionSummary {
    counts: ReactionCounts,
    /// What the requesting user reacted with.
    current: Option<ReactionKind>,
}

#[axum::debug_handler(state = ServerState)]
async fn reactions(
    ReactionsPath { id }: ReactionsPath,
    CurrentUser(user): CurrentUser,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<ReactionSummary>> {
    let Some(counts) = db.reaction_counts(id.as_str()).await else {
        return Err(ServerError::PostNotFound(id.into_inner()));
    };
    let current = db.user_reaction(id.as_str(), user.email.get()).await;

    Ok(Json(ReactionSummary { counts, current }))
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct ToggleReaction {
    kind: ReactionKind,
}

#[axum::debug_handler(state = ServerState)]
async fn toggle_reaction(
    ReactionsPath { id }: ReactionsPath,
    CurrentUser(user): CurrentUser,
    State(db): State<Arc<DbClient>>,
    Json(ToggleReaction { kind }): Json<ToggleReaction>,
) -> Json<MutationResponse<Toggle, Feed>> {
    Json(db.toggle_reaction(&user, id.as_str(), kind).await.into())
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct CommentText {
    text: String,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/comments", rejection(ServerError))]
struct CommentsPath {
    id: Id<PostMarker>,
}

#[axum::debug_handler(state = ServerState)]
async fn add_comment(
    CommentsPath { id }: CommentsPath,
    CurrentUser(user): CurrentUser,
    State(db): State<Arc<DbClient>>,
    Json(CommentText { text }): Json<CommentText>,
) -> Json<MutationResponse<Id<CommentMarker>, Feed>> {
    Json(db.add_comment(&user, id.as_str(), &text).await.into())
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/comments/{comment_id}", rejection(ServerError))]
struct CommentPath {
    id: Id<PostMarker>,
    comment_id: Id<CommentMarker>,
}

#[axum::debug_handler(state = ServerState)]
async fn edit_comment(
    CommentPath { id, comment_id }: CommentPath,
    CurrentUser(user): CurrentUser,
    State(db): State<Arc<DbClient>>,
    Json(CommentText { text }): Json<CommentText>,
) -> Result<Json<MutationResponse<(), Feed>>> {
    let applied = db
        .edit_comment(&user, id.as_str(), comment_id.as_str(), &text)
        .await?;

    Ok(Json(applied.into()))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/comments/{comment_id}", rejection(ServerError))]
struct DeleteCommentPath {
    id: Id<PostMarker>,
    comment_id: Id<CommentMarker>,
}

#[axum::debug_handler(state = ServerState)]
async fn delete_comment(
    DeleteCommentPath { id, comment_id }: DeleteCommentPath,
    CurrentUser(user): CurrentUser,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<MutationResponse<Comment, Feed>>> {
    let applied = db
        .delete_comment(&user, id.as_str(), comment_id.as_str())
        .await?;

    Ok(Json(applied.into()))
}
