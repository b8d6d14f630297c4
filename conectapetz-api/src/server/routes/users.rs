use crate::server::{
    Result, ServerError, ServerRouter, ServerState, auth::CurrentUser, json::Json,
};
use axum::{Router, extract::State};
use axum_extra::routing::{RouterExt, TypedPath};
use conectapetz_common::model::user::{Profile, ProfileUpdate};
use conectapetz_db::client::DbClient;
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_patch(update_profile)
        .typed_get(user_by_email)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/me", rejection(ServerError))]
struct MePath();

#[axum::debug_handler(state = ServerState)]
async fn update_profile(
    _: MePath,
    CurrentUser(user): CurrentUser,
    State(db): State<Arc<DbClient>>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>> {
    let profile = db.update_profile(&user, update).await?;

    Ok(Json(profile))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/by-email/{email}", rejection(ServerError))]
struct ByEmailPath {
    email: String,
}

#[axum::debug_handler(state = ServerState)]
async fn user_by_email(
    ByEmailPath { email }: ByEmailPath,
    _: CurrentUser,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Profile>> {
    match db.user_by_email(&email).await {
        Some(profile) => Ok(Json(profile)),
        None => Err(ServerError::UserNotFound(email)),
    }
}
