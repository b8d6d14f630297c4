use crate::server::{Result, ServerError, ServerRouter, ServerState, auth::CurrentUser, json::Json};
use axum::{Router, extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use conectapetz_common::model::user::{Login, Profile, Registration};
use conectapetz_db::client::DbClient;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_post(register)
        .typed_post(login)
        .typed_post(logout)
        .typed_get(me)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/auth/register", rejection(ServerError))]
struct RegisterPath();

#[axum::debug_handler(state = ServerState)]
async fn register(
    _: RegisterPath,
    State(db): State<Arc<DbClient>>,
    Json(registration): Json<Registration>,
) -> Result<(StatusCode, Json<Profile>)> {
    let profile = db.register(&registration).await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/auth/login", rejection(ServerError))]
struct LoginPath();

#[axum::debug_handler(state = ServerState)]
async fn login(
    _: LoginPath,
    State(db): State<Arc<DbClient>>,
    Json(login): Json<Login>,
) -> Result<Json<Profile>> {
    let profile = db.login(&login).await?;

    Ok(Json(profile))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/auth/logout", rejection(ServerError))]
struct LogoutPath();

#[axum::debug_handler(state = ServerState)]
async fn logout(
    _: LogoutPath,
    CurrentUser(user): CurrentUser,
    State(db): State<Arc<DbClient>>,
) -> StatusCode {
    if !db.logout().await {
        warn!(user = %user.id, "Session could not be cleared");
    }

    StatusCode::NO_CONTENT
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/auth/me", rejection(ServerError))]
struct MePath();

#[axum::debug_handler(state = ServerState)]
async fn me(_: MePath, CurrentUser(user): CurrentUser) -> Json<Profile> {
    Json(user)
}

#[cfg(test)]
mod tests {
    use crate::server::tests::{app, register, send};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn duplicate_emails_conflict() {
        let app = app().await;
        register(&app, "Ana", "ana@x.com").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/register",
            Some(json!({"name": "Outra", "email": "ana@x.com", "password": "x"})),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["status"], 409);
    }

    #[tokio::test]
    async fn wrong_passwords_are_unauthorized() {
        let app = app().await;
        register(&app, "Ana", "ana@x.com").await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/auth/login",
            Some(json!({"email": "ana@x.com", "password": "errada"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_registrations_are_bad_requests() {
        let app = app().await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/auth/register",
            Some(json!({"name": "Ana", "email": "not-an-email", "password": "pw123"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            "/auth/register",
            Some(json!({"name": "Ana"})),
        )
        .await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let app = app().await;
        let profile = register(&app, "Ana", "ana@x.com").await;

        let (status, me) = send(&app, Method::GET, "/auth/me", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me, profile);

        send(&app, Method::POST, "/auth/logout", None).await;
        let (status, _) = send(&app, Method::GET, "/auth/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
