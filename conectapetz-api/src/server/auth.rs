use crate::server::ServerError;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use conectapetz_common::model::user::Profile;
use conectapetz_db::client::DbClient;
use std::sync::Arc;

/// The logged-in user. Rejects the request with 401 when nobody is logged in.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CurrentUser(pub Profile);

impl<S> FromRequestParts<S> for CurrentUser
where
    Arc<DbClient>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Arc::<DbClient>::from_ref(state)
            .current_user()
            .await
            .map(Self)
            .ok_or(ServerError::NotLoggedIn)
    }
}
