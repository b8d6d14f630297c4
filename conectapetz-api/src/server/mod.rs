use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use conectapetz_common::{board::DragSession, feed::FeedError, outcome::NoChange};
use conectapetz_db::{
    accounts::AccountError,
    client::{Applied, DbClient},
};
use json::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::error;

mod auth;
mod json;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
    /// The drag in progress on the board. Lives only as long as the process.
    pub drag_session: Arc<Mutex<DragSession>>,
}

impl ServerState {
    #[must_use]
    pub fn new(db_client: DbClient) -> Self {
        Self {
            db_client: Arc::new(db_client),
            drag_session: Arc::default(),
        }
    }
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("No user is logged in")]
    NotLoggedIn,
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("Post with id {0} was not found")]
    PostNotFound(String),
    #[error("No user is registered with e-mail {0}")]
    UserNotFound(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostNotFound(_)
            | ServerError::UserNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::NotLoggedIn
            | ServerError::Account(AccountError::InvalidCredentials | AccountError::NotLoggedIn) => {
                StatusCode::UNAUTHORIZED
            }
            ServerError::Account(AccountError::EmailTaken) => StatusCode::CONFLICT,
            ServerError::JsonRejection(_)
            | ServerError::Account(AccountError::Validation(_))
            | ServerError::Feed(FeedError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServerError::Feed(FeedError::NotPostAuthor | FeedError::NotCommentAuthor) => {
                StatusCode::FORBIDDEN
            }
            ServerError::JsonResponse(_) | ServerError::Account(AccountError::Database(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
struct ErrorResponse {
    status: u16,
    message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let message = if status.is_server_error() {
            "Internal server error".to_owned()
        } else {
            self.to_string()
        };
        let error_response = ErrorResponse {
            status: status.as_u16(),
            message,
        };
        (status, Json(error_response)).into_response()
    }
}

/// The reply to every mutating request. `data` is the affected collection as it
/// is stored after the request.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct MutationResponse<T, S> {
    changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<NoChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<T>,
    data: S,
}

impl<T, S> From<Applied<T, S>> for MutationResponse<T, S> {
    fn from(Applied { outcome, state }: Applied<T, S>) -> Self {
        Self {
            changed: outcome.is_changed(),
            reason: outcome.reason(),
            value: outcome.changed(),
            data: state,
        }
    }
}
