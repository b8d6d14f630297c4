use crate::server::ServerRouter;
use axum::Router;

mod auth;
mod board;
mod posts;
mod users;

pub fn routes() -> ServerRouter {
    Router::new()
        .merge(auth::routes())
        .merge(users::routes())
        .merge(posts::routes())
        .merge(board::routes())
}
