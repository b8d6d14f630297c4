use crate::server::{
    MutationResponse, ServerError, ServerRouter, ServerState, auth::CurrentUser, json::Json,
};
use axum::{Router, extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use conectapetz_common::{
    board::{Board, CardMarker, ColumnMarker, DragItem, DragPreview, DragSession, DropTarget, Move},
    model::Id,
};
use conectapetz_db::client::DbClient;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_get(board)
        .typed_post(add_column)
        .typed_patch(rename_column)
        .typed_post(add_card)
        .typed_post(start_drag)
        .typed_post(end_drag)
        .typed_post(cancel_drag)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/board", rejection(ServerError))]
struct BoardPath();

#[axum::debug_handler(state = ServerState)]
async fn board(_: BoardPath, _: CurrentUser, State(db): State<Arc<DbClient>>) -> Json<Board> {
    Json(db.board().await)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/board/columns", rejection(ServerError))]
struct ColumnsPath();

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct NewColumn {
    #[serde(default)]
    title: Option<String>,
}

#[axum::debug_handler(state = ServerState)]
async fn add_column(
    _: ColumnsPath,
    _: CurrentUser,
    State(db): State<Arc<DbClient>>,
    Json(NewColumn { title }): Json<NewColumn>,
) -> Json<MutationResponse<Id<ColumnMarker>, Board>> {
    Json(db.add_column(title.as_deref()).await.into())
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/board/columns/{id}", rejection(ServerError))]
struct ColumnPath {
    id: Id<ColumnMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct ColumnTitle {
    title: String,
}

#[axum::debug_handler(state = ServerState)]
async fn rename_column(
    ColumnPath { id }: ColumnPath,
    _: CurrentUser,
    State(db): State<Arc<DbClient>>,
    Json(ColumnTitle { title }): Json<ColumnTitle>,
) -> Json<MutationResponse<(), Board>> {
    Json(db.rename_column(id.as_str(), &title).await.into())
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/board/columns/{id}/cards", rejection(ServerError))]
struct CardsPath {
    id: Id<ColumnMarker>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct NewCard {
    #[serde(default)]
    content: Option<String>,
}

#[axum::debug_handler(state = ServerState)]
async fn add_card(
    CardsPath { id }: CardsPath,
    _: CurrentUser,
    State(db): State<Arc<DbClient>>,
    Json(NewCard { content }): Json<NewCard>,
) -> Json<MutationResponse<Id<CardMarker>, Board>> {
    Json(db.add_card(id.as_str(), content.as_deref()).await.into())
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/board/drag/start", rejection(ServerError))]
struct DragStartPath();

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct DragStart {
    active: DragItem,
}

/// Replies with the preview of the dragged item, or `null` if it doesn't exist.
#[axum::debug_handler(state = ServerState)]
async fn start_drag(
    _: DragStartPath,
    _: CurrentUser,
    State(db): State<Arc<DbClient>>,
    State(session): State<Arc<Mutex<DragSession>>>,
    Json(DragStart { active }): Json<DragStart>,
) -> Json<Option<DragPreview>> {
    let mut session = session.lock().await;

    Json(db.start_drag(&mut session, &active).await)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/board/drag/end", rejection(ServerError))]
struct DragEndPath();

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct DragEnd {
    active: DragItem,
    #[serde(default)]
    over: Option<DropTarget>,
}

#[axum::debug_handler(state = ServerState)]
async fn end_drag(
    _: DragEndPath,
    _: CurrentUser,
    State(db): State<Arc<DbClient>>,
    State(session): State<Arc<Mutex<DragSession>>>,
    Json(DragEnd { active, over }): Json<DragEnd>,
) -> Json<MutationResponse<Move, Board>> {
    let mut session = session.lock().await;

    Json(
        db.complete_drag(&mut session, &active, over.as_ref())
            .await
            .into(),
    )
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/board/drag/cancel", rejection(ServerError))]
struct DragCancelPath();

#[axum::debug_handler(state = ServerState)]
async fn cancel_drag(
    _: DragCancelPath,
    _: CurrentUser,
    State(session): State<Arc<Mutex<DragSession>>>,
) -> StatusCode {
    session.lock().await.cancel();

    StatusCode::NO_CONTENT
}
