use crate::client::{Applied, DbClient, StorageKey};
use conectapetz_common::{
    board::{Board, CardMarker, ColumnMarker, DragItem, DragPreview, DragSession, DropTarget, Move},
    model::{Id, IdGenerator},
    outcome::Outcome,
};
use std::convert::Infallible;

impl DbClient {
    fn default_board(&self) -> impl FnOnce() -> Board + use<> {
        let seed = self.seeds_defaults();
        move || if seed { Board::starter() } else { Board::default() }
    }

    async fn apply_to_board<T>(
        &self,
        mutation: impl FnOnce(&mut Board, &mut IdGenerator) -> Outcome<T>,
    ) -> Applied<T, Board> {
        let Ok(applied) = self
            .apply(StorageKey::KanbanData, self.default_board(), |board, ids| {
                Ok::<_, Infallible>(mutation(board, ids))
            })
            .await;

        applied
    }

    /// The board, seeded with the starter columns on first access. An unreadable
    /// board reads as empty and stays stored as it is.
    pub async fn board(&self) -> Board {
        self.init_if_empty(StorageKey::KanbanData, self.default_board())
            .await
            .unwrap_or_default()
    }

    pub async fn add_column(&self, title: Option<&str>) -> Applied<Id<ColumnMarker>, Board> {
        self.apply_to_board(|board, ids| board.add_column(title, ids))
            .await
    }

    pub async fn rename_column(&self, column_id: &str, title: &str) -> Applied<(), Board> {
        self.apply_to_board(|board, _| board.rename_column(column_id, title))
            .await
    }

    pub async fn add_card(
        &self,
        column_id: &str,
        content: Option<&str>,
    ) -> Applied<Id<CardMarker>, Board> {
        self.apply_to_board(|board, ids| board.add_card(column_id, content, ids))
            .await
    }

    /// Records `item` in `session` for previews.
    pub async fn start_drag(&self, session: &mut DragSession, item: &DragItem) -> Option<DragPreview> {
        let board = self.board().await;
        session.start(&board, item).cloned()
    }

    /// Ends the drag in `session` and applies it. A drop outside any target
    /// behaves like a cancel.
    pub async fn complete_drag(
        &self,
        session: &mut DragSession,
        item: &DragItem,
        target: Option<&DropTarget>,
    ) -> Applied<Move, Board> {
        self.apply_to_board(|board, _| session.complete(board, item, target))
            .await
    }
}
