//! The Kanban board and the reordering that drag gestures drive.

use crate::{
    model::{Id, IdGenerator, IdPrefix},
    outcome::{NoChange, Outcome},
};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct ColumnMarker;
impl IdPrefix for ColumnMarker {
    const PREFIX: &'static str = "col";
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CardMarker;
impl IdPrefix for CardMarker {
    const PREFIX: &'static str = "card";
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Card {
    pub id: Id<CardMarker>,
    pub content: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Column {
    pub id: Id<ColumnMarker>,
    pub title: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Column {
    fn card_index(&self, card_id: &str) -> Option<usize> {
        self.cards.iter().position(|card| card.id.as_str() == card_id)
    }
}

/// Columns in display order.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Board {
    columns: Vec<Column>,
}

impl From<Vec<Column>> for Board {
    fn from(columns: Vec<Column>) -> Self {
        Self { columns }
    }
}

/// What a drag started on. Cards name the column they were picked up from.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DragItem {
    Column {
        id: Id<ColumnMarker>,
    },
    Card {
        id: Id<CardMarker>,
        column_id: Id<ColumnMarker>,
    },
}

/// What a drag ended over.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DropTarget {
    Column {
        id: Id<ColumnMarker>,
    },
    /// The empty area below a column's cards.
    ColumnDropzone {
        column_id: Id<ColumnMarker>,
    },
    Card {
        id: Id<CardMarker>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column_id: Option<Id<ColumnMarker>>,
    },
}

/// A completed reorder. Indices are positions before the move for `from` and
/// after it for `to`.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Move {
    Column {
        id: Id<ColumnMarker>,
        from: usize,
        to: usize,
    },
    CardWithinColumn {
        id: Id<CardMarker>,
        column_id: Id<ColumnMarker>,
        from: usize,
        to: usize,
    },
    CardAcrossColumns {
        id: Id<CardMarker>,
        from_column_id: Id<ColumnMarker>,
        to_column_id: Id<ColumnMarker>,
        to: usize,
    },
}

/// Removes the element at `from` and inserts it at `to`.
fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    let item = items.remove(from);
    items.insert(to, item);
}

impl Board {
    /// The board a new installation starts with.
    #[must_use]
    pub fn starter() -> Self {
        let card = |id: &str, content: &str| Card {
            id: Id::new(id),
            content: content.to_owned(),
        };
        let column = |id: &str, title: &str, cards| Column {
            id: Id::new(id),
            title: title.to_owned(),
            cards,
        };

        vec![
            column(
                "col-1",
                "A Fazer",
                vec![
                    card("card-1", "Implementar tela de login"),
                    card("card-2", "Ajustar layout do feed"),
                ],
            ),
            column(
                "col-2",
                "Em Progresso",
                vec![card("card-3", "Configurar autenticação")],
            ),
            column(
                "col-3",
                "Concluído",
                vec![card("card-4", "Criar componentes base")],
            ),
        ]
        .into()
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.id.as_str() == column_id)
    }

    fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.id.as_str() == column_id)
    }

    /// Index of the first column holding `card_id`.
    fn card_column_index(&self, card_id: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.card_index(card_id).is_some())
    }

    /// The first column holding `card_id`.
    #[must_use]
    pub fn column_of_card(&self, card_id: &str) -> Option<&Column> {
        self.card_column_index(card_id)
            .map(|index| &self.columns[index])
    }

    /// Appends an empty column. An absent or empty title does nothing.
    pub fn add_column(&mut self, title: Option<&str>, ids: &mut IdGenerator) -> Outcome<Id<ColumnMarker>> {
        let Some(title) = title.filter(|title| !title.is_empty()) else {
            return Outcome::Unchanged(NoChange::EmptyInput);
        };

        let id = Id::generate(ids);
        self.columns.push(Column {
            id: id.clone(),
            title: title.to_owned(),
            cards: Vec::new(),
        });
        Outcome::Changed(id)
    }

    /// Renames in place. Empty titles are allowed.
    pub fn rename_column(&mut self, column_id: &str, title: &str) -> Outcome<()> {
        match self
            .columns
            .iter_mut()
            .find(|column| column.id.as_str() == column_id)
        {
            Some(column) => {
                title.clone_into(&mut column.title);
                Outcome::Changed(())
            }
            None => Outcome::Unchanged(NoChange::ColumnNotFound),
        }
    }

    pub fn add_card(
        &mut self,
        column_id: &str,
        content: Option<&str>,
        ids: &mut IdGenerator,
    ) -> Outcome<Id<CardMarker>> {
        let Some(content) = content.filter(|content| !content.is_empty()) else {
            return Outcome::Unchanged(NoChange::EmptyInput);
        };
        let Some(column) = self
            .columns
            .iter_mut()
            .find(|column| column.id.as_str() == column_id)
        else {
            return Outcome::Unchanged(NoChange::ColumnNotFound);
        };

        let id = Id::generate(ids);
        column.cards.push(Card {
            id: id.clone(),
            content: content.to_owned(),
        });
        Outcome::Changed(id)
    }

    /// The column a drop lands in. Card targets without column metadata fall
    /// back to the first column holding the card.
    fn target_column(&self, target: &DropTarget) -> Option<usize> {
        match target {
            DropTarget::Column { id } | DropTarget::ColumnDropzone { column_id: id } => {
                self.column_index(id.as_str())
            }
            DropTarget::Card {
                column_id: Some(column_id),
                ..
            } => self.column_index(column_id.as_str()),
            DropTarget::Card {
                id,
                column_id: None,
            } => self.card_column_index(id.as_str()),
        }
    }

    /// Applies the end of a drag gesture.
    pub fn complete_drag(&mut self, item: &DragItem, target: Option<&DropTarget>) -> Outcome<Move> {
        let Some(target) = target else {
            return Outcome::Unchanged(NoChange::NoDropTarget);
        };

        let moved = match item {
            DragItem::Column { id } => self.move_column(id, target),
            DragItem::Card { id, column_id } => self.move_card(id, column_id, target),
        };
        moved.into()
    }

    fn move_column(&mut self, id: &Id<ColumnMarker>, target: &DropTarget) -> Result<Move, NoChange> {
        let from = self
            .column_index(id.as_str())
            .ok_or(NoChange::ColumnNotFound)?;
        let to = self.target_column(target).ok_or(NoChange::ColumnNotFound)?;
        if from == to {
            return Err(NoChange::SamePosition);
        }

        array_move(&mut self.columns, from, to);
        Ok(Move::Column {
            id: id.clone(),
            from,
            to,
        })
    }

    fn move_card(
        &mut self,
        id: &Id<CardMarker>,
        source_column_id: &Id<ColumnMarker>,
        target: &DropTarget,
    ) -> Result<Move, NoChange> {
        let target_column = self.target_column(target).ok_or(NoChange::ColumnNotFound)?;
        let source_column = self
            .column_index(source_column_id.as_str())
            .ok_or(NoChange::ColumnNotFound)?;
        let from = self.columns[source_column]
            .card_index(id.as_str())
            .ok_or(NoChange::CardNotFound)?;
        let over_card = match target {
            DropTarget::Card { id, .. } => Some(id.as_str()),
            DropTarget::Column { .. } | DropTarget::ColumnDropzone { .. } => None,
        };

        if source_column == target_column {
            let cards = &mut self.columns[source_column].cards;
            let to = match over_card {
                Some(over_card) => cards
                    .iter()
                    .position(|card| card.id.as_str() == over_card)
                    .ok_or(NoChange::CardNotFound)?,
                None => cards.len() - 1,
            };
            if to == from {
                return Err(NoChange::SamePosition);
            }

            array_move(cards, from, to);
            return Ok(Move::CardWithinColumn {
                id: id.clone(),
                column_id: source_column_id.clone(),
                from,
                to,
            });
        }

        let moved = self.columns[source_column].cards.remove(from);
        let cards = &mut self.columns[target_column].cards;
        let to = over_card
            .and_then(|over_card| cards.iter().position(|card| card.id.as_str() == over_card))
            .unwrap_or(cards.len());
        cards.insert(to, moved);

        Ok(Move::CardAcrossColumns {
            id: id.clone(),
            from_column_id: source_column_id.clone(),
            to_column_id: self.columns[target_column].id.clone(),
            to,
        })
    }
}

/// A copy of the item being dragged, kept for rendering a preview.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(tag = "type", content = "item", rename_all = "snake_case")]
pub enum DragPreview {
    Column(Column),
    Card(Card),
}

/// The drag in progress, if any. Never persisted.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct DragSession {
    active: Option<DragPreview>,
}

impl DragSession {
    #[must_use]
    pub fn active(&self) -> Option<&DragPreview> {
        self.active.as_ref()
    }

    /// Records the dragged item. Cards are looked up in the column they name; an
    /// item that can't be found leaves no preview.
    pub fn start(&mut self, board: &Board, item: &DragItem) -> Option<&DragPreview> {
        self.active = match item {
            DragItem::Column { id } => board.column(id.as_str()).cloned().map(DragPreview::Column),
            DragItem::Card { id, column_id } => board
                .column(column_id.as_str())
                .and_then(|column| column.cards.iter().find(|card| card.id == *id))
                .cloned()
                .map(DragPreview::Card),
        };

        self.active.as_ref()
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// Clears the preview and applies the drop to `board`.
    pub fn complete(
        &mut self,
        board: &mut Board,
        item: &DragItem,
        target: Option<&DropTarget>,
    ) -> Outcome<Move> {
        self.cancel();
        board.complete_drag(item, target)
    }
}
