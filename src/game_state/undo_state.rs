use crate::game_state::isolation_types::*;

/// Single undo record for `apply_move` / `undo_move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoState {
    pub mv: Square,
    pub mover: PlayerId,
    pub prev_cursor: Option<Square>,
}
