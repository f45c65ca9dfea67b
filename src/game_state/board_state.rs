//! Core incremental board state representation.
//!
//! `BoardState` is the central model for the engine. It stores cell
//! occupancy, both player cursors, the side to move, the move counter and an
//! incrementally maintained Zobrist fingerprint. Search explores by
//! `apply_move` / `undo_move` on a single instance; `clone` and
//! `forecast_move` exist for callers that need an independent branch.

use std::fmt;

use crate::errors::IsolationError;
use crate::game_state::isolation_types::*;
use crate::game_state::symmetry;
use crate::moves::knight_moves::knight_targets;
use crate::search::zobrist::{blocked_key, compute_fingerprint, cursor_key, side_to_move_key};
use crate::utils::render_board_state::render_board_state;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    width: usize,
    height: usize,
    // Column-major: index = row + col * height.
    cells: Vec<Cell>,
    cursors: [Option<Square>; 2],
    active: PlayerId,
    move_count: u32,
    fingerprint: u64,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new_game()
    }
}

impl BoardState {
    pub fn new(width: usize, height: usize) -> Result<Self, IsolationError> {
        if width == 0 || height == 0 || width > MAX_BOARD_SIDE || height > MAX_BOARD_SIDE {
            return Err(IsolationError::InvalidDimensions { width, height });
        }

        let mut board = Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
            cursors: [None, None],
            active: PlayerId::One,
            move_count: 0,
            fingerprint: 0,
        };
        board.fingerprint = compute_fingerprint(&board);
        Ok(board)
    }

    /// Empty 7x7 board, player one to move.
    pub fn new_game() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            cells: vec![Cell::Empty; DEFAULT_BOARD_WIDTH * DEFAULT_BOARD_HEIGHT],
            cursors: [None, None],
            active: PlayerId::One,
            move_count: 0,
            fingerprint: 0,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    #[inline]
    pub fn active_player(&self) -> PlayerId {
        self.active
    }

    #[inline]
    pub fn inactive_player(&self) -> PlayerId {
        self.active.opponent()
    }

    #[inline]
    pub fn cursor(&self, player: PlayerId) -> Option<Square> {
        self.cursors[player.index()]
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn position_tag(&self) -> PositionTag {
        PositionTag {
            player_one: self.cursors[0],
            player_two: self.cursors[1],
            active: self.active,
        }
    }

    #[inline]
    pub fn in_bounds(&self, sq: Square) -> bool {
        usize::from(sq.row) < self.height && usize::from(sq.col) < self.width
    }

    /// Flat index of an in-bounds square.
    #[inline]
    pub fn cell_index(&self, sq: Square) -> usize {
        usize::from(sq.row) + usize::from(sq.col) * self.height
    }

    /// Inverse of [`Self::cell_index`].
    #[inline]
    pub fn square_at(&self, idx: usize) -> Square {
        Square::new((idx % self.height) as u8, (idx / self.height) as u8)
    }

    pub fn cell(&self, sq: Square) -> Option<Cell> {
        if !self.in_bounds(sq) {
            return None;
        }
        Some(self.cells[self.cell_index(sq)])
    }

    #[inline]
    pub fn is_blank(&self, sq: Square) -> bool {
        self.cell(sq) == Some(Cell::Empty)
    }

    /// In bounds and empty. Knight reachability is `legal_moves`' concern.
    #[inline]
    pub fn move_is_legal(&self, sq: Square) -> bool {
        self.is_blank(sq)
    }

    pub fn blank_spaces(&self) -> Vec<Square> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Empty)
            .map(|(idx, _)| self.square_at(idx))
            .collect()
    }

    /// Upper bound on the number of plies left in the game.
    #[inline]
    pub fn max_remaining_moves(&self) -> usize {
        self.cells.len().saturating_sub(self.move_count as usize)
    }

    /// Legal moves for `player`: knight jumps onto empty cells, or every
    /// empty cell while the player has not been placed yet.
    pub fn legal_moves(&self, player: PlayerId) -> Vec<Square> {
        match self.cursor(player) {
            None => self.blank_spaces(),
            Some(from) => knight_targets(from, self.width, self.height)
                .filter(|to| self.cells[self.cell_index(*to)] == Cell::Empty)
                .collect(),
        }
    }

    #[inline]
    pub fn legal_moves_active(&self) -> Vec<Square> {
        self.legal_moves(self.active)
    }

    /// Number of legal moves for `player`, without allocating.
    pub fn mobility(&self, player: PlayerId) -> usize {
        match self.cursor(player) {
            None => self
                .cells
                .iter()
                .filter(|cell| **cell == Cell::Empty)
                .count(),
            Some(from) => knight_targets(from, self.width, self.height)
                .filter(|to| self.cells[self.cell_index(*to)] == Cell::Empty)
                .count(),
        }
    }

    #[inline]
    fn has_moves(&self, player: PlayerId) -> bool {
        match self.cursor(player) {
            None => self.cells.iter().any(|cell| *cell == Cell::Empty),
            Some(from) => knight_targets(from, self.width, self.height)
                .any(|to| self.cells[self.cell_index(to)] == Cell::Empty),
        }
    }

    /// Move the active player to `mv`, block the cell and pass the turn.
    pub fn apply_move(&mut self, mv: Square) -> Result<UndoState, IsolationError> {
        if !self.in_bounds(mv) {
            return Err(IsolationError::OutOfBounds(mv));
        }
        let idx = self.cell_index(mv);
        if self.cells[idx] != Cell::Empty {
            return Err(IsolationError::CellOccupied(mv));
        }

        let mover = self.active;
        let prev_cursor = self.cursors[mover.index()];

        self.cells[idx] = Cell::Blocked;
        self.fingerprint ^= blocked_key(idx);
        if let Some(prev) = prev_cursor {
            self.fingerprint ^= cursor_key(mover, self.cell_index(prev));
        }
        self.fingerprint ^= cursor_key(mover, idx);
        self.fingerprint ^= side_to_move_key();

        self.cursors[mover.index()] = Some(mv);
        self.active = mover.opponent();
        self.move_count += 1;

        Ok(UndoState {
            mv,
            mover,
            prev_cursor,
        })
    }

    /// Exact inverse of `apply_move`: `mv` must be where the last mover now
    /// stands and `previous_cursor` where it stood before.
    pub fn undo_move(
        &mut self,
        previous_cursor: Option<Square>,
        mv: Square,
    ) -> Result<(), IsolationError> {
        let mover = self.active.opponent();
        if self.move_count == 0 || self.cursors[mover.index()] != Some(mv) {
            return Err(IsolationError::UndoMismatch { mv });
        }
        if let Some(prev) = previous_cursor {
            if prev == mv || self.cell(prev) != Some(Cell::Blocked) {
                return Err(IsolationError::UndoMismatch { mv });
            }
        }

        let idx = self.cell_index(mv);
        self.cells[idx] = Cell::Empty;
        self.fingerprint ^= blocked_key(idx);
        self.fingerprint ^= cursor_key(mover, idx);
        if let Some(prev) = previous_cursor {
            self.fingerprint ^= cursor_key(mover, self.cell_index(prev));
        }
        self.fingerprint ^= side_to_move_key();

        self.cursors[mover.index()] = previous_cursor;
        self.active = mover;
        self.move_count -= 1;
        Ok(())
    }

    /// Revert the move described by an undo record.
    #[inline]
    pub fn undo(&mut self, undo: &UndoState) -> Result<(), IsolationError> {
        self.undo_move(undo.prev_cursor, undo.mv)
    }

    /// Copy of the board with `mv` applied.
    pub fn forecast_move(&self, mv: Square) -> Result<Self, IsolationError> {
        let mut next = self.clone();
        next.apply_move(mv)?;
        Ok(next)
    }

    /// `player` is to move and has nowhere to go.
    pub fn is_loser(&self, player: PlayerId) -> bool {
        player == self.active && !self.has_moves(self.active)
    }

    /// `player` is waiting and the side to move has nowhere to go.
    pub fn is_winner(&self, player: PlayerId) -> bool {
        player != self.active && !self.has_moves(self.active)
    }

    /// `+inf` for the winner, `-inf` for the loser, `0.0` while play goes on.
    pub fn utility(&self, player: PlayerId) -> f64 {
        if self.has_moves(self.active) {
            return 0.0;
        }
        if player == self.active {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        }
    }

    /// Fast mirror-strategy test; see [`symmetry::is_symmetrical`].
    #[inline]
    pub fn is_symmetrical(&self) -> bool {
        symmetry::is_symmetrical(self)
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_board_state(self))
    }
}
