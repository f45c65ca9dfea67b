//! Core value types shared by the board, search and agents.
//!
//! Squares are `(row, col)` pairs; the board stores cells column-major
//! (`index = row + col * height`).
use std::fmt;

pub use crate::game_state::board_state::BoardState;
pub use crate::game_state::undo_state::UndoState;

/// Largest supported board side. Zobrist key tables are sized from it.
pub const MAX_BOARD_SIDE: usize = 32;
pub const MAX_CELLS: usize = MAX_BOARD_SIDE * MAX_BOARD_SIDE;

pub const DEFAULT_BOARD_WIDTH: usize = 7;
pub const DEFAULT_BOARD_HEIGHT: usize = 7;

/// Player holding the initiative. `One` always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    #[inline]
    pub const fn opponent(self) -> Self {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    /// Symbol used by the textual board dump.
    #[inline]
    pub const fn symbol(self) -> char {
        match self {
            PlayerId::One => '1',
            PlayerId::Two => '2',
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::One => write!(f, "player 1"),
            PlayerId::Two => write!(f, "player 2"),
        }
    }
}

/// Occupancy of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Blocked,
}

/// A board coordinate, also used as the move type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    #[inline]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Offset by a signed delta, `None` if either coordinate goes negative.
    /// Upper bounds are the board's concern.
    #[inline]
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Self> {
        let row = i16::from(self.row) + i16::from(d_row);
        let col = i16::from(self.col) + i16::from(d_col);
        if row < 0 || col < 0 || row > i16::from(u8::MAX) || col > i16::from(u8::MAX) {
            return None;
        }
        Some(Self::new(row as u8, col as u8))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(u8, u8)> for Square {
    fn from((row, col): (u8, u8)) -> Self {
        Self::new(row, col)
    }
}

/// Render an optional move the way game logs expect, `(-1, -1)` for none.
pub fn format_move(mv: Option<Square>) -> String {
    match mv {
        Some(sq) => sq.to_string(),
        None => "(-1, -1)".to_owned(),
    }
}

/// Cursor pair plus initiative. Stored with cache entries so that a
/// fingerprint collision can be told apart from a genuine transposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionTag {
    pub player_one: Option<Square>,
    pub player_two: Option<Square>,
    pub active: PlayerId,
}
