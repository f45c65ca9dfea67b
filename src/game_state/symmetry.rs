//! Mirror-strategy detection.
//!
//! If the position is symmetric under a reflection that maps knight jumps to
//! knight jumps, the player who just moved can answer every move with its
//! mirror image and the player to move eventually runs out of moves. Four
//! reflections qualify on any board (the centre point and both centre
//! lines) plus the two diagonals on square boards.
//!
//! A reflection only works when every cell it maps onto itself is already
//! blocked: the side to move could otherwise step onto a cell whose mirror is
//! itself. The fast test demands `Blocked` for those cells, so a fixed cell
//! that is empty but unreachable is reported as "not symmetric" (a false
//! negative, never a false positive). The parity rules for which player can
//! reach such a position fall out of this: the mover is always the loser.

use crate::game_state::isolation_types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reflection {
    /// Point reflection through the board centre.
    Center,
    /// Rows mirrored about the horizontal centre line.
    Horizontal,
    /// Columns mirrored about the vertical centre line.
    Vertical,
    /// Transpose, `(0,0)` to `(n-1,n-1)`; square boards only.
    MainDiagonal,
    /// Anti-transpose, `(n-1,0)` to `(0,n-1)`; square boards only.
    AntiDiagonal,
}

impl Reflection {
    pub const ALL: [Reflection; 5] = [
        Reflection::Center,
        Reflection::Horizontal,
        Reflection::Vertical,
        Reflection::MainDiagonal,
        Reflection::AntiDiagonal,
    ];

    #[inline]
    pub fn requires_square_board(self) -> bool {
        matches!(self, Reflection::MainDiagonal | Reflection::AntiDiagonal)
    }
}

/// Image of `sq` under `reflection` on a `width x height` board.
#[inline]
pub fn reflect(reflection: Reflection, sq: Square, width: usize, height: usize) -> Square {
    let last_row = (height - 1) as u8;
    let last_col = (width - 1) as u8;
    match reflection {
        Reflection::Center => Square::new(last_row - sq.row, last_col - sq.col),
        Reflection::Horizontal => Square::new(last_row - sq.row, sq.col),
        Reflection::Vertical => Square::new(sq.row, last_col - sq.col),
        Reflection::MainDiagonal => Square::new(sq.col, sq.row),
        Reflection::AntiDiagonal => Square::new(last_col - sq.col, last_row - sq.row),
    }
}

/// Reflections worth testing on this board. Boards one cell wide or tall
/// have none.
pub fn applicable_reflections(board: &BoardState) -> Vec<Reflection> {
    if board.width() == 1 || board.height() == 1 {
        return Vec::new();
    }
    let square = board.width() == board.height();
    Reflection::ALL
        .into_iter()
        .filter(|r| square || !r.requires_square_board())
        .collect()
}

/// First reflection under which the player to move faces a mirroring
/// opponent, if any.
pub fn symmetric_reflection(board: &BoardState) -> Option<Reflection> {
    let (width, height) = (board.width(), board.height());
    let mover = board.cursor(board.active_player())?;
    let waiting = board.cursor(board.inactive_player())?;

    applicable_reflections(board).into_iter().find(|&r| {
        reflect(r, waiting, width, height) == mover && cells_mirrored(board, r)
    })
}

#[inline]
pub fn is_symmetrical(board: &BoardState) -> bool {
    symmetric_reflection(board).is_some()
}

fn cells_mirrored(board: &BoardState, reflection: Reflection) -> bool {
    let cells = board.cells();
    let len = cells.len();
    let (width, height) = (board.width(), board.height());

    (0..len).all(|idx| {
        let mirror = match reflection {
            Reflection::Center => len - 1 - idx,
            _ => board.cell_index(reflect(reflection, board.square_at(idx), width, height)),
        };
        if mirror == idx {
            cells[idx] == Cell::Blocked
        } else {
            // Each pair is compared once, from its lower index.
            mirror < idx || cells[idx] == cells[mirror]
        }
    })
}

/// Exhaustive coordinate-by-coordinate check that `reflection` maps the
/// position onto itself with the cursors swapped and every fixed cell
/// blocked. Independent of the index arithmetic used by the fast test.
pub fn verify_reflection(board: &BoardState, reflection: Reflection) -> bool {
    let (width, height) = (board.width(), board.height());
    if width == 1 || height == 1 {
        return false;
    }
    if reflection.requires_square_board() && width != height {
        return false;
    }

    let (Some(mover), Some(waiting)) = (
        board.cursor(board.active_player()),
        board.cursor(board.inactive_player()),
    ) else {
        return false;
    };
    if reflect(reflection, waiting, width, height) != mover
        || reflect(reflection, mover, width, height) != waiting
    {
        return false;
    }

    for col in 0..width as u8 {
        for row in 0..height as u8 {
            let sq = Square::new(row, col);
            let image = reflect(reflection, sq, width, height);
            let (Some(here), Some(there)) = (board.cell(sq), board.cell(image)) else {
                return false;
            };
            if here != there {
                return false;
            }
            if image == sq && here != Cell::Blocked {
                return false;
            }
        }
    }
    true
}
