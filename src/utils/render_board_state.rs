//! Plain-text board renderer.
//!
//! Creates a human-readable grid for debugging, logging and the game
//! binaries. Players show as `1` and `2`, blocked cells as `-`, empty cells
//! as a blank.

use crate::game_state::isolation_types::*;

/// Render the board with column indices on top and row indices on the left.
pub fn render_board_state(board: &BoardState) -> String {
    let row_label_width = (board.height() - 1).to_string().len() + 1;
    let mut out = String::new();

    out.push_str(&" ".repeat(row_label_width + 3));
    let header: Vec<String> = (0..board.width()).map(|col| col.to_string()).collect();
    out.push_str(&header.join("   "));
    out.push('\n');

    for row in 0..board.height() {
        out.push_str(&format!("{row:<row_label_width$} | "));
        for col in 0..board.width() {
            let sq = Square::new(row as u8, col as u8);
            out.push(cell_symbol(board, sq));
            out.push_str(" | ");
        }
        out.push('\n');
    }

    out
}

fn cell_symbol(board: &BoardState, sq: Square) -> char {
    for player in [PlayerId::One, PlayerId::Two] {
        if board.cursor(player) == Some(sq) {
            return player.symbol();
        }
    }
    match board.cell(sq) {
        Some(Cell::Blocked) => '-',
        _ => ' ',
    }
}

#[cfg(test)]
mod tests {
    use super::render_board_state;
    use crate::game_state::isolation_types::*;

    #[test]
    fn renders_players_blocked_and_empty_cells() {
        let mut board = BoardState::new(3, 2).expect("valid");
        board.apply_move(Square::new(0, 0)).expect("placement");
        board.apply_move(Square::new(1, 1)).expect("placement");
        board.apply_move(Square::new(1, 2)).expect("knight jump");

        let text = render_board_state(&board);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "     0   1   2");
        assert_eq!(lines[1], "0  | - |   |   | ");
        assert_eq!(lines[2], "1  |   | 2 | 1 | ");
    }

    #[test]
    fn display_uses_the_renderer() {
        let board = BoardState::new_game();
        assert_eq!(board.to_string(), render_board_state(&board));
        assert_eq!(board.to_string().lines().count(), 8);
    }
}
