use crate::game_state::isolation_types::Square;

/// Knight offsets as `(d_row, d_col)`, in the order legal moves are listed.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// Maximum number of knight targets from any cell.
pub const MAX_KNIGHT_MOVES: usize = KNIGHT_OFFSETS.len();

/// In-bounds knight targets from `from` on a `width x height` board,
/// ignoring occupancy.
#[inline]
pub fn knight_targets(from: Square, width: usize, height: usize) -> impl Iterator<Item = Square> {
    KNIGHT_OFFSETS.iter().filter_map(move |&(d_row, d_col)| {
        from.offset(d_row, d_col)
            .filter(|to| usize::from(to.row) < height && usize::from(to.col) < width)
    })
}

/// True when `to` is exactly one knight jump from `from`.
#[inline]
pub fn is_knight_jump(from: Square, to: Square) -> bool {
    let d_row = (i16::from(from.row) - i16::from(to.row)).abs();
    let d_col = (i16::from(from.col) - i16::from(to.col)).abs();
    (d_row == 1 && d_col == 2) || (d_row == 2 && d_col == 1)
}

#[cfg(test)]
mod tests {
    use super::{is_knight_jump, knight_targets};
    use crate::game_state::isolation_types::Square;

    #[test]
    fn knight_from_center_of_7x7_has_eight_targets() {
        let center = Square::new(3, 3);
        assert_eq!(knight_targets(center, 7, 7).count(), 8);
    }

    #[test]
    fn knight_from_corner_has_two_targets() {
        let targets: Vec<_> = knight_targets(Square::new(0, 0), 7, 7).collect();
        assert_eq!(targets, vec![Square::new(1, 2), Square::new(2, 1)]);
    }

    #[test]
    fn every_target_is_a_knight_jump() {
        let from = Square::new(1, 4);
        for to in knight_targets(from, 6, 5) {
            assert!(is_knight_jump(from, to), "{to} should be a knight jump");
            assert!(to.row < 5 && to.col < 6);
        }
    }
}
