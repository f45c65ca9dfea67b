//! Zobrist hashing support for position fingerprints.
//!
//! The keys are generated from a fixed seed so fingerprints are deterministic
//! across runs, which is useful for testing and debugging. `BoardState`
//! maintains its fingerprint incrementally; `compute_fingerprint` rebuilds it
//! from scratch and the two must always agree.

use std::sync::OnceLock;

use crate::game_state::isolation_types::*;

#[derive(Debug)]
struct ZobristTables {
    blocked: Vec<u64>,
    cursor: [Vec<u64>; 2],
    side_to_move: u64,
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

#[inline]
fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> ZobristTables {
    let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;

    let blocked = (0..MAX_CELLS)
        .map(|_| next_random_u64(&mut seed))
        .collect();
    let cursor_one = (0..MAX_CELLS)
        .map(|_| next_random_u64(&mut seed))
        .collect();
    let cursor_two = (0..MAX_CELLS)
        .map(|_| next_random_u64(&mut seed))
        .collect();
    let side_to_move = next_random_u64(&mut seed);

    ZobristTables {
        blocked,
        cursor: [cursor_one, cursor_two],
        side_to_move,
    }
}

#[inline]
fn next_random_u64(state: &mut u64) -> u64 {
    // splitmix64
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Key for a blocked cell at flat index `cell`.
#[inline]
pub fn blocked_key(cell: usize) -> u64 {
    tables().blocked[cell]
}

/// Key for `player`'s cursor standing on flat index `cell`.
#[inline]
pub fn cursor_key(player: PlayerId, cell: usize) -> u64 {
    tables().cursor[player.index()][cell]
}

/// Side-to-move toggle key (xor in when player two is to move).
#[inline]
pub fn side_to_move_key() -> u64 {
    tables().side_to_move
}

/// Compute the full fingerprint from the complete board state.
pub fn compute_fingerprint(board: &BoardState) -> u64 {
    let mut key = 0u64;

    for (idx, cell) in board.cells().iter().enumerate() {
        if *cell == Cell::Blocked {
            key ^= blocked_key(idx);
        }
    }

    for player in [PlayerId::One, PlayerId::Two] {
        if let Some(sq) = board.cursor(player) {
            key ^= cursor_key(player, board.cell_index(sq));
        }
    }

    if board.active_player() == PlayerId::Two {
        key ^= side_to_move_key();
    }

    key
}
