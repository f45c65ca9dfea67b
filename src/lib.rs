//! Crate root module declarations for the knight isolation engine.
//!
//! Exposes the board model, knight move generation, search, agents and
//! utility helpers so binaries, benches and tests can import stable paths.

pub mod errors;

pub mod game_state {
    pub mod board_state;
    pub mod isolation_types;
    pub mod symmetry;
    pub mod undo_state;
}

pub mod moves {
    pub mod knight_moves;
}

pub mod search {
    pub mod board_scoring;
    pub mod iterative_deepening;
    pub mod minimax;
    pub mod search_cache;
    pub mod time_budget;
    pub mod zobrist;
}

pub mod engines {
    pub mod engine_greedy;
    pub mod engine_iterative;
    pub mod engine_minimax;
    pub mod engine_random;
    pub mod engine_trait;
}

pub mod utils {
    pub mod engine_match_harness;
    pub mod render_board_state;
}
