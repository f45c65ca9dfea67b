//! Play a single knight isolation game between two agents and dump the board
//! after every move.
//!
//! `cargo run --release -- --player-one ab:improved --player-two greedy`

use clap::Parser;

use knight_isolation::errors::IsolationError;
use knight_isolation::game_state::isolation_types::*;
use knight_isolation::utils::engine_match_harness::{
    build_agent, play_match, MatchConfig, MatchResult, DEFAULT_TIME_LIMIT_MS,
};

#[derive(Parser, Debug)]
#[command(name = "knight_isolation")]
#[command(about = "Play one knight isolation game between two agents")]
struct Args {
    /// Agent moving first, e.g. `ab:improved@8`, `mm:mixed`, `greedy`, `random`
    #[arg(long, default_value = "ab:improved")]
    player_one: String,

    /// Agent moving second
    #[arg(long, default_value = "greedy:improved")]
    player_two: String,

    #[arg(long, default_value_t = DEFAULT_BOARD_WIDTH)]
    width: usize,

    #[arg(long, default_value_t = DEFAULT_BOARD_HEIGHT)]
    height: usize,

    /// Milliseconds each agent gets per move
    #[arg(long, default_value_t = DEFAULT_TIME_LIMIT_MS)]
    time_limit_ms: u64,

    /// Seed for the random opening placements
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Let the first agent place player one instead of a random opening
    #[arg(long)]
    no_random_opening: bool,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn main() -> Result<(), IsolationError> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut player_one = build_agent(&args.player_one)?;
    let mut player_two = build_agent(&args.player_two)?;
    let config = MatchConfig {
        width: args.width,
        height: args.height,
        time_limit_ms: args.time_limit_ms,
        random_opening: !args.no_random_opening,
    };

    let result = play_match(player_one.as_mut(), player_two.as_mut(), args.seed, &config)?;

    // Replay the game for the board dumps.
    let mut board = BoardState::new(config.width, config.height)?;
    for mv in &result.opening_moves {
        board.apply_move(*mv)?;
        println!("opening: {} placed on {}", board.inactive_player(), mv);
    }
    println!("{board}");
    for mv in &result.move_history {
        let mover = board.active_player();
        board.apply_move(*mv)?;
        println!("{}", move_line(mover, *mv));
        println!("{board}");
    }

    let winner_name = match result.winner {
        PlayerId::One => player_one.name(),
        PlayerId::Two => player_two.name(),
    };
    println!("{}", winner_line(&result, winner_name));
    println!(
        "player 1 avg {:.3} ms/move, player 2 avg {:.3} ms/move",
        avg_ms(result.player_one_total_time_ns, result.player_one_move_count),
        avg_ms(result.player_two_total_time_ns, result.player_two_move_count)
    );
    Ok(())
}

fn move_line(mover: PlayerId, mv: Square) -> String {
    format!("{mover} moves to {mv}")
}

fn winner_line(result: &MatchResult, winner_name: &str) -> String {
    format!(
        "winner: {} ({}) by {:?} after {} moves",
        result.winner,
        winner_name,
        result.termination,
        result.move_history.len()
    )
}

fn avg_ms(total_ns: u128, moves: u32) -> f64 {
    if moves == 0 {
        0.0
    } else {
        total_ns as f64 / moves as f64 / 1_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knight_isolation::utils::engine_match_harness::Termination;

    #[test]
    fn move_lines_name_the_player_once() {
        let line = move_line(PlayerId::Two, Square::new(2, 3));
        assert_eq!(line, "player 2 moves to (2, 3)");
    }

    #[test]
    fn winner_line_names_the_player_once() {
        let result = MatchResult {
            winner: PlayerId::One,
            termination: Termination::NoLegalMoves,
            opening_moves: Vec::new(),
            move_history: vec![Square::new(0, 0), Square::new(1, 1)],
            final_state: BoardState::new_game(),
            player_one_move_count: 1,
            player_two_move_count: 1,
            player_one_total_time_ns: 0,
            player_two_total_time_ns: 0,
        };
        assert_eq!(
            winner_line(&result, "AB_improved"),
            "winner: player 1 (AB_improved) by NoLegalMoves after 2 moves"
        );
    }
}
