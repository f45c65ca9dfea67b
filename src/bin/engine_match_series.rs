//! Standalone agent-vs-agent series runner.
//!
//! Run with:
//! `cargo run --release --bin engine_match_series -- --player1 ab:mixed --player2 ab:improved`
//! `cargo run --release --bin engine_match_series -- --games 40 --verbose`

use clap::Parser;

use knight_isolation::errors::IsolationError;
use knight_isolation::game_state::isolation_types::{DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH};
use knight_isolation::utils::engine_match_harness::{
    build_agent, play_match_series, MatchConfig, MatchSeriesConfig, DEFAULT_TIME_LIMIT_MS,
};

#[derive(Parser, Debug)]
#[command(name = "engine_match_series")]
#[command(about = "Play a series of knight isolation games with alternating seats")]
struct Args {
    #[arg(long, default_value = "ab:mixed")]
    player1: String,

    #[arg(long, default_value = "ab:improved")]
    player2: String,

    /// Total games; consecutive pairs share an opening with seats swapped
    #[arg(long, default_value_t = 20)]
    games: u16,

    #[arg(long, default_value_t = 1234)]
    seed: u64,

    #[arg(long, default_value_t = DEFAULT_BOARD_WIDTH)]
    width: usize,

    #[arg(long, default_value_t = DEFAULT_BOARD_HEIGHT)]
    height: usize,

    #[arg(long, default_value_t = DEFAULT_TIME_LIMIT_MS)]
    time_limit_ms: u64,

    #[arg(short, long)]
    verbose: bool,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<(), IsolationError> {
    let args = Args::parse();

    {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Fail on a bad name before the first game starts.
    let player1_name = build_agent(&args.player1)?.name().to_owned();
    let player2_name = build_agent(&args.player2)?.name().to_owned();

    let stats = play_match_series(
        || build_agent(&args.player1),
        || build_agent(&args.player2),
        MatchSeriesConfig {
            games: args.games,
            base_seed: args.seed,
            per_game: MatchConfig {
                width: args.width,
                height: args.height,
                time_limit_ms: args.time_limit_ms,
                random_opening: true,
            },
            verbose: args.verbose,
        },
    )?;

    println!("player1={player1_name} player2={player2_name}");
    println!("{}", stats.report());
    println!("outcomes: {:?}", stats.outcomes);
    Ok(())
}
