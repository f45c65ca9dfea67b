//! Head-to-head agent match harness for local testing.
//!
//! Runs two `Agent` implementations against each other on a fresh board,
//! with optional seeded random opening placements, and aggregates series
//! statistics with seats swapped every other game.

use std::time::Instant;

use chrono::Local;
use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::engines::engine_greedy::GreedyAgent;
use crate::engines::engine_iterative::IterativeAgent;
use crate::engines::engine_minimax::MinimaxAgent;
use crate::engines::engine_random::RandomAgent;
use crate::engines::engine_trait::Agent;
use crate::errors::IsolationError;
use crate::game_state::isolation_types::*;
use crate::search::board_scoring::EvaluatorKind;
use crate::search::time_budget::{Deadline, TimeBudget};

/// Time each agent gets per move unless configured otherwise.
pub const DEFAULT_TIME_LIMIT_MS: u64 = 150;

/// How a finished game ended. The loser is always the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The side to move had no legal moves and said so.
    NoLegalMoves,
    /// The agent answered after its clock had run out.
    Timeout,
    /// The agent returned no move or an illegal one while legal moves existed.
    Forfeit,
    /// The agent had no legal moves and returned one anyway.
    IllegalMove,
}

/// Which configured contestant, independent of seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesPlayer {
    Player1,
    Player2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesOutcome {
    pub winner: SeriesPlayer,
    /// Seat the winner played from.
    pub seat: PlayerId,
    pub termination: Termination,
}

#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub width: usize,
    pub height: usize,
    pub time_limit_ms: u64,
    /// Place both players on random empty cells before the agents take over.
    pub random_opening: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            time_limit_ms: DEFAULT_TIME_LIMIT_MS,
            random_opening: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchResult {
    pub winner: PlayerId,
    pub termination: Termination,
    pub opening_moves: Vec<Square>,
    pub move_history: Vec<Square>,
    pub final_state: BoardState,
    pub player_one_move_count: u32,
    pub player_two_move_count: u32,
    pub player_one_total_time_ns: u128,
    pub player_two_total_time_ns: u128,
}

#[derive(Debug, Clone)]
pub struct MatchSeriesConfig {
    pub games: u16,
    pub base_seed: u64,
    pub per_game: MatchConfig,
    pub verbose: bool,
}

impl Default for MatchSeriesConfig {
    fn default() -> Self {
        Self {
            games: 10,
            base_seed: 0,
            per_game: MatchConfig::default(),
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchSeriesStats {
    pub games: u16,
    pub player1_wins: u16,
    pub player2_wins: u16,
    pub player1_timeouts: u16,
    pub player2_timeouts: u16,
    pub player1_forfeits: u16,
    pub player2_forfeits: u16,
    pub outcomes: Vec<SeriesOutcome>,
    pub player1_moves: u32,
    pub player2_moves: u32,
    pub player1_total_time_ns: u128,
    pub player2_total_time_ns: u128,
    pub player1_avg_move_time_ms: f64,
    pub player2_avg_move_time_ms: f64,
}

impl MatchSeriesStats {
    pub fn player1_win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            100.0 * f64::from(self.player1_wins) / f64::from(self.games)
        }
    }

    pub fn report(&self) -> String {
        format!(
            "[{}] games={} player1_wins={} player2_wins={} p1_win_rate={:.1}% p1_timeouts={} p2_timeouts={} p1_forfeits={} p2_forfeits={} p1_avg_ms={:.3} p2_avg_ms={:.3}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.games,
            self.player1_wins,
            self.player2_wins,
            self.player1_win_rate(),
            self.player1_timeouts,
            self.player2_timeouts,
            self.player1_forfeits,
            self.player2_forfeits,
            self.player1_avg_move_time_ms,
            self.player2_avg_move_time_ms
        )
    }
}

/// Play one game. `agent_one` moves first.
pub fn play_match(
    agent_one: &mut dyn Agent,
    agent_two: &mut dyn Agent,
    seed: u64,
    config: &MatchConfig,
) -> Result<MatchResult, IsolationError> {
    let mut board = BoardState::new(config.width, config.height)?;
    let opening_moves = if config.random_opening {
        apply_seeded_random_opening(&mut board, seed)?
    } else {
        Vec::new()
    };
    play_match_from_state(agent_one, agent_two, board, opening_moves, config)
}

/// Play one game from a caller-provided position.
pub fn play_match_from_state(
    agent_one: &mut dyn Agent,
    agent_two: &mut dyn Agent,
    mut board: BoardState,
    opening_moves: Vec<Square>,
    config: &MatchConfig,
) -> Result<MatchResult, IsolationError> {
    agent_one.new_game();
    agent_two.new_game();

    let mut move_history = Vec::new();
    let mut move_counts = [0u32; 2];
    let mut total_time_ns = [0u128; 2];

    loop {
        let mover = board.active_player();
        let legal_moves = board.legal_moves_active();
        let snapshot = board.clone();

        let deadline = Deadline::after_ms(config.time_limit_ms);
        let started = Instant::now();
        let out = match mover {
            PlayerId::One => agent_one.get_move(&snapshot, &deadline)?,
            PlayerId::Two => agent_two.get_move(&snapshot, &deadline)?,
        };
        let elapsed_ns = started.elapsed().as_nanos();
        let time_left = deadline.remaining_ms();

        move_counts[mover.index()] += 1;
        total_time_ns[mover.index()] += elapsed_ns;

        let termination = if time_left < 0.0 {
            warn!(%mover, over_ms = -time_left, "agent exceeded its time limit");
            Some(Termination::Timeout)
        } else {
            match out.best_move {
                Some(mv) if legal_moves.contains(&mv) => None,
                None if legal_moves.is_empty() => Some(Termination::NoLegalMoves),
                Some(_) if legal_moves.is_empty() => Some(Termination::IllegalMove),
                chosen => {
                    warn!(%mover, chosen = %format_move(chosen), "agent forfeits");
                    Some(Termination::Forfeit)
                }
            }
        };

        if let Some(termination) = termination {
            let winner = mover.opponent();
            info!(
                %winner,
                ?termination,
                plies = move_history.len(),
                "game over"
            );
            return Ok(MatchResult {
                winner,
                termination,
                opening_moves,
                move_history,
                final_state: board,
                player_one_move_count: move_counts[0],
                player_two_move_count: move_counts[1],
                player_one_total_time_ns: total_time_ns[0],
                player_two_total_time_ns: total_time_ns[1],
            });
        }

        if let Some(mv) = out.best_move {
            board.apply_move(mv)?;
            move_history.push(mv);
        }
    }
}

/// Play a series of games and aggregate the results.
///
/// Games come in pairs sharing one opening seed: player 1 moves first in
/// the even game and second in the odd one. A factory error ends the series.
pub fn play_match_series<F1, F2>(
    player1_factory: F1,
    player2_factory: F2,
    config: MatchSeriesConfig,
) -> Result<MatchSeriesStats, IsolationError>
where
    F1: Fn() -> Result<Box<dyn Agent>, IsolationError>,
    F2: Fn() -> Result<Box<dyn Agent>, IsolationError>,
{
    let mut stats = MatchSeriesStats {
        games: config.games,
        ..MatchSeriesStats::default()
    };

    for i in 0..config.games {
        let player1_first = i % 2 == 0;
        let seed = config.base_seed.wrapping_add(u64::from(i / 2));
        let mut player1 = player1_factory()?;
        let mut player2 = player2_factory()?;
        if config.verbose {
            let (first, second) = if player1_first {
                (player1.name().to_owned(), player2.name().to_owned())
            } else {
                (player2.name().to_owned(), player1.name().to_owned())
            };
            println!(
                "[series] game {}/{} seed={} first={} second={}",
                i + 1,
                config.games,
                seed,
                first,
                second
            );
        }

        let result = if player1_first {
            play_match(player1.as_mut(), player2.as_mut(), seed, &config.per_game)?
        } else {
            play_match(player2.as_mut(), player1.as_mut(), seed, &config.per_game)?
        };

        let player1_seat = if player1_first {
            PlayerId::One
        } else {
            PlayerId::Two
        };
        let (p1_moves, p2_moves, p1_ns, p2_ns) = if player1_first {
            (
                result.player_one_move_count,
                result.player_two_move_count,
                result.player_one_total_time_ns,
                result.player_two_total_time_ns,
            )
        } else {
            (
                result.player_two_move_count,
                result.player_one_move_count,
                result.player_two_total_time_ns,
                result.player_one_total_time_ns,
            )
        };
        stats.player1_moves = stats.player1_moves.saturating_add(p1_moves);
        stats.player2_moves = stats.player2_moves.saturating_add(p2_moves);
        stats.player1_total_time_ns = stats.player1_total_time_ns.saturating_add(p1_ns);
        stats.player2_total_time_ns = stats.player2_total_time_ns.saturating_add(p2_ns);

        let winner = if result.winner == player1_seat {
            stats.player1_wins += 1;
            SeriesPlayer::Player1
        } else {
            stats.player2_wins += 1;
            SeriesPlayer::Player2
        };
        let loser_is_player1 = winner == SeriesPlayer::Player2;
        match result.termination {
            Termination::Timeout if loser_is_player1 => stats.player1_timeouts += 1,
            Termination::Timeout => stats.player2_timeouts += 1,
            Termination::Forfeit | Termination::IllegalMove if loser_is_player1 => {
                stats.player1_forfeits += 1
            }
            Termination::Forfeit | Termination::IllegalMove => stats.player2_forfeits += 1,
            Termination::NoLegalMoves => {}
        }
        stats.outcomes.push(SeriesOutcome {
            winner,
            seat: result.winner,
            termination: result.termination,
        });

        if config.verbose {
            println!(
                "[series] game {}/{} winner={:?} seat={} termination={:?} p1_wins={} p2_wins={}\n",
                i + 1,
                config.games,
                winner,
                result.winner,
                result.termination,
                stats.player1_wins,
                stats.player2_wins
            );
        }
    }

    stats.player1_avg_move_time_ms =
        avg_ns_per_move_ms(stats.player1_total_time_ns, stats.player1_moves);
    stats.player2_avg_move_time_ms =
        avg_ns_per_move_ms(stats.player2_total_time_ns, stats.player2_moves);

    Ok(stats)
}

#[inline]
fn avg_ns_per_move_ms(total_ns: u128, moves: u32) -> f64 {
    if moves == 0 {
        0.0
    } else {
        (total_ns as f64) / (moves as f64) / 1_000_000.0
    }
}

/// Place both players on random empty cells.
fn apply_seeded_random_opening(
    board: &mut BoardState,
    seed: u64,
) -> Result<Vec<Square>, IsolationError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut opening_moves = Vec::with_capacity(2);
    for _ in 0..2 {
        let blanks = board.blank_spaces();
        let Some(&mv) = blanks.choose(&mut rng) else {
            break;
        };
        board.apply_move(mv)?;
        opening_moves.push(mv);
    }
    Ok(opening_moves)
}

/// Build an agent from a short name such as `ab:improved@5`, `mm:mixed`,
/// `greedy:open` or `random`.
///
/// The family comes before the first `:`, the evaluator after it (default
/// `improved`), and an optional `@depth` suffix sets the search depth.
pub fn build_agent(name: &str) -> Result<Box<dyn Agent>, IsolationError> {
    let name = name.trim();
    let (name, depth) = match name.split_once('@') {
        Some((name, depth)) => (name, Some(depth)),
        None => (name, None),
    };
    let (family, evaluator) = name.split_once(':').unwrap_or((name, ""));
    let kind = if evaluator.is_empty() {
        EvaluatorKind::Improved
    } else {
        evaluator.parse::<EvaluatorKind>()?
    };

    let mut agent: Box<dyn Agent> = match family.to_ascii_lowercase().as_str() {
        "ab" | "iterative" => Box::new(IterativeAgent::new(kind)),
        "mm" | "minimax" => Box::new(MinimaxAgent::new(kind)),
        "greedy" => Box::new(GreedyAgent::new(kind)),
        "random" => Box::new(RandomAgent::new()),
        _ => {
            return Err(IsolationError::invalid_option(
                "Agent",
                format!("unknown agent family '{family}'"),
            ))
        }
    };
    if let Some(depth) = depth {
        agent.set_option("Depth", depth)?;
    }
    Ok(agent)
}
