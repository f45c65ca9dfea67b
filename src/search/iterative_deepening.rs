//! Iterative deepening search with minimax alpha-beta pruning.
//!
//! The driver runs a complete fixed-depth alpha-beta pass at depth 1, 2, ...
//! and keeps the result of the last pass that finished. Every node polls the
//! time budget first; an exhausted budget unwinds the current pass as
//! `SearchInterrupt::Cancelled`, undoing each in-flight move on the way out,
//! and the driver reports the previous depth's move.
//!
//! Scores are from the root player's perspective. Maximizing layers belong
//! to the root player and use the `own` cache; minimizing layers use `opp`.
//! Terminal outcomes are shaped by distance (see `search::minimax`). A root
//! score beyond both `win_threshold` and the board's proven-score floor is a
//! forced result and ends deepening.
//!
//! Search features:
//! - Fail-hard alpha-beta over a single board mutated in place.
//! - Cache-assisted move ordering (best move first, or full score order).
//! - Optional bound-aware score reuse for transpositions.
//! - Optional seeded shuffling of freshly generated move lists.
//! - Optional mirror-symmetry cutoff at interior nodes.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, trace};

use crate::errors::IsolationError;
use crate::game_state::isolation_types::*;
use crate::search::board_scoring::Evaluator;
use crate::search::minimax::{proven_score_floor, shape_score, stalled_score};
use crate::search::search_cache::{Bound, CacheEntry, CacheStats, SearchCaches};
use crate::search::time_budget::{
    check_budget, SearchInterrupt, TimeBudget, DEFAULT_TIMER_THRESHOLD_MS,
};

pub const DEFAULT_MAX_DEPTH: u8 = 3;
/// Lower bound on the magnitude of a solved root score. The board's
/// proven-score floor applies on top of it, so large evaluations on big
/// boards are never mistaken for forced results.
pub const DEFAULT_WIN_THRESHOLD: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// No cache reads or writes.
    Disabled,
    /// Entries only order moves.
    #[default]
    OrderingOnly,
    /// Entries also settle nodes when depth and bound allow.
    Transposition,
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CachePolicy::Disabled => write!(f, "off"),
            CachePolicy::OrderingOnly => write!(f, "ordering"),
            CachePolicy::Transposition => write!(f, "transposition"),
        }
    }
}

impl FromStr for CachePolicy {
    type Err = IsolationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "disabled" | "false" => Ok(CachePolicy::Disabled),
            "ordering" | "order" | "on" | "true" => Ok(CachePolicy::OrderingOnly),
            "transposition" | "tt" => Ok(CachePolicy::Transposition),
            _ => Err(IsolationError::invalid_option(
                "Cache",
                format!("expected off, ordering or transposition, got '{s}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveOrdering {
    /// Moves are searched in generation order.
    None,
    /// The cached best move is swapped to the front.
    #[default]
    Partial,
    /// Moves follow the score order of the last completed expansion.
    Full,
}

impl fmt::Display for MoveOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveOrdering::None => write!(f, "none"),
            MoveOrdering::Partial => write!(f, "partial"),
            MoveOrdering::Full => write!(f, "full"),
        }
    }
}

impl FromStr for MoveOrdering {
    type Err = IsolationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(MoveOrdering::None),
            "partial" => Ok(MoveOrdering::Partial),
            "full" => Ok(MoveOrdering::Full),
            _ => Err(IsolationError::invalid_option(
                "Ordering",
                format!("expected none, partial or full, got '{s}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SearchPolicy {
    pub cache: CachePolicy,
    pub ordering: MoveOrdering,
    pub symmetry_pruning: bool,
    /// Shuffle freshly generated move lists with this seed.
    pub shuffle_seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub max_depth: u8,
    pub timer_threshold_ms: f64,
    pub win_threshold: f64,
    pub policy: SearchPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            timer_threshold_ms: DEFAULT_TIMER_THRESHOLD_MS,
            win_threshold: DEFAULT_WIN_THRESHOLD,
            policy: SearchPolicy::default(),
        }
    }
}

/// Driver state. `Deepening(d)` is entered before pass `d` starts,
/// `Searching(d)` while it runs; the final state is `Completed` with the
/// deepest finished pass or `TimedOut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Deepening(u8),
    Searching(u8),
    Completed(u8),
    TimedOut,
}

impl fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchPhase::Deepening(d) => write!(f, "deepening to {d}"),
            SearchPhase::Searching(d) => write!(f, "searching depth {d}"),
            SearchPhase::Completed(d) => write!(f, "completed depth {d}"),
            SearchPhase::TimedOut => write!(f, "timed out"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    pub best_move: Option<Square>,
    pub best_score: f64,
    pub reached_depth: u8,
    pub phase: SearchPhase,
    pub solved: bool,
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub cache_stats: CacheStats,
}

/// Outcome of one fixed-depth pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthResult {
    pub best_move: Option<Square>,
    pub best_score: f64,
    pub nodes: u64,
}

/// Everything the recursion reads or updates, threaded explicitly.
pub struct SearchContext<'a> {
    budget: &'a dyn TimeBudget,
    evaluator: &'a dyn Evaluator,
    caches: &'a mut SearchCaches,
    rng: &'a mut Option<StdRng>,
    policy: SearchPolicy,
    threshold_ms: f64,
    iteration_depth: u8,
    root: PlayerId,
    nodes: u64,
}

impl<'a> SearchContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        budget: &'a dyn TimeBudget,
        evaluator: &'a dyn Evaluator,
        caches: &'a mut SearchCaches,
        rng: &'a mut Option<StdRng>,
        policy: SearchPolicy,
        threshold_ms: f64,
        iteration_depth: u8,
        root: PlayerId,
    ) -> Self {
        Self {
            budget,
            evaluator,
            caches,
            rng,
            policy,
            threshold_ms,
            iteration_depth,
            root,
            nodes: 0,
        }
    }

    #[inline]
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    #[inline]
    fn enter_node(&mut self) -> Result<(), SearchInterrupt> {
        check_budget(self.budget, self.threshold_ms)?;
        self.nodes += 1;
        Ok(())
    }

    /// Shuffle (if seeded) then apply cache ordering. Also returns the cache
    /// entry so the caller can try score reuse.
    fn order_moves(
        &mut self,
        root_to_move: bool,
        key: u64,
        tag: &PositionTag,
        mut moves: Vec<Square>,
    ) -> (Vec<Square>, Option<CacheEntry>) {
        if let Some(rng) = self.rng.as_mut() {
            moves.shuffle(rng);
        }
        if self.policy.cache == CachePolicy::Disabled {
            return (moves, None);
        }

        let entry = self.caches.layer(root_to_move).probe(key, tag).cloned();
        if let Some(cached) = &entry {
            match self.policy.ordering {
                MoveOrdering::None => {}
                MoveOrdering::Partial => {
                    if let Some(best) = cached.best_move() {
                        if let Some(pos) = moves.iter().position(|mv| *mv == best) {
                            moves.swap(0, pos);
                        }
                    }
                }
                MoveOrdering::Full => {
                    moves.sort_by_key(|mv| {
                        cached
                            .moves
                            .iter()
                            .position(|stored| stored == mv)
                            .unwrap_or(usize::MAX)
                    });
                }
            }
        }
        (moves, entry)
    }

    /// Store a finished node. `scored` holds the explored prefix of `moves`
    /// with child scores; `best_idx` indexes into it.
    #[allow(clippy::too_many_arguments)]
    fn commit(
        &mut self,
        root_to_move: bool,
        key: u64,
        tag: PositionTag,
        depth: u8,
        score: f64,
        bound: Bound,
        moves: &[Square],
        scored: &[f64],
        best_idx: usize,
    ) {
        if self.policy.cache == CachePolicy::Disabled {
            return;
        }

        let ordered = match self.policy.ordering {
            MoveOrdering::Full => {
                let mut explored: Vec<(Square, f64)> =
                    moves.iter().copied().zip(scored.iter().copied()).collect();
                if root_to_move {
                    explored.sort_by(|a, b| b.1.total_cmp(&a.1));
                } else {
                    explored.sort_by(|a, b| a.1.total_cmp(&b.1));
                }
                explored
                    .into_iter()
                    .map(|(mv, _)| mv)
                    .chain(moves[scored.len()..].iter().copied())
                    .collect()
            }
            MoveOrdering::None | MoveOrdering::Partial => {
                let mut snapshot = moves.to_vec();
                snapshot.swap(0, best_idx);
                snapshot
            }
        };

        self.caches.layer(root_to_move).store(
            key,
            CacheEntry {
                tag,
                depth,
                score,
                bound,
                moves: ordered,
            },
        );
    }
}

/// Iterative deepening with fresh caches.
pub fn iterative_deepening_search(
    board: &mut BoardState,
    evaluator: &dyn Evaluator,
    config: &SearchConfig,
    budget: &dyn TimeBudget,
) -> Result<SearchResult, IsolationError> {
    let mut caches = SearchCaches::new();
    iterative_deepening_search_with_cache(board, evaluator, config, budget, &mut caches)
}

/// Iterative deepening over caller-owned caches.
///
/// The board is restored before returning. Running out of time is not an
/// error: the result then carries the last completed depth's move and
/// `SearchPhase::TimedOut`.
pub fn iterative_deepening_search_with_cache(
    board: &mut BoardState,
    evaluator: &dyn Evaluator,
    config: &SearchConfig,
    budget: &dyn TimeBudget,
    caches: &mut SearchCaches,
) -> Result<SearchResult, IsolationError> {
    let started_at = Instant::now();
    let root = board.active_player();

    let mut result = SearchResult {
        best_move: None,
        best_score: evaluator.score(board, root),
        reached_depth: 0,
        phase: SearchPhase::Completed(0),
        solved: false,
        nodes: 0,
        elapsed_ms: 0,
        cache_stats: caches.stats(),
    };

    if board.legal_moves_active().is_empty() {
        result.solved = true;
        return Ok(result);
    }
    if config.max_depth == 0 {
        return Ok(result);
    }

    // No line can be longer than the number of empty cells.
    let remaining = u8::try_from(board.max_remaining_moves()).unwrap_or(u8::MAX);
    let depth_cap = config.max_depth.min(remaining.max(1));
    let mut rng = config.policy.shuffle_seed.map(StdRng::seed_from_u64);
    let solved_above = config.win_threshold.max(proven_score_floor(board));

    for depth in 1..=depth_cap {
        result.phase = SearchPhase::Deepening(depth);
        trace!(depth, phase = %result.phase, "starting pass");

        let mut ctx = SearchContext::new(
            budget,
            evaluator,
            caches,
            &mut rng,
            config.policy,
            config.timer_threshold_ms,
            depth,
            root,
        );
        result.phase = SearchPhase::Searching(depth);
        let outcome = search_root(&mut ctx, board, depth);
        result.nodes += ctx.nodes();

        match outcome {
            Ok(pass) => {
                result.best_move = pass.best_move;
                result.best_score = pass.best_score;
                result.reached_depth = depth;
                result.phase = SearchPhase::Completed(depth);
                result.solved = pass.best_score.abs() > solved_above;
                debug!(
                    depth,
                    score = pass.best_score,
                    best_move = %format_move(pass.best_move),
                    nodes = pass.nodes,
                    solved = result.solved,
                    "depth completed"
                );
                if result.solved {
                    break;
                }
            }
            Err(SearchInterrupt::Cancelled) => {
                result.phase = SearchPhase::TimedOut;
                debug!(
                    depth,
                    reached_depth = result.reached_depth,
                    "time budget exhausted"
                );
                break;
            }
            Err(SearchInterrupt::Board(err)) => return Err(err),
        }
    }

    result.elapsed_ms = started_at.elapsed().as_millis() as u64;
    result.cache_stats = caches.stats();
    Ok(result)
}

/// One fixed-depth alpha-beta pass from the root.
pub fn alpha_beta_search(
    board: &mut BoardState,
    evaluator: &dyn Evaluator,
    depth: u8,
    policy: SearchPolicy,
    budget: &dyn TimeBudget,
    threshold_ms: f64,
    caches: &mut SearchCaches,
) -> Result<DepthResult, SearchInterrupt> {
    let mut rng = policy.shuffle_seed.map(StdRng::seed_from_u64);
    let root = board.active_player();
    let mut ctx = SearchContext::new(
        budget,
        evaluator,
        caches,
        &mut rng,
        policy,
        threshold_ms,
        depth,
        root,
    );
    search_root(&mut ctx, board, depth)
}

fn search_root(
    ctx: &mut SearchContext<'_>,
    board: &mut BoardState,
    depth: u8,
) -> Result<DepthResult, SearchInterrupt> {
    ctx.enter_node()?;

    let moves = board.legal_moves_active();
    if moves.is_empty() || depth == 0 {
        return Ok(DepthResult {
            best_move: None,
            best_score: ctx.evaluator.score(board, ctx.root),
            nodes: ctx.nodes,
        });
    }

    let key = board.fingerprint();
    let tag = board.position_tag();
    let (moves, _) = ctx.order_moves(true, key, &tag, moves);

    let mut alpha = f64::NEG_INFINITY;
    let beta = f64::INFINITY;
    let mut best_move = None;
    let mut best_score = f64::NEG_INFINITY;
    let mut best_idx = 0;
    let mut scored = Vec::with_capacity(moves.len());

    for (idx, &mv) in moves.iter().enumerate() {
        let undo = board.apply_move(mv)?;
        let child = alpha_beta(ctx, board, depth - 1, 1, alpha, beta);
        board.undo(&undo)?;
        let score = child?;

        scored.push(score);
        if best_move.is_none() || score > best_score {
            best_move = Some(mv);
            best_score = score;
            best_idx = idx;
        }
        alpha = alpha.max(best_score);
    }

    ctx.commit(
        true,
        key,
        tag,
        depth,
        best_score,
        Bound::Exact,
        &moves,
        &scored,
        best_idx,
    );
    trace!(
        iteration = ctx.iteration_depth,
        best_move = %format_move(best_move),
        score = best_score,
        "root expanded"
    );

    Ok(DepthResult {
        best_move,
        best_score,
        nodes: ctx.nodes,
    })
}

fn alpha_beta(
    ctx: &mut SearchContext<'_>,
    board: &mut BoardState,
    depth: u8,
    ply: u32,
    mut alpha: f64,
    mut beta: f64,
) -> Result<f64, SearchInterrupt> {
    ctx.enter_node()?;

    let maximizing = board.active_player() == ctx.root;
    let moves = board.legal_moves_active();
    if moves.is_empty() {
        return Ok(stalled_score(maximizing, ply));
    }
    if depth == 0 {
        return Ok(shape_score(ctx.evaluator.score(board, ctx.root), ply));
    }
    if ctx.policy.symmetry_pruning && board.is_symmetrical() {
        // The mirroring side wins, at the latest when the board fills up.
        let horizon = ply + board.max_remaining_moves() as u32;
        trace!(ply, mover = %board.active_player(), "symmetric position, mover loses");
        return Ok(stalled_score(maximizing, horizon));
    }

    let key = board.fingerprint();
    let tag = board.position_tag();
    let (moves, cached) = ctx.order_moves(maximizing, key, &tag, moves);
    if ctx.policy.cache == CachePolicy::Transposition {
        if let Some(score) = cached.and_then(|entry| entry.usable_score(depth, alpha, beta)) {
            return Ok(score);
        }
    }

    let (alpha_orig, beta_orig) = (alpha, beta);
    let mut best = stalled_score(maximizing, ply);
    let mut best_idx = 0;
    let mut scored = Vec::with_capacity(moves.len());

    for (idx, &mv) in moves.iter().enumerate() {
        let undo = board.apply_move(mv)?;
        let child = alpha_beta(ctx, board, depth - 1, ply + 1, alpha, beta);
        board.undo(&undo)?;
        let score = child?;
        scored.push(score);

        if maximizing {
            if score > best {
                best = score;
                best_idx = idx;
            }
            if best >= beta {
                ctx.commit(
                    maximizing,
                    key,
                    tag,
                    depth,
                    best,
                    Bound::Lower,
                    &moves,
                    &scored,
                    best_idx,
                );
                return Ok(best);
            }
            alpha = alpha.max(best);
        } else {
            if score < best {
                best = score;
                best_idx = idx;
            }
            if best <= alpha {
                ctx.commit(
                    maximizing,
                    key,
                    tag,
                    depth,
                    best,
                    Bound::Upper,
                    &moves,
                    &scored,
                    best_idx,
                );
                return Ok(best);
            }
            beta = beta.min(best);
        }
    }

    let bound = if maximizing && best <= alpha_orig {
        Bound::Upper
    } else if !maximizing && best >= beta_orig {
        Bound::Lower
    } else {
        Bound::Exact
    };
    ctx.commit(
        maximizing, key, tag, depth, best, bound, &moves, &scored, best_idx,
    );
    Ok(best)
}
