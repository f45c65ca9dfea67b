//! Plain depth-limited minimax without pruning.
//!
//! Serves as the fixed-depth search behind `MinimaxAgent` and as the
//! reference the alpha-beta search must agree with. Scores are always from
//! the root player's perspective; terminal outcomes are shaped so that a win
//! found at ply `p` is worth `DEFAULT_SCORE_MAGNITUDE / p`.

use crate::game_state::isolation_types::*;
use crate::search::board_scoring::Evaluator;
use crate::search::time_budget::{check_budget, SearchInterrupt, TimeBudget};

/// Magnitude of a win or loss one ply from the root.
pub const DEFAULT_SCORE_MAGNITUDE: f64 = 1e19;

/// Score of a lost position for the root player found at `ply >= 1`.
#[inline]
pub fn loss_at(ply: u32) -> f64 {
    -DEFAULT_SCORE_MAGNITUDE / f64::from(ply.max(1))
}

/// Root-perspective value of a node whose side to move is out of moves:
/// the root player loses if it is to move, otherwise it wins.
#[inline]
pub fn stalled_score(root_to_move: bool, ply: u32) -> f64 {
    if root_to_move {
        loss_at(ply)
    } else {
        -loss_at(ply)
    }
}

/// Smallest magnitude a shaped win or loss can take on `board`. No line is
/// longer than the cell count, so every terminal score found by a search
/// lies strictly beyond this value and every finite evaluation below it.
pub fn proven_score_floor(board: &BoardState) -> f64 {
    DEFAULT_SCORE_MAGNITUDE / (board.cells().len() as f64 + 1.0)
}

/// Replace an evaluator's infinities with the depth-scaled magnitude.
#[inline]
pub fn shape_score(score: f64, ply: u32) -> f64 {
    if score == f64::NEG_INFINITY {
        loss_at(ply)
    } else if score == f64::INFINITY {
        -loss_at(ply)
    } else {
        score
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MinimaxResult {
    pub best_move: Option<Square>,
    pub best_score: f64,
    pub nodes: u64,
}

/// Search every line to `depth` plies and return the root's best move.
///
/// The board is mutated in place and restored before returning, whether
/// the search finished, ran out of time or hit a board error.
pub fn minimax_search(
    board: &mut BoardState,
    evaluator: &dyn Evaluator,
    depth: u8,
    budget: &dyn TimeBudget,
    threshold_ms: f64,
) -> Result<MinimaxResult, SearchInterrupt> {
    let root = board.active_player();
    let mut nodes = 0u64;
    check_budget(budget, threshold_ms)?;
    nodes += 1;

    let moves = board.legal_moves_active();
    if moves.is_empty() || depth == 0 {
        return Ok(MinimaxResult {
            best_move: None,
            best_score: evaluator.score(board, root),
            nodes,
        });
    }

    let mut best_move = None;
    let mut best_score = f64::NEG_INFINITY;
    for mv in moves {
        let undo = board.apply_move(mv)?;
        let scored = minimax_value(
            board,
            evaluator,
            root,
            depth - 1,
            1,
            budget,
            threshold_ms,
            &mut nodes,
        );
        board.undo(&undo)?;
        let score = scored?;
        if best_move.is_none() || score > best_score {
            best_move = Some(mv);
            best_score = score;
        }
    }

    Ok(MinimaxResult {
        best_move,
        best_score,
        nodes,
    })
}

#[allow(clippy::too_many_arguments)]
fn minimax_value(
    board: &mut BoardState,
    evaluator: &dyn Evaluator,
    root: PlayerId,
    depth: u8,
    ply: u32,
    budget: &dyn TimeBudget,
    threshold_ms: f64,
    nodes: &mut u64,
) -> Result<f64, SearchInterrupt> {
    check_budget(budget, threshold_ms)?;
    *nodes += 1;

    let maximizing = board.active_player() == root;
    let moves = board.legal_moves_active();
    if moves.is_empty() {
        return Ok(stalled_score(maximizing, ply));
    }
    if depth == 0 {
        return Ok(shape_score(evaluator.score(board, root), ply));
    }

    let mut best = stalled_score(maximizing, ply);
    for mv in moves {
        let undo = board.apply_move(mv)?;
        let scored = minimax_value(
            board,
            evaluator,
            root,
            depth - 1,
            ply + 1,
            budget,
            threshold_ms,
            nodes,
        );
        board.undo(&undo)?;
        let score = scored?;
        if maximizing {
            best = best.max(score);
        } else {
            best = best.min(score);
        }
    }
    Ok(best)
}
