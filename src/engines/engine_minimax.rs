//! Fixed-depth minimax agent.
//!
//! Searches every line to a configured depth without pruning. Mostly a
//! baseline for matches against the iterative agent.

use tracing::{info, warn};

use crate::engines::engine_trait::{parse_value, Agent, EngineOutput};
use crate::errors::IsolationError;
use crate::game_state::isolation_types::*;
use crate::search::board_scoring::{Evaluator, EvaluatorKind};
use crate::search::iterative_deepening::DEFAULT_MAX_DEPTH;
use crate::search::minimax::minimax_search;
use crate::search::time_budget::{SearchInterrupt, TimeBudget, DEFAULT_TIMER_THRESHOLD_MS};

pub struct MinimaxAgent {
    name: String,
    depth: u8,
    threshold_ms: f64,
    evaluator: Box<dyn Evaluator>,
}

impl MinimaxAgent {
    pub fn new(kind: EvaluatorKind) -> Self {
        Self::with_depth(kind, DEFAULT_MAX_DEPTH)
    }

    pub fn with_depth(kind: EvaluatorKind, depth: u8) -> Self {
        Self {
            name: format!("MM_{kind}"),
            depth,
            threshold_ms: DEFAULT_TIMER_THRESHOLD_MS,
            evaluator: kind.build(),
        }
    }
}

impl Agent for MinimaxAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), IsolationError> {
        if name.eq_ignore_ascii_case("Depth") {
            self.depth = parse_value::<u8>(name, value)?.max(1);
            return Ok(());
        }
        if name.eq_ignore_ascii_case("Threshold") {
            self.threshold_ms = parse_value::<f64>(name, value)?.max(0.0);
            return Ok(());
        }
        if name.eq_ignore_ascii_case("Evaluator") {
            self.evaluator = value.parse::<EvaluatorKind>()?.build();
            return Ok(());
        }
        Err(IsolationError::invalid_option(name, "unknown option"))
    }

    fn get_move(
        &mut self,
        board: &BoardState,
        time_left: &dyn TimeBudget,
    ) -> Result<EngineOutput, IsolationError> {
        let mut root = board.clone();

        let (best_move, info_line) = match minimax_search(
            &mut root,
            self.evaluator.as_ref(),
            self.depth,
            time_left,
            self.threshold_ms,
        ) {
            Ok(result) => (
                result.best_move,
                format!(
                    "info depth {} score {} nodes {}",
                    self.depth, result.best_score, result.nodes
                ),
            ),
            Err(SearchInterrupt::Cancelled) => {
                warn!(agent = %self.name, depth = self.depth, "minimax ran out of time");
                (
                    root.legal_moves_active().first().copied(),
                    "info string minimax_agent timeout fallback first_legal".to_owned(),
                )
            }
            Err(SearchInterrupt::Board(err)) => return Err(err),
        };

        info!(agent = %self.name, best_move = %format_move(best_move), "move chosen");
        Ok(EngineOutput {
            best_move,
            info_lines: vec![info_line],
        })
    }
}
