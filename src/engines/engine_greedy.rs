use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engines::engine_trait::{parse_value, Agent, EngineOutput};
use crate::errors::IsolationError;
use crate::game_state::isolation_types::*;
use crate::search::board_scoring::{Evaluator, EvaluatorKind};
use crate::search::time_budget::TimeBudget;

/// One-ply agent: plays the move whose resulting position the evaluator
/// likes best, breaking ties at random.
pub struct GreedyAgent {
    name: String,
    evaluator: Box<dyn Evaluator>,
    rng: StdRng,
}

impl GreedyAgent {
    pub fn new(kind: EvaluatorKind) -> Self {
        Self {
            name: format!("Greedy_{kind}"),
            evaluator: kind.build(),
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn seeded(kind: EvaluatorKind, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new(kind)
        }
    }
}

impl Agent for GreedyAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), IsolationError> {
        if name.eq_ignore_ascii_case("Seed") {
            self.rng = StdRng::seed_from_u64(parse_value::<u64>(name, value)?);
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
        _time_left: &dyn TimeBudget,
    ) -> Result<EngineOutput, IsolationError> {
        let legal_moves = board.legal_moves_active();
        let mut info_lines = vec![format!(
            "info string greedy_agent legal_moves {}",
            legal_moves.len()
        )];
        if legal_moves.is_empty() {
            return Ok(EngineOutput {
                best_move: None,
                info_lines,
            });
        }

        let player = board.active_player();
        let mut scratch = board.clone();
        let mut best_value = f64::NEG_INFINITY;
        let mut best_moves = Vec::new();

        for mv in legal_moves {
            let undo = scratch.apply_move(mv)?;
            let value = self.evaluator.score(&scratch, player);
            scratch.undo(&undo)?;

            if best_moves.is_empty() || value > best_value {
                best_value = value;
                best_moves.clear();
                best_moves.push(mv);
            } else if value == best_value {
                best_moves.push(mv);
            }
        }

        info_lines.push(format!("info string greedy_agent score {best_value}"));
        Ok(EngineOutput {
            best_move: best_moves.choose(&mut self.rng).copied(),
            info_lines,
        })
    }
}
