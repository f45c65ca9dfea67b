//! Random-move agent.
//!
//! Selects uniformly from legal moves and is primarily used for diagnostics,
//! integration testing and as the weakest baseline in match series.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engines::engine_trait::{parse_value, Agent, EngineOutput};
use crate::errors::IsolationError;
use crate::game_state::isolation_types::*;
use crate::search::time_budget::TimeBudget;

pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "Random"
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), IsolationError> {
        if name.eq_ignore_ascii_case("Seed") {
            self.rng = StdRng::seed_from_u64(parse_value::<u64>(name, value)?);
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

        Ok(EngineOutput {
            best_move: legal_moves.choose(&mut self.rng).copied(),
            info_lines: vec![format!(
                "info string random_agent legal_moves {}",
                legal_moves.len()
            )],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RandomAgent;
    use crate::engines::engine_trait::Agent;
    use crate::game_state::isolation_types::*;
    use crate::search::time_budget::Unlimited;

    #[test]
    fn random_agent_plays_legal_moves_until_stuck() {
        let mut board = BoardState::new(5, 5).expect("valid");
        let mut agent = RandomAgent::seeded(5);
        loop {
            let out = agent.get_move(&board, &Unlimited).expect("no error");
            match out.best_move {
                Some(mv) => {
                    assert!(board.legal_moves_active().contains(&mv));
                    board.apply_move(mv).expect("legal");
                }
                None => {
                    assert!(board.legal_moves_active().is_empty());
                    assert_eq!(out.info_lines, ["info string random_agent legal_moves 0"]);
                    break;
                }
            }
        }
    }

    #[test]
    fn same_seed_same_choices() {
        let board = BoardState::new_game();
        let mut a = RandomAgent::seeded(9);
        let mut b = RandomAgent::seeded(9);
        for _ in 0..5 {
            assert_eq!(
                a.get_move(&board, &Unlimited).expect("no error").best_move,
                b.get_move(&board, &Unlimited).expect("no error").best_move
            );
        }
    }
}
