//! Iterative-deepening alpha-beta agent.
//!
//! Wraps the core search with a configurable evaluator, cache policy and
//! move ordering. Caches belong to the agent and are cleared at the start of
//! every move so no fingerprint leaks from one decision into the next.

use tracing::{info, warn};

use crate::engines::engine_trait::{parse_switch, parse_value, Agent, EngineOutput};
use crate::errors::IsolationError;
use crate::game_state::isolation_types::*;
use crate::search::board_scoring::{Evaluator, EvaluatorKind};
use crate::search::iterative_deepening::{
    iterative_deepening_search_with_cache, CachePolicy, MoveOrdering, SearchConfig,
};
use crate::search::search_cache::SearchCaches;
use crate::search::time_budget::TimeBudget;

/// Depth limit when only the clock should stop deepening.
pub const ITERATIVE_MAX_DEPTH: u8 = 99;

pub struct IterativeAgent {
    name: String,
    config: SearchConfig,
    evaluator_kind: Option<EvaluatorKind>,
    evaluator: Box<dyn Evaluator>,
    caches: SearchCaches,
}

impl IterativeAgent {
    pub fn new(kind: EvaluatorKind) -> Self {
        Self::with_config(
            kind,
            SearchConfig {
                max_depth: ITERATIVE_MAX_DEPTH,
                ..SearchConfig::default()
            },
        )
    }

    pub fn with_config(kind: EvaluatorKind, config: SearchConfig) -> Self {
        Self {
            name: format!("AB_{kind}"),
            config,
            evaluator_kind: Some(kind),
            evaluator: kind.build(),
            caches: SearchCaches::new(),
        }
    }

    /// Agent around a caller-supplied evaluator.
    pub fn with_evaluator(
        name: impl Into<String>,
        evaluator: Box<dyn Evaluator>,
        config: SearchConfig,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            evaluator_kind: None,
            evaluator,
            caches: SearchCaches::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

impl Agent for IterativeAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn new_game(&mut self) {
        self.caches.clear();
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), IsolationError> {
        if name.eq_ignore_ascii_case("Depth") {
            let depth = parse_value::<u8>(name, value)?;
            if depth == 0 {
                return Err(IsolationError::invalid_option(name, "depth must be at least 1"));
            }
            self.config.max_depth = depth;
            return Ok(());
        }
        if name.eq_ignore_ascii_case("Threshold") {
            let threshold = parse_value::<f64>(name, value)?;
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(IsolationError::invalid_option(
                    name,
                    "threshold must be a non-negative number of milliseconds",
                ));
            }
            self.config.timer_threshold_ms = threshold;
            return Ok(());
        }
        if name.eq_ignore_ascii_case("Cache") {
            self.config.policy.cache = value.parse::<CachePolicy>()?;
            return Ok(());
        }
        if name.eq_ignore_ascii_case("Ordering") {
            self.config.policy.ordering = value.parse::<MoveOrdering>()?;
            return Ok(());
        }
        if name.eq_ignore_ascii_case("Symmetry") {
            self.config.policy.symmetry_pruning = parse_switch(name, value)?;
            return Ok(());
        }
        if name.eq_ignore_ascii_case("Seed") {
            let v = value.trim();
            self.config.policy.shuffle_seed = if v.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(parse_value::<u64>(name, v)?)
            };
            return Ok(());
        }
        if name.eq_ignore_ascii_case("Evaluator") {
            let kind = value.parse::<EvaluatorKind>()?;
            self.evaluator = kind.build();
            self.evaluator_kind = Some(kind);
            return Ok(());
        }
        Err(IsolationError::invalid_option(name, "unknown option"))
    }

    fn get_move(
        &mut self,
        board: &BoardState,
        time_left: &dyn TimeBudget,
    ) -> Result<EngineOutput, IsolationError> {
        self.caches.clear();
        let mut root = board.clone();
        let result = iterative_deepening_search_with_cache(
            &mut root,
            self.evaluator.as_ref(),
            &self.config,
            time_left,
            &mut self.caches,
        )?;

        let mut info_lines = Vec::new();
        let best_move = match result.best_move {
            Some(mv) => Some(mv),
            None => {
                // Out of time before depth 1 finished: any legal move beats a forfeit.
                let fallback = root.legal_moves_active().first().copied();
                if fallback.is_some() {
                    warn!(agent = %self.name, "no completed depth, playing first legal move");
                    info_lines.push("info string iterative_agent fallback first_legal".to_owned());
                }
                fallback
            }
        };

        info!(
            agent = %self.name,
            best_move = %format_move(best_move),
            depth = result.reached_depth,
            score = result.best_score,
            nodes = result.nodes,
            phase = %result.phase,
            "move chosen"
        );

        info_lines.push(format!(
            "info depth {} score {} nodes {} time {} phase {}",
            result.reached_depth, result.best_score, result.nodes, result.elapsed_ms, result.phase
        ));
        if let Some(kind) = self.evaluator_kind {
            info_lines.push(format!("info string iterative_agent evaluator {kind}"));
        }
        info_lines.push(format!(
            "info string iterative_agent max_depth {} cache {} ordering {} symmetry {}",
            self.config.max_depth,
            self.config.policy.cache,
            self.config.policy.ordering,
            self.config.policy.symmetry_pruning
        ));
        if result.solved {
            info_lines.push("info string iterative_agent solved".to_owned());
        }
        info_lines.push(format!(
            "info string cache probes {} hits {} stores {} stale {}",
            result.cache_stats.probes,
            result.cache_stats.hits,
            result.cache_stats.stores,
            result.cache_stats.stale
        ));

        Ok(EngineOutput {
            best_move,
            info_lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::IterativeAgent;
    use crate::engines::engine_trait::Agent;
    use crate::game_state::isolation_types::*;
    use crate::search::board_scoring::EvaluatorKind;
    use crate::search::time_budget::Unlimited;

    fn placed(one: (u8, u8), two: (u8, u8)) -> BoardState {
        let mut board = BoardState::new_game();
        board.apply_move(one.into()).expect("placement");
        board.apply_move(two.into()).expect("placement");
        board
    }

    #[test]
    fn iterative_agent_honors_depth_option() {
        let board = placed((0, 0), (3, 3));
        let mut agent = IterativeAgent::new(EvaluatorKind::Improved);
        agent.set_option("Depth", "2").expect("valid depth");

        let out = agent.get_move(&board, &Unlimited).expect("agent should move");
        let joined = out.info_lines.join("\n");
        assert!(joined.contains("info depth 2"), "expected depth-2 info:\n{joined}");
        assert!(joined.contains("evaluator improved"));
        assert!(!joined.contains("fallback"));
        let mv = out.best_move.expect("legal moves exist");
        assert!(board.legal_moves_active().contains(&mv));
    }

    #[test]
    fn exhausted_budget_falls_back_to_a_legal_move() {
        let board = placed((0, 0), (3, 3));
        let mut agent = IterativeAgent::new(EvaluatorKind::Mixed);
        let out = agent.get_move(&board, &|| -5.0).expect("agent should move");
        assert_eq!(out.best_move, board.legal_moves_active().first().copied());
        assert!(out.info_lines.iter().any(|l| l.contains("fallback")));
    }

    #[test]
    fn terminal_position_yields_no_move() {
        let mut board = BoardState::new(3, 2).expect("valid");
        for mv in [(0, 0), (1, 1), (1, 2)] {
            board.apply_move(Square::from(mv)).expect("empty");
        }
        let mut agent = IterativeAgent::new(EvaluatorKind::Improved);
        let out = agent.get_move(&board, &Unlimited).expect("no error");
        assert_eq!(out.best_move, None);
        assert!(!out.info_lines.iter().any(|l| l.contains("fallback")));
    }

    #[test]
    fn rejects_bad_options() {
        let mut agent = IterativeAgent::new(EvaluatorKind::Improved);
        assert!(agent.set_option("Depth", "0").is_err());
        assert!(agent.set_option("Threshold", "-3").is_err());
        assert!(agent.set_option("Cache", "sometimes").is_err());
        assert!(agent.set_option("Colour", "blue").is_err());
        agent.set_option("Evaluator", "weighted:2").expect("valid evaluator");
        agent.set_option("Cache", "transposition").expect("valid policy");
        agent.set_option("Ordering", "full").expect("valid ordering");
        agent.set_option("Symmetry", "on").expect("valid switch");
        agent.set_option("Seed", "42").expect("valid seed");
        assert_eq!(agent.config().policy.shuffle_seed, Some(42));
        assert!(agent.config().policy.symmetry_pruning);
    }
}
