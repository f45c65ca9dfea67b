//! Pluggable board evaluation interfaces and the mobility-based family.
//!
//! Search remains modular by delegating static position scoring to the
//! `Evaluator` trait, allowing alternate heuristics to be swapped without
//! altering search code. Every evaluator shares the terminal contract:
//! `-inf` when the perspective player has lost, `+inf` when it has won,
//! otherwise a finite score built from both players' mobility.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::errors::IsolationError;
use crate::game_state::isolation_types::*;
use crate::moves::knight_moves::MAX_KNIGHT_MOVES;

pub trait Evaluator: Send + Sync {
    /// Score from the perspective of `player`.
    fn score(&self, board: &BoardState, player: PlayerId) -> f64;
}

impl<F> Evaluator for F
where
    F: Fn(&BoardState, PlayerId) -> f64 + Send + Sync,
{
    #[inline]
    fn score(&self, board: &BoardState, player: PlayerId) -> f64 {
        self(board, player)
    }
}

/// Terminal score if the game is over for `player`, else `None`.
#[inline]
pub fn terminal_score(board: &BoardState, player: PlayerId) -> Option<f64> {
    if board.is_loser(player) {
        Some(f64::NEG_INFINITY)
    } else if board.is_winner(player) {
        Some(f64::INFINITY)
    } else {
        None
    }
}

#[inline]
fn mobilities(board: &BoardState, player: PlayerId) -> (usize, usize) {
    (board.mobility(player), board.mobility(player.opponent()))
}

const TABLE_SIZE: usize = MAX_KNIGHT_MOVES + 1;

struct PotentialTables {
    linear: [f64; TABLE_SIZE],
    quadratic: [f64; TABLE_SIZE],
}

static POTENTIALS: OnceLock<PotentialTables> = OnceLock::new();

fn potentials() -> &'static PotentialTables {
    POTENTIALS.get_or_init(|| {
        let mut linear = [0.0; TABLE_SIZE];
        let mut quadratic = [0.0; TABLE_SIZE];
        for m in 0..TABLE_SIZE {
            linear[m] = sum_linear(m);
            quadratic[m] = sum_quadratic(m);
        }
        PotentialTables { linear, quadratic }
    })
}

fn sum_linear(moves: usize) -> f64 {
    (1..=moves).map(|k| 1.0 / k as f64).sum()
}

fn sum_quadratic(moves: usize) -> f64 {
    (1..=moves).map(|k| 1.0 / (k * k) as f64).sum()
}

/// `1 + 1/2 + ... + 1/m`: each extra move is worth less than the last.
#[inline]
pub fn linear_potential(moves: usize) -> f64 {
    match potentials().linear.get(moves) {
        Some(v) => *v,
        // Only an unplaced player can see more than eight moves.
        None => sum_linear(moves),
    }
}

/// `1 + 1/4 + ... + 1/m^2`.
#[inline]
pub fn quadratic_potential(moves: usize) -> f64 {
    match potentials().quadratic.get(moves) {
        Some(v) => *v,
        None => sum_quadratic(moves),
    }
}

/// `own - opp`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MobilityDifference;

impl Evaluator for MobilityDifference {
    fn score(&self, board: &BoardState, player: PlayerId) -> f64 {
        if let Some(score) = terminal_score(board, player) {
            return score;
        }
        let (own, opp) = mobilities(board, player);
        own as f64 - opp as f64
    }
}

/// `own - alpha * opp`.
#[derive(Debug, Clone, Copy)]
pub struct WeightedMobility {
    pub alpha: f64,
}

impl Default for WeightedMobility {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

impl Evaluator for WeightedMobility {
    fn score(&self, board: &BoardState, player: PlayerId) -> f64 {
        if let Some(score) = terminal_score(board, player) {
            return score;
        }
        let (own, opp) = mobilities(board, player);
        own as f64 - self.alpha * opp as f64
    }
}

/// `own`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnMobility;

impl Evaluator for OwnMobility {
    fn score(&self, board: &BoardState, player: PlayerId) -> f64 {
        if let Some(score) = terminal_score(board, player) {
            return score;
        }
        board.mobility(player) as f64
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HarmonicPotential;

impl Evaluator for HarmonicPotential {
    fn score(&self, board: &BoardState, player: PlayerId) -> f64 {
        if let Some(score) = terminal_score(board, player) {
            return score;
        }
        let (own, opp) = mobilities(board, player);
        linear_potential(own) - linear_potential(opp)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QuadraticPotential;

impl Evaluator for QuadraticPotential {
    fn score(&self, board: &BoardState, player: PlayerId) -> f64 {
        if let Some(score) = terminal_score(board, player) {
            return score;
        }
        let (own, opp) = mobilities(board, player);
        quadratic_potential(own) - quadratic_potential(opp)
    }
}

/// Product of the linear and quadratic differences, signed by the linear
/// one. Both differences always agree in sign, so the product amplifies a
/// lead rather than flipping it.
#[derive(Debug, Clone, Copy, Default)]
pub struct MixedPotential;

impl MixedPotential {
    #[inline]
    pub fn combine(own: usize, opp: usize) -> f64 {
        let linear = linear_potential(own) - linear_potential(opp);
        let quadratic = quadratic_potential(own) - quadratic_potential(opp);
        if linear > 0.0 {
            linear * quadratic
        } else {
            -linear * quadratic
        }
    }
}

impl Evaluator for MixedPotential {
    fn score(&self, board: &BoardState, player: PlayerId) -> f64 {
        if let Some(score) = terminal_score(board, player) {
            return score;
        }
        let (own, opp) = mobilities(board, player);
        Self::combine(own, opp)
    }
}

/// Game-theoretic utility only; every unfinished position scores 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEvaluator;

impl Evaluator for NullEvaluator {
    fn score(&self, board: &BoardState, player: PlayerId) -> f64 {
        board.utility(player)
    }
}

/// Named evaluator choice for configuration and command lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvaluatorKind {
    Improved,
    Weighted(f64),
    Open,
    Linear,
    Quadratic,
    Mixed,
    Null,
}

impl EvaluatorKind {
    pub fn build(self) -> Box<dyn Evaluator> {
        match self {
            EvaluatorKind::Improved => Box::new(MobilityDifference),
            EvaluatorKind::Weighted(alpha) => Box::new(WeightedMobility { alpha }),
            EvaluatorKind::Open => Box::new(OwnMobility),
            EvaluatorKind::Linear => Box::new(HarmonicPotential),
            EvaluatorKind::Quadratic => Box::new(QuadraticPotential),
            EvaluatorKind::Mixed => Box::new(MixedPotential),
            EvaluatorKind::Null => Box::new(NullEvaluator),
        }
    }
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluatorKind::Improved => write!(f, "improved"),
            EvaluatorKind::Weighted(alpha) => write!(f, "weighted:{alpha}"),
            EvaluatorKind::Open => write!(f, "open"),
            EvaluatorKind::Linear => write!(f, "linear"),
            EvaluatorKind::Quadratic => write!(f, "quadratic"),
            EvaluatorKind::Mixed => write!(f, "mixed"),
            EvaluatorKind::Null => write!(f, "null"),
        }
    }
}

impl FromStr for EvaluatorKind {
    type Err = IsolationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = s.trim().to_ascii_lowercase();
        if let Some(alpha) = v.strip_prefix("weighted:") {
            let alpha = alpha.parse::<f64>().map_err(|_| {
                IsolationError::invalid_option("Evaluator", format!("invalid weight '{alpha}'"))
            })?;
            return Ok(EvaluatorKind::Weighted(alpha));
        }
        match v.as_str() {
            "improved" | "difference" => Ok(EvaluatorKind::Improved),
            "weighted" => Ok(EvaluatorKind::Weighted(1.0)),
            "open" | "own" => Ok(EvaluatorKind::Open),
            "linear" | "harmonic" => Ok(EvaluatorKind::Linear),
            "quadratic" => Ok(EvaluatorKind::Quadratic),
            "mixed" => Ok(EvaluatorKind::Mixed),
            "null" | "utility" => Ok(EvaluatorKind::Null),
            _ => Err(IsolationError::invalid_option(
                "Evaluator",
                format!("unknown evaluator '{s}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(one: (u8, u8), two: (u8, u8)) -> BoardState {
        let mut board = BoardState::new_game();
        board.apply_move(one.into()).expect("placement");
        board.apply_move(two.into()).expect("placement");
        board
    }

    fn all_kinds() -> Vec<EvaluatorKind> {
        vec![
            EvaluatorKind::Improved,
            EvaluatorKind::Weighted(0.5),
            EvaluatorKind::Open,
            EvaluatorKind::Linear,
            EvaluatorKind::Quadratic,
            EvaluatorKind::Mixed,
            EvaluatorKind::Null,
        ]
    }

    /// 3 wide, 2 tall: player two at (1,1) has no jump left once player
    /// one moves from (0,0) to (1,2).
    fn lost_for_player_two() -> BoardState {
        let mut board = BoardState::new(3, 2).expect("valid");
        board.apply_move(Square::new(0, 0)).expect("placement");
        board.apply_move(Square::new(1, 1)).expect("placement");
        board.apply_move(Square::new(1, 2)).expect("knight jump");
        board
    }

    #[test]
    fn potential_tables_match_series() {
        assert_eq!(linear_potential(0), 0.0);
        assert!((linear_potential(3) - (1.0 + 0.5 + 1.0 / 3.0)).abs() < 1e-12);
        assert!((quadratic_potential(2) - 1.25).abs() < 1e-12);
        assert!((linear_potential(12) - sum_linear(12)).abs() < 1e-12);
    }

    #[test]
    fn terminal_contract_holds_for_every_variant() {
        let board = lost_for_player_two();
        assert_eq!(board.active_player(), PlayerId::Two);
        assert!(board.is_loser(PlayerId::Two));
        for kind in all_kinds() {
            let eval = kind.build();
            assert_eq!(
                eval.score(&board, PlayerId::Two),
                f64::NEG_INFINITY,
                "{kind} should score the loser at -inf"
            );
            assert_eq!(
                eval.score(&board, PlayerId::One),
                f64::INFINITY,
                "{kind} should score the winner at +inf"
            );
        }
    }

    #[test]
    fn mobility_variants_on_known_position() {
        // One in the corner (2 moves), Two in the centre (8 moves).
        let board = placed((0, 0), (3, 3));
        assert_eq!(MobilityDifference.score(&board, PlayerId::One), -6.0);
        assert_eq!(MobilityDifference.score(&board, PlayerId::Two), 6.0);
        assert_eq!(OwnMobility.score(&board, PlayerId::One), 2.0);
        assert_eq!(
            WeightedMobility { alpha: 0.25 }.score(&board, PlayerId::One),
            0.0
        );
        let linear = HarmonicPotential.score(&board, PlayerId::One);
        assert!((linear - (linear_potential(2) - linear_potential(8))).abs() < 1e-12);
        assert!(linear < 0.0);
        assert_eq!(NullEvaluator.score(&board, PlayerId::One), 0.0);
    }

    #[test]
    fn mixed_potential_is_antisymmetric_and_sign_preserving() {
        for own in 0..=8 {
            for opp in 0..=8 {
                let a = MixedPotential::combine(own, opp);
                let b = MixedPotential::combine(opp, own);
                assert!((a + b).abs() < 1e-12);
                assert_eq!(a > 0.0, own > opp, "own={own} opp={opp}");
            }
        }
    }

    #[test]
    fn closures_are_evaluators() {
        let board = placed((0, 0), (3, 3));
        let eval = |b: &BoardState, p: PlayerId| b.mobility(p) as f64 * 10.0;
        assert_eq!(eval.score(&board, PlayerId::Two), 80.0);
    }

    #[test]
    fn kinds_parse_from_names() {
        assert_eq!("mixed".parse::<EvaluatorKind>(), Ok(EvaluatorKind::Mixed));
        assert_eq!(
            "Weighted:0.3".parse::<EvaluatorKind>(),
            Ok(EvaluatorKind::Weighted(0.3))
        );
        assert!("weighted:abc".parse::<EvaluatorKind>().is_err());
        assert!("nonsense".parse::<EvaluatorKind>().is_err());
        for kind in all_kinds() {
            assert_eq!(kind.to_string().parse::<EvaluatorKind>(), Ok(kind));
        }
    }
}
