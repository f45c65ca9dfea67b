//! Errors used throughout the isolation engine.
//!
//! `IsolationError` is the single error type returned by board mutation,
//! agent configuration and the game driver. Every variant is a contract
//! violation by the caller (bad dimensions, a move onto a taken cell, an undo
//! that does not match the last move, an unknown option) and is surfaced
//! rather than ignored.
//!
//! Search cancellation lives in
//! [`crate::search::time_budget::SearchInterrupt`].

use thiserror::Error;

use crate::game_state::isolation_types::Square;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IsolationError {
    /// Board dimensions outside `1..=MAX_BOARD_SIDE`.
    #[error("invalid board dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Move target lies outside the board.
    #[error("move {0} is out of bounds")]
    OutOfBounds(Square),

    /// Move target is already blocked.
    #[error("move {0} targets an occupied cell")]
    CellOccupied(Square),

    /// `undo_move` was asked to revert something other than the last move.
    #[error("undo of {mv} does not match the last move")]
    UndoMismatch { mv: Square },

    /// Agent or harness option that could not be applied.
    #[error("invalid option '{name}': {reason}")]
    InvalidOption { name: String, reason: String },
}

impl IsolationError {
    pub fn invalid_option(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::IsolationError;
    use crate::game_state::isolation_types::Square;

    #[test]
    fn messages_name_the_offending_square() {
        let err = IsolationError::CellOccupied(Square::new(2, 3));
        assert_eq!(err.to_string(), "move (2, 3) targets an occupied cell");

        let err = IsolationError::invalid_option("Depth", "expected an integer");
        assert_eq!(
            err.to_string(),
            "invalid option 'Depth': expected an integer"
        );
    }
}
