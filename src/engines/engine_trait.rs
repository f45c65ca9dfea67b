//! Agent abstraction consumed by the game driver and match harness.
//!
//! An agent receives a board snapshot and a time budget and answers with one
//! move, or `None` when it has nothing to play. Different strategies are
//! selected at runtime behind this single trait.

use crate::errors::IsolationError;
use crate::game_state::isolation_types::*;
use crate::search::time_budget::TimeBudget;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineOutput {
    pub best_move: Option<Square>,
    pub info_lines: Vec<String>,
}

pub trait Agent: Send {
    fn name(&self) -> &str;

    /// Forget anything carried over from a previous game.
    fn new_game(&mut self) {}

    fn set_option(&mut self, name: &str, _value: &str) -> Result<(), IsolationError> {
        Err(IsolationError::invalid_option(name, "unknown option"))
    }

    /// Choose a move for the side to move on `board`. `time_left` must be
    /// polled, never waited on; returning after it goes negative loses the
    /// game on time.
    fn get_move(
        &mut self,
        board: &BoardState,
        time_left: &dyn TimeBudget,
    ) -> Result<EngineOutput, IsolationError>;
}

/// Parse an agent option value as a boolean switch.
pub fn parse_switch(name: &str, value: &str) -> Result<bool, IsolationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(IsolationError::invalid_option(
            name,
            format!("expected on or off, got '{value}'"),
        )),
    }
}

/// Parse an agent option value with `FromStr`, naming the option on failure.
pub fn parse_value<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, IsolationError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| IsolationError::invalid_option(name, format!("invalid value '{value}'")))
}
