//! Cooperative time budgets for search cancellation.
//!
//! A budget is polled, never blocked on. The search asks for the remaining
//! allowance at every node and unwinds with `SearchInterrupt::Cancelled` once
//! it drops under the safety threshold.

use std::cell::Cell;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::errors::IsolationError;

/// Milliseconds kept in reserve so the agent can return before its clock
/// actually runs out.
pub const DEFAULT_TIMER_THRESHOLD_MS: f64 = 30.0;

pub trait TimeBudget {
    /// Remaining allowance in milliseconds. May go negative.
    fn remaining_ms(&self) -> f64;
}

impl<F> TimeBudget for F
where
    F: Fn() -> f64,
{
    #[inline]
    fn remaining_ms(&self) -> f64 {
        self()
    }
}

/// Why a search stopped before finishing its current depth.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchInterrupt {
    #[error("search cancelled: time budget exhausted")]
    Cancelled,
    #[error(transparent)]
    Board(#[from] IsolationError),
}

/// Fail with `Cancelled` once fewer than `threshold_ms` remain.
#[inline]
pub fn check_budget(budget: &dyn TimeBudget, threshold_ms: f64) -> Result<(), SearchInterrupt> {
    if budget.remaining_ms() < threshold_ms {
        return Err(SearchInterrupt::Cancelled);
    }
    Ok(())
}

/// Wall-clock deadline.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(limit: Duration) -> Self {
        Self {
            at: Instant::now() + limit,
        }
    }

    pub fn after_ms(limit_ms: u64) -> Self {
        Self::after(Duration::from_millis(limit_ms))
    }
}

impl TimeBudget for Deadline {
    fn remaining_ms(&self) -> f64 {
        let now = Instant::now();
        match self.at.checked_duration_since(now) {
            Some(left) => left.as_secs_f64() * 1000.0,
            None => -(now.duration_since(self.at).as_secs_f64() * 1000.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

impl TimeBudget for Unlimited {
    #[inline]
    fn remaining_ms(&self) -> f64 {
        f64::INFINITY
    }
}

/// Reports plenty of time for the first `polls` queries, then none.
///
/// Searches without shuffling are deterministic, so a poll count pins the
/// exact node at which cancellation fires.
#[derive(Debug)]
pub struct CountdownBudget {
    allowed: usize,
    used: Cell<usize>,
}

impl CountdownBudget {
    pub fn new(polls: usize) -> Self {
        Self {
            allowed: polls,
            used: Cell::new(0),
        }
    }

    /// Number of times the budget has been queried so far.
    pub fn polls(&self) -> usize {
        self.used.get()
    }
}

impl TimeBudget for CountdownBudget {
    fn remaining_ms(&self) -> f64 {
        let used = self.used.get() + 1;
        self.used.set(used);
        if used <= self.allowed {
            f64::INFINITY
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_runs_out_after_allowed_polls() {
        let budget = CountdownBudget::new(2);
        assert!(check_budget(&budget, DEFAULT_TIMER_THRESHOLD_MS).is_ok());
        assert!(check_budget(&budget, DEFAULT_TIMER_THRESHOLD_MS).is_ok());
        assert_eq!(
            check_budget(&budget, DEFAULT_TIMER_THRESHOLD_MS),
            Err(SearchInterrupt::Cancelled)
        );
        assert_eq!(budget.polls(), 3);
    }

    #[test]
    fn closures_act_as_budgets() {
        let plenty = || 500.0;
        let tight = || 12.5;
        assert!(check_budget(&plenty, DEFAULT_TIMER_THRESHOLD_MS).is_ok());
        assert!(check_budget(&tight, DEFAULT_TIMER_THRESHOLD_MS).is_err());
        assert!(check_budget(&tight, 10.0).is_ok());
    }

    #[test]
    fn expired_deadline_goes_negative() {
        let deadline = Deadline::after(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        assert!(deadline.remaining_ms() < 0.0);
        assert!(Deadline::after_ms(60_000).remaining_ms() > 1_000.0);
        assert!(check_budget(&Unlimited, DEFAULT_TIMER_THRESHOLD_MS).is_ok());
    }

    #[test]
    fn board_errors_convert_into_interrupts() {
        let err = IsolationError::UndoMismatch {
            mv: crate::game_state::isolation_types::Square::new(1, 1),
        };
        let interrupt: SearchInterrupt = err.clone().into();
        assert_eq!(interrupt, SearchInterrupt::Board(err));
    }
}
