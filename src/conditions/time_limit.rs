//! Wall-clock budget.

use super::types::Condition;
use crate::population::Population;
use std::time::{Duration, Instant};

/// Stops evolution once a wall-clock budget is spent.
///
/// The clock starts when the condition is entered and is monotonic, so
/// system clock adjustments have no effect. A generation already running
/// when the budget expires is not interrupted.
#[derive(Debug, Clone)]
pub struct TimeLimit {
    limit: Duration,
    started: Option<Instant>,
}

impl TimeLimit {
    /// Budget of `seconds` seconds. Negative or non-finite values give a
    /// zero budget.
    pub fn new(seconds: f64) -> Self {
        Self::from_duration(Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO))
    }

    pub fn from_duration(limit: Duration) -> Self {
        Self {
            limit,
            started: None,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Time spent since the condition was entered.
    pub fn elapsed(&self) -> Duration {
        self.started.map(|s| s.elapsed()).unwrap_or_default()
    }
}

impl<C> Condition<C> for TimeLimit {
    fn name(&self) -> &str {
        "time limit"
    }

    fn on_enter(&mut self) {
        self.started = Some(Instant::now());
    }

    fn check(&mut self, _population: &Population<C>) -> bool {
        let started = *self.started.get_or_insert_with(Instant::now);
        started.elapsed() <= self.limit
    }
}
