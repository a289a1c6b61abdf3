//! Stagnation detection.

use super::types::Condition;
use crate::population::Population;
use std::collections::VecDeque;

/// Stops evolution once the best fitness stalls for `window` generations.
///
/// Every check records the population's current best fitness. Once
/// `window + 1` samples are held (spanning `window` generations), evolution
/// continues only if the newest sample improves on the oldest by more than
/// `min_change` in the population's optimization sense.
///
/// A population whose best individual is already optimal therefore stops
/// after exactly `window` generations.
///
/// Checks against a population without any evaluated individual record
/// nothing.
#[derive(Debug, Clone)]
pub struct MinimumProgress {
    window: usize,
    min_change: f64,
    history: VecDeque<f64>,
}

impl MinimumProgress {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            min_change: 0.0,
            history: VecDeque::with_capacity(window + 1),
        }
    }

    /// Requires improvements larger than `delta` (default `0.0`).
    pub fn with_min_change(mut self, delta: f64) -> Self {
        self.min_change = delta.max(0.0);
        self
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Recorded best-fitness samples, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }
}

impl<C> Condition<C> for MinimumProgress {
    fn name(&self) -> &str {
        "minimum progress"
    }

    fn on_enter(&mut self) {
        self.history.clear();
    }

    fn check(&mut self, population: &Population<C>) -> bool {
        if let Some(best) = population.best_fitness() {
            self.history.push_back(best);
            while self.history.len() > self.window + 1 {
                self.history.pop_front();
            }
        }

        if self.history.len() <= self.window {
            return true;
        }

        let (Some(&oldest), Some(&newest)) = (self.history.front(), self.history.back()) else {
            return true;
        };
        let improvement = if population.maximize() {
            newest - oldest
        } else {
            oldest - newest
        };
        improvement > self.min_change
    }
}
