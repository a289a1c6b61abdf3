//! Generation budget.

use super::types::Condition;
use crate::population::Population;

/// Stops evolution once the population reaches generation `max`.
///
/// Unlike the `n` passed to `evolve`, the limit is absolute: it counts all
/// generations of the population, including earlier `evolve` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationLimit {
    max: usize,
}

impl GenerationLimit {
    pub fn new(max: usize) -> Self {
        Self { max }
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

impl<C> Condition<C> for GenerationLimit {
    fn name(&self) -> &str {
        "generation limit"
    }

    fn check(&mut self, population: &Population<C>) -> bool {
        population.generation() < self.max
    }
}
