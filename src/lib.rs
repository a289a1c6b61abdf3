//! Composable evolutionary-computation engine.
//!
//! A population of candidate solutions is evolved under caller-supplied
//! initialization, evaluation, mutation, crossover and selection rules:
//!
//! - **Population pipeline**: [`Population`] exposes chainable operators
//!   (`evaluate`, `mutate`, `survive`, `breed`, `evolve`) over an opaque,
//!   caller-defined chromosome type.
//! - **Evolution**: [`Evolution`] is a reusable recipe of pipeline steps
//!   applied once per generation.
//! - **Conditions**: [`ConditionStack`] holds scoped, nestable stop
//!   conditions ([`TimeLimit`], [`MinimumProgress`], [`GenerationLimit`],
//!   closures) consulted before every generation.
//! - **Operators**: [`operators`] provides permutation initializers,
//!   mutations and crossover usable as pipeline callables.
//!
//! # Architecture
//!
//! This crate contains no domain-specific concepts. Problem data (cities,
//! distances, pheromone trails, ...) lives with the caller and reaches the
//! engine only through the callables it supplies.
//!
//! # Example
//!
//! ```
//! use u_evol::{operators, Evolution, Population, PopulationConfig, Selection, Survive};
//!
//! // Sort 8 numbers: fitness counts misplaced positions.
//! let eval = |perm: &Vec<usize>| perm.iter().enumerate().filter(|&(i, v)| i != *v).count() as f64;
//! let config = PopulationConfig::default().with_seed(42);
//! let mut pop = Population::generate(|rng| operators::random_permutation(8, rng), 40, config)
//!     .unwrap()
//!     .with_evaluator(eval);
//!
//! let mut evo = Evolution::new()
//!     .survive(Survive::fraction(0.25))
//!     .breed(Selection::Tournament(3).picker(2, false), operators::order_crossover)
//!     .mutate(operators::swap, 0.3)
//!     .evaluate();
//!
//! pop.evaluate().unwrap();
//! let start = pop.best_fitness().unwrap();
//! pop.evolve(&mut evo, 30).unwrap();
//! assert!(pop.documented_best().unwrap().fitness().unwrap() <= start);
//! ```

pub mod conditions;
pub mod error;
pub mod evolution;
pub mod operators;
pub mod population;
pub mod random;

pub use conditions::{
    Condition, ConditionGuard, ConditionStack, GenerationLimit, MinimumProgress, Predicate,
    TimeLimit,
};
pub use error::{EvolError, Result, StopEvolution};
pub use evolution::Evolution;
pub use population::{Individual, Population, PopulationConfig, Selection, Survive};
