//! Populations and their pipeline operators.
//!
//! A [`Population`] holds [`Individual`]s (a chromosome plus a cached
//! fitness) and a generation counter. Its operators are chainable:
//!
//! - [`evaluate`](Population::evaluate): fill in missing fitness values
//! - [`mutate`](Population::mutate): replace chromosomes with a probability
//! - [`survive`](Population::survive): keep the best (or lucky) individuals
//! - [`breed`](Population::breed): refill to the intended size
//! - [`evolve`](Population::evolve): apply an [`Evolution`](crate::Evolution)
//!   once per generation
//!
//! # Key Types
//!
//! - [`PopulationConfig`]: optimization sense, seed, intended size
//! - [`Survive`]: survival step arguments
//! - [`Selection`]: parent picking strategies for `breed`

mod config;
mod individual;
mod pipeline;
pub mod selection;

pub use config::{PopulationConfig, Survive};
pub use individual::Individual;
pub use pipeline::{Evaluator, Population};
pub use selection::Selection;
