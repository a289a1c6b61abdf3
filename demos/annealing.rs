//! Simulated annealing on a random traveling-salesman instance.
//!
//! Every individual is an independent annealing chain: each iteration
//! proposes a swap of two towns and accepts it with the Metropolis
//! criterion at the current temperature.
//!
//! ```text
//! RUST_LOG=info cargo run --example annealing
//! ```

use rand::Rng;
use std::sync::Arc;
use u_evol::random::{create_rng, EvolRng};
use u_evol::{operators, Population, PopulationConfig};

const NUM_TOWNS: usize = 42;
const POPULATION_SIZE: usize = 200;
const NUM_ITER: usize = 200;
const START_TEMPERATURE: f64 = 1.0;
const DECAY: f64 = 0.995;
const SEED: u64 = 42;

type Town = (f64, f64);

fn tour_length(towns: &[Town], order: &[usize]) -> f64 {
    (0..order.len())
        .map(|i| {
            let (x1, y1) = towns[order[i]];
            let (x2, y2) = towns[order[(i + order.len() - 1) % order.len()]];
            ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
        })
        .sum()
}

fn anneal(towns: &[Town], order: &[usize], temperature: f64, rng: &mut EvolRng) -> Vec<usize> {
    let candidate = operators::swap(&order.to_vec(), rng);
    let delta = tour_length(towns, order) - tour_length(towns, &candidate);
    let accept = (delta / temperature).exp();
    if accept > rng.random::<f64>() {
        candidate
    } else {
        order.to_vec()
    }
}

fn main() -> u_evol::Result<()> {
    env_logger::init();

    let mut rng = create_rng(SEED);
    let towns: Arc<Vec<Town>> = Arc::new(
        (0..NUM_TOWNS)
            .map(|_| (rng.random::<f64>(), rng.random::<f64>()))
            .collect(),
    );

    let eval_towns = Arc::clone(&towns);
    let config = PopulationConfig::default().with_maximize(false).with_seed(SEED);
    let mut pop = Population::generate(
        |rng| operators::random_permutation(NUM_TOWNS, rng),
        POPULATION_SIZE,
        config,
    )?
    .with_evaluator(move |order: &Vec<usize>| tour_length(&eval_towns, order));
    pop.evaluate()?;

    let mut temperature = START_TEMPERATURE;
    for iteration in 0..NUM_ITER {
        pop.mutate(|order, rng| anneal(&towns, order, temperature, rng), 1.0)?
            .evaluate()?;
        log::info!(
            "iteration: {iteration} temperature: {temperature:.5} score: {:.4}",
            pop.best_fitness().unwrap_or(f64::NAN)
        );
        temperature *= DECAY;
    }

    if let Some(best) = pop.documented_best() {
        println!(
            "best tour length {:.4}: {:?}",
            best.fitness().unwrap_or(f64::NAN),
            best.chromosome()
        );
    }
    Ok(())
}
