//! Pheromone-trail recombination on a random traveling-salesman instance.
//!
//! Surviving tours deposit pheromone on the arcs they use. New tours are
//! built town by town, choosing the next town with probability proportional
//! to the pheromone on the connecting arc. The trail matrix is threaded
//! through breeding as an explicit context.
//!
//! ```text
//! RUST_LOG=info cargo run --example pheromone
//! ```

use rand::seq::IndexedRandom;
use rand::Rng;
use std::sync::Arc;
use u_evol::random::{create_rng, EvolRng};
use u_evol::{operators, Population, PopulationConfig, Survive};

const NUM_TOWNS: usize = 21;
const POPULATION_SIZE: usize = 20;
const NUM_ITER: usize = 200;
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

/// Symmetric pheromone levels between every pair of towns.
struct Trails {
    levels: Vec<Vec<f64>>,
}

impl Trails {
    fn new(n: usize) -> Self {
        Self {
            levels: vec![vec![1.0; n]; n],
        }
    }

    fn deposit(&mut self, order: &[usize]) {
        for arc in order.windows(2) {
            self.levels[arc[0]][arc[1]] += 1.0;
            self.levels[arc[1]][arc[0]] += 1.0;
        }
    }

    fn build_tour(&self, rng: &mut EvolRng) -> Vec<usize> {
        let n = self.levels.len();
        let mut order = vec![0];
        let mut visited = vec![false; n];
        visited[0] = true;

        while order.len() < n {
            let current = order[order.len() - 1];
            let options: Vec<usize> = (0..n).filter(|&t| !visited[t]).collect();
            let next = options
                .choose_weighted(rng, |&t| self.levels[current][t])
                .ok()
                .copied()
                .unwrap_or(options[0]);
            visited[next] = true;
            order.push(next);
        }
        order
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

    let mut trails = Trails::new(NUM_TOWNS);
    for iteration in 0..NUM_ITER {
        log::info!(
            "iteration: {iteration} best score: {:.4}",
            pop.best_fitness().unwrap_or(f64::NAN)
        );

        pop.survive(Survive::fraction(0.2))?;
        for ind in &pop {
            trails.deposit(ind.chromosome());
        }

        pop.survive(Survive::count(1))?
            .breed_with_context(
                &mut trails,
                |parents, rng| vec![rng.random_range(0..parents.len())],
                |trails, _parents, rng| trails.build_tour(rng),
            )?
            .evaluate()?;
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
