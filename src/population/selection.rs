//! Ranking and selection.
//!
//! Two concerns live here:
//!
//! - **Survival**: [`rank_order`] ranks a population best-first for
//!   deterministic survival, and [`sample_without_replacement`] draws lucky
//!   survivors with fitness-proportionate weights.
//! - **Parent picking**: [`Selection`] strategies that build a
//!   `parent_picker` for [`breed`](super::Population::breed).
//!
//! All functions honor the population's `maximize` sense.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Baker (1985), "Adaptive Selection Methods for Genetic Algorithms"

use super::individual::Individual;
use crate::error::{EvolError, Result};
use crate::random::EvolRng;
use rand::Rng;
use std::cmp::Ordering;

const EPSILON: f64 = 1e-10;

/// Orders two fitness values so that the better one comes first.
pub fn compare_fitness(a: f64, b: f64, maximize: bool) -> Ordering {
    let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    if maximize {
        ord.reverse()
    } else {
        ord
    }
}

/// Like [`compare_fitness`], with unevaluated individuals ranked last.
fn compare_optional(a: Option<f64>, b: Option<f64>, maximize: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_fitness(a, b, maximize),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Indices of `individuals` sorted best-first.
///
/// The sort is stable, so ties keep their population order.
///
/// # Errors
/// [`EvolError::Unevaluated`] if any individual has no fitness.
pub fn rank_order<C>(individuals: &[Individual<C>], maximize: bool) -> Result<Vec<usize>> {
    let mut indexed = Vec::with_capacity(individuals.len());
    for (index, ind) in individuals.iter().enumerate() {
        match ind.fitness() {
            Some(f) => indexed.push((index, f)),
            None => return Err(EvolError::Unevaluated { index }),
        }
    }
    indexed.sort_by(|a, b| compare_fitness(a.1, b.1, maximize));
    Ok(indexed.into_iter().map(|(i, _)| i).collect())
}

/// Converts fitness values into strictly positive selection weights.
///
/// For minimization: `w_i = max - f_i + ε`; for maximization:
/// `w_i = f_i - min + ε`. The best individual gets the largest weight and
/// negative fitness values are handled.
pub fn fitness_weights(fitnesses: &[f64], maximize: bool) -> Vec<f64> {
    if fitnesses.is_empty() {
        return Vec::new();
    }

    let (lo, hi) = fitnesses
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &f| {
            (lo.min(f), hi.max(f))
        });

    fitnesses
        .iter()
        .map(|&f| {
            let w = if maximize { f - lo } else { hi - f } + EPSILON;
            if w.is_finite() && w > 0.0 {
                w
            } else {
                EPSILON
            }
        })
        .collect()
}

/// Draws `k` distinct indices with probability proportional to `weights`.
///
/// Returns indices in draw order. `k` is capped at `weights.len()`.
pub fn sample_without_replacement(weights: &[f64], k: usize, rng: &mut EvolRng) -> Vec<usize> {
    let mut remaining: Vec<(usize, f64)> = weights.iter().copied().enumerate().collect();
    let k = k.min(remaining.len());
    let mut chosen = Vec::with_capacity(k);

    while chosen.len() < k {
        let total: f64 = remaining.iter().map(|&(_, w)| w).sum();
        let pos = if total > 0.0 {
            let threshold = rng.random_range(0.0..total);
            let mut cumulative = 0.0;
            remaining
                .iter()
                .position(|&(_, w)| {
                    cumulative += w;
                    cumulative > threshold
                })
                .unwrap_or(remaining.len() - 1)
        } else {
            rng.random_range(0..remaining.len())
        };
        chosen.push(remaining.swap_remove(pos).0);
    }

    chosen
}

/// Parent selection strategy.
///
/// # Examples
///
/// ```
/// use u_evol::{Selection, Individual};
/// use u_evol::random::create_rng;
///
/// let parents = vec![
///     Individual::with_fitness(1, 3.0),
///     Individual::with_fitness(2, 1.0),
/// ];
/// let mut pick = Selection::Tournament(2).picker::<i32>(2, false);
/// let chosen = pick(&parents[..], &mut create_rng(42));
/// assert_eq!(chosen.len(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Uniformly random parent.
    Random,

    /// Pick `k` individuals at random and keep the best.
    ///
    /// Higher `k` means stronger selection pressure.
    Tournament(usize),

    /// Fitness-proportionate (roulette wheel) selection using
    /// [`fitness_weights`].
    Roulette,

    /// Linear ranking: the best of `n` gets weight `n`, the worst weight 1.
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(3)
    }
}

impl Selection {
    /// Selects one parent index.
    ///
    /// Unevaluated individuals are treated as the worst candidates.
    ///
    /// # Errors
    /// [`EvolError::EmptyPopulation`] if `individuals` is empty.
    pub fn select<C>(
        &self,
        individuals: &[Individual<C>],
        maximize: bool,
        rng: &mut EvolRng,
    ) -> Result<usize> {
        if individuals.is_empty() {
            return Err(EvolError::EmptyPopulation);
        }

        Ok(match self {
            Selection::Random => rng.random_range(0..individuals.len()),
            Selection::Tournament(k) => tournament(individuals, *k, maximize, rng),
            Selection::Roulette => roulette(individuals, maximize, rng),
            Selection::Rank => rank(individuals, maximize, rng),
        })
    }

    /// Builds a parent picker that draws `parents` indices per child.
    ///
    /// An empty pool yields no parents.
    pub fn picker<C>(
        self,
        parents: usize,
        maximize: bool,
    ) -> impl FnMut(&[Individual<C>], &mut EvolRng) -> Vec<usize> {
        move |individuals, rng| {
            (0..parents)
                .map_while(|_| self.select(individuals, maximize, rng).ok())
                .collect()
        }
    }
}

fn tournament<C>(individuals: &[Individual<C>], k: usize, maximize: bool, rng: &mut EvolRng) -> usize {
    let k = k.max(1);
    let n = individuals.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        let ord = compare_optional(
            individuals[idx].fitness(),
            individuals[best_idx].fitness(),
            maximize,
        );
        if ord == Ordering::Less {
            best_idx = idx;
        }
    }
    best_idx
}

fn roulette<C>(individuals: &[Individual<C>], maximize: bool, rng: &mut EvolRng) -> usize {
    let n = individuals.len();
    if n == 1 {
        return 0;
    }

    let evaluated: Vec<f64> = individuals.iter().filter_map(Individual::fitness).collect();
    let weights = fitness_weights(&evaluated, maximize);
    let mut weights = weights.into_iter();
    let weights: Vec<f64> = individuals
        .iter()
        .map(|ind| match ind.fitness() {
            Some(_) => weights.next().unwrap_or(EPSILON),
            None => EPSILON,
        })
        .collect();

    let total: f64 = weights.iter().sum();
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }

    n - 1
}

fn rank<C>(individuals: &[Individual<C>], maximize: bool, rng: &mut EvolRng) -> usize {
    let n = individuals.len();
    if n == 1 {
        return 0;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        compare_optional(individuals[a].fitness(), individuals[b].fitness(), maximize)
    });

    let total = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (position, &idx) in order.iter().enumerate() {
        cumulative += (n - position) as f64;
        if cumulative > threshold {
            return idx;
        }
    }

    order[n - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn make_population(fitnesses: &[f64]) -> Vec<Individual<usize>> {
        fitnesses
            .iter()
            .enumerate()
            .map(|(i, &f)| Individual::with_fitness(i, f))
            .collect()
    }

    #[test]
    fn test_rank_order_minimize_and_maximize() {
        let pop = make_population(&[3.0, 1.0, 2.0]);
        assert_eq!(rank_order(&pop, false).unwrap(), vec![1, 2, 0]);
        assert_eq!(rank_order(&pop, true).unwrap(), vec![0, 2, 1]);
    }

    #[test]
    fn test_rank_order_is_stable() {
        let pop = make_population(&[1.0, 1.0, 0.5, 1.0]);
        assert_eq!(rank_order(&pop, false).unwrap(), vec![2, 0, 1, 3]);
    }

    #[test]
    fn test_rank_order_rejects_unevaluated() {
        let mut pop = make_population(&[1.0, 2.0]);
        pop.push(Individual::new(9));
        assert!(matches!(
            rank_order(&pop, false),
            Err(EvolError::Unevaluated { index: 2 })
        ));
    }

    #[test]
    fn test_fitness_weights_favor_best() {
        let w = fitness_weights(&[10.0, 1.0, 5.0], false);
        assert!(w[1] > w[2] && w[2] > w[0]);
        let w = fitness_weights(&[10.0, 1.0, 5.0], true);
        assert!(w[0] > w[2] && w[2] > w[1]);
        assert!(w.iter().all(|&x| x > 0.0));
    }

    #[test]
    fn test_sample_without_replacement_distinct() {
        let mut rng = create_rng(42);
        let weights = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mut chosen = sample_without_replacement(&weights, 5, &mut rng);
        chosen.sort_unstable();
        assert_eq!(chosen, vec![0, 1, 2, 3, 4]);

        let capped = sample_without_replacement(&weights, 10, &mut rng);
        assert_eq!(capped.len(), 5);
    }

    #[test]
    fn test_sample_without_replacement_prefers_heavy() {
        let mut rng = create_rng(7);
        let weights = [100.0, 1.0, 1.0, 1.0];
        let mut first_pick_heavy = 0;
        for _ in 0..1000 {
            if sample_without_replacement(&weights, 1, &mut rng)[0] == 0 {
                first_pick_heavy += 1;
            }
        }
        assert!(first_pick_heavy > 900, "heavy picked {first_pick_heavy}/1000");
    }

    #[test]
    fn test_tournament_favors_best() {
        let pop = make_population(&[10.0, 5.0, 1.0, 8.0]);
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        for _ in 0..10000 {
            counts[Selection::Tournament(4).select(&pop, false, &mut rng).unwrap()] += 1;
        }
        assert!(counts[2] > 6000, "expected best >60%, got {counts:?}");
    }

    #[test]
    fn test_tournament_respects_maximize() {
        let pop = make_population(&[10.0, 5.0, 1.0, 8.0]);
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        for _ in 0..10000 {
            counts[Selection::Tournament(4).select(&pop, true, &mut rng).unwrap()] += 1;
        }
        assert!(counts[0] > 6000, "expected best >60%, got {counts:?}");
    }

    #[test]
    fn test_roulette_and_rank_favor_best() {
        let pop = make_population(&[100.0, 50.0, 1.0, 80.0]);
        let mut rng = create_rng(42);

        for selection in [Selection::Roulette, Selection::Rank] {
            let mut counts = [0u32; 4];
            for _ in 0..10000 {
                counts[selection.select(&pop, false, &mut rng).unwrap()] += 1;
            }
            assert!(
                counts[2] > counts[0],
                "{selection:?}: best should beat worst, got {counts:?}"
            );
        }
    }

    #[test]
    fn test_random_is_roughly_uniform() {
        let pop = make_population(&[10.0, 5.0, 1.0, 8.0]);
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        for _ in 0..10000 {
            counts[Selection::Random.select(&pop, false, &mut rng).unwrap()] += 1;
        }
        for &c in &counts {
            assert!(c > 2000, "expected uniform, got {counts:?}");
        }
    }

    #[test]
    fn test_single_individual() {
        let pop = make_population(&[5.0]);
        let mut rng = create_rng(42);
        for selection in [
            Selection::Random,
            Selection::Tournament(3),
            Selection::Roulette,
            Selection::Rank,
        ] {
            assert_eq!(selection.select(&pop, false, &mut rng).unwrap(), 0);
        }
    }

    #[test]
    fn test_empty_population_is_an_error() {
        let pop: Vec<Individual<usize>> = vec![];
        let mut rng = create_rng(42);
        assert!(matches!(
            Selection::Rank.select(&pop, false, &mut rng),
            Err(EvolError::EmptyPopulation)
        ));

        let mut pick = Selection::Random.picker::<usize>(2, false);
        assert!(pick(&pop[..], &mut rng).is_empty());
    }

    #[test]
    fn test_picker_returns_requested_parents() {
        let pop = make_population(&[1.0, 2.0, 3.0]);
        let mut rng = create_rng(1);
        let mut pick = Selection::Roulette.picker::<usize>(3, true);
        let parents = pick(&pop[..], &mut rng);
        assert_eq!(parents.len(), 3);
        assert!(parents.iter().all(|&i| i < pop.len()));
    }
}
