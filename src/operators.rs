//! Ready-made operators for permutation chromosomes.
//!
//! The signatures match the pipeline callables directly, so they can be
//! passed to [`Population::mutate`](crate::Population::mutate),
//! [`Population::breed`](crate::Population::breed) or
//! [`Population::generate`](crate::Population::generate) without wrapping.
//! Every operator returns a new chromosome and leaves its input untouched.
//!
//! - [`random_permutation`]: initializer
//! - [`swap`], [`insert`], [`invert`]: mutations
//! - [`order_crossover`]: combiner (Davis, 1985), preserves relative order
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Cicirello (2023), "Genetic Operators for Permutation Representation"

#![allow(clippy::ptr_arg)]

use crate::random::EvolRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// A uniformly shuffled permutation of `0..n`.
pub fn random_permutation(n: usize, rng: &mut EvolRng) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(rng);
    perm
}

/// Exchanges two random positions.
pub fn swap<T: Clone>(genes: &Vec<T>, rng: &mut EvolRng) -> Vec<T> {
    let mut out = genes.clone();
    if out.len() >= 2 {
        let i = rng.random_range(0..out.len());
        let j = rng.random_range(0..out.len());
        out.swap(i, j);
    }
    out
}

/// Moves one random element to a random position.
pub fn insert<T: Clone>(genes: &Vec<T>, rng: &mut EvolRng) -> Vec<T> {
    let mut out = genes.clone();
    let n = out.len();
    if n >= 2 {
        let item = out.remove(rng.random_range(0..n));
        out.insert(rng.random_range(0..n), item);
    }
    out
}

/// Reverses a random segment (a 2-opt move for tours).
pub fn invert<T: Clone>(genes: &Vec<T>, rng: &mut EvolRng) -> Vec<T> {
    let mut out = genes.clone();
    if out.len() >= 2 {
        let (start, end) = random_segment(out.len(), rng);
        out[start..=end].reverse();
    }
    out
}

/// Order crossover (OX) of the first two parents.
///
/// A random segment of the first parent is kept in place; the remaining
/// positions are filled with the second parent's genes in their order,
/// starting after the segment and wrapping around. With a single parent the
/// child is a copy of it; with none it is empty.
///
/// # Panics
/// Panics if the parents are not permutations of the same `0..n`.
pub fn order_crossover(parents: &[&Vec<usize>], rng: &mut EvolRng) -> Vec<usize> {
    let Some(&template) = parents.first() else {
        return Vec::new();
    };
    let Some(donor) = parents.get(1) else {
        return template.clone();
    };
    let n = template.len();
    assert_eq!(n, donor.len(), "parents must have equal length");
    if n < 2 {
        return template.clone();
    }

    let (start, end) = random_segment(n, rng);
    let mut child = vec![usize::MAX; n];
    let mut taken = vec![false; n];
    for i in start..=end {
        child[i] = template[i];
        taken[template[i]] = true;
    }

    let mut pos = (end + 1) % n;
    for offset in 0..n {
        let gene = donor[(end + 1 + offset) % n];
        if !taken[gene] {
            child[pos] = gene;
            taken[gene] = true;
            pos = (pos + 1) % n;
        }
    }
    child
}

fn random_segment(n: usize, rng: &mut EvolRng) -> (usize, usize) {
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    (a.min(b), a.max(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use std::collections::HashSet;

    fn is_permutation(perm: &[usize], n: usize) -> bool {
        let set: HashSet<usize> = perm.iter().copied().collect();
        perm.len() == n && set.len() == n && perm.iter().all(|&v| v < n)
    }

    #[test]
    fn test_random_permutation() {
        let mut rng = create_rng(42);
        let perm = random_permutation(20, &mut rng);
        assert!(is_permutation(&perm, 20));
    }

    #[test]
    fn test_mutations_keep_permutations() {
        let mut rng = create_rng(42);
        let base: Vec<usize> = (0..12).collect();
        for _ in 0..200 {
            assert!(is_permutation(&swap(&base, &mut rng), 12));
            assert!(is_permutation(&insert(&base, &mut rng), 12));
            assert!(is_permutation(&invert(&base, &mut rng), 12));
        }
        assert_eq!(base, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_mutations_on_tiny_inputs() {
        let mut rng = create_rng(1);
        let one = vec![7usize];
        assert_eq!(swap(&one, &mut rng), one);
        assert_eq!(insert(&one, &mut rng), one);
        assert_eq!(invert(&Vec::<usize>::new(), &mut rng), Vec::<usize>::new());
    }

    #[test]
    fn test_order_crossover_valid() {
        let mut rng = create_rng(42);
        let p1: Vec<usize> = (0..8).collect();
        let p2: Vec<usize> = (0..8).rev().collect();
        for _ in 0..100 {
            let child = order_crossover(&[&p1, &p2], &mut rng);
            assert!(is_permutation(&child, 8), "invalid child: {child:?}");
        }
    }

    #[test]
    fn test_order_crossover_identical_parents() {
        let mut rng = create_rng(5);
        let p: Vec<usize> = vec![3, 1, 4, 0, 2];
        for _ in 0..20 {
            assert_eq!(order_crossover(&[&p, &p], &mut rng), p);
        }
    }

    #[test]
    fn test_order_crossover_single_parent() {
        let mut rng = create_rng(5);
        let p: Vec<usize> = vec![2, 0, 1];
        assert_eq!(order_crossover(&[&p], &mut rng), p);
        assert!(order_crossover(&[], &mut rng).is_empty());
    }
}
