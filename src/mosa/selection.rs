//! Parent selection.
//!
//! Individuals are ordered by the crowded comparison used in NSGA-II:
//! lower non-domination rank first, then larger crowding distance. Rank
//! and distance are assigned during truncation.
//!
//! # References
//!
//! - Baker (1985), "Adaptive Selection Methods for Genetic Algorithms"
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective GA: NSGA-II"

use super::error::{MosaError, Result};
use super::individual::Individual;
use super::types::Chromosome;
use rand::Rng;
use std::cmp::Ordering;

/// Selection strategy for choosing parents.
///
/// # Examples
///
/// ```
/// use u_mosa::mosa::Selection;
///
/// // Linear ranking over the crowded order (the default)
/// let sel = Selection::default();
/// assert_eq!(sel, Selection::Rank);
///
/// // Binary crowded tournament
/// let sel = Selection::Tournament(2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Crowded tournament: pick `k` individuals at random, keep the one
    /// with the lowest rank, breaking ties by larger crowding distance.
    ///
    /// # Complexity
    /// O(k) per selection
    Tournament(usize),

    /// Linear ranking over the crowded order.
    ///
    /// The best individual gets weight `n`, the worst weight `1`.
    ///
    /// # Complexity
    /// O(n log n) per selection
    #[default]
    Rank,

    /// Uniform random choice, ignoring rank and distance.
    Random,
}

impl Selection {
    /// Select a parent index from the population.
    ///
    /// # Errors
    /// [`MosaError::EmptyPopulation`] if `population` is empty.
    pub fn select<C: Chromosome, R: Rng>(
        &self,
        population: &[Individual<C>],
        rng: &mut R,
    ) -> Result<usize> {
        match population.len() {
            0 => Err(MosaError::EmptyPopulation),
            1 => Ok(0),
            _ => Ok(match self {
                Selection::Tournament(k) => tournament(population, *k, rng),
                Selection::Rank => rank(population, rng),
                Selection::Random => rng.random_range(0..population.len()),
            }),
        }
    }
}

/// Crowded comparison: `Less` means `a` is preferred.
pub fn crowded_cmp<C: Chromosome>(a: &Individual<C>, b: &Individual<C>) -> Ordering {
    a.rank().cmp(&b.rank()).then_with(|| {
        b.crowding_distance()
            .partial_cmp(&a.crowding_distance())
            .unwrap_or(Ordering::Equal)
    })
}

fn tournament<C: Chromosome, R: Rng>(population: &[Individual<C>], k: usize, rng: &mut R) -> usize {
    let k = k.max(1);
    let n = population.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if crowded_cmp(&population[idx], &population[best_idx]) == Ordering::Less {
            best_idx = idx;
        }
    }
    best_idx
}

fn rank<C: Chromosome, R: Rng>(population: &[Individual<C>], rng: &mut R) -> usize {
    let n = population.len();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| crowded_cmp(&population[a], &population[b]));

    // weight_i = n - position_i
    let total: f64 = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;

    for (position, &original_idx) in order.iter().enumerate() {
        cumulative += (n - position) as f64;
        if cumulative > threshold {
            return original_idx;
        }
    }

    order[n - 1] // floating-point fallback
}
