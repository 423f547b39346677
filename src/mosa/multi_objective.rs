//! Pareto dominance over coverage goals.
//!
//! Every goal is an objective to minimize (fitness `0` = covered). Only
//! goals that are still uncovered take part in comparisons; covered goals
//! are dropped so selection pressure stays on the remainder.
//!
//! # Algorithms
//!
//! - [`DominanceComparator`]: pairwise dominance restricted to active goals
//! - [`non_dominated_sort`]: Fast non-dominated sorting (Deb et al., 2002)
//! - [`crowding_distance`]: Crowding distance assignment for diversity preservation
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - Panichella, Kifetew & Tonella (2015), "Reformulating Branch Coverage as a
//!   Many-Objective Optimization Problem"

use super::individual::Individual;
use super::types::{Chromosome, GoalId};

/// Dominance comparison result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Left dominates right.
    Left,
    /// Right dominates left.
    Right,
    /// Neither dominates the other.
    Neither,
}

impl Dominance {
    /// `-1` if left dominates, `+1` if right dominates, `0` otherwise.
    pub fn sign(self) -> i8 {
        match self {
            Dominance::Left => -1,
            Dominance::Right => 1,
            Dominance::Neither => 0,
        }
    }

    /// The same relation seen from the other side.
    pub fn reverse(self) -> Self {
        match self {
            Dominance::Left => Dominance::Right,
            Dominance::Right => Dominance::Left,
            Dominance::Neither => Dominance::Neither,
        }
    }
}

/// Compare two objective vectors for Pareto dominance (minimization).
///
/// Empty vectors never dominate each other.
pub fn dominance_cmp(a: &[f64], b: &[f64]) -> Dominance {
    let mut a_better_in_some = false;
    let mut b_better_in_some = false;

    for (&va, &vb) in a.iter().zip(b.iter()) {
        if va < vb {
            a_better_in_some = true;
        } else if vb < va {
            b_better_in_some = true;
        }
    }

    match (a_better_in_some, b_better_in_some) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        _ => Dominance::Neither,
    }
}

/// Pairwise dominance over a fixed set of active goals.
///
/// Unevaluated individuals count as infinitely far from every goal.
///
/// ```
/// use u_mosa::mosa::{Dominance, DominanceComparator, GoalId};
///
/// let goals = [GoalId(0), GoalId(1)];
/// let cmp = DominanceComparator::new(&goals);
/// assert_eq!(cmp.compare_fitness(&[0.0, 3.0], &[2.0, 0.0]), Dominance::Neither);
/// assert_eq!(cmp.compare_fitness(&[0.0, 1.0], &[2.0, 1.0]), Dominance::Left);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DominanceComparator<'g> {
    goals: &'g [GoalId],
}

impl<'g> DominanceComparator<'g> {
    /// Compares on `goals` only.
    pub fn new(goals: &'g [GoalId]) -> Self {
        Self { goals }
    }

    /// The active goals.
    pub fn goals(&self) -> &'g [GoalId] {
        self.goals
    }

    /// Compares two full fitness vectors indexed by goal.
    ///
    /// Missing entries count as infinitely far from the goal.
    pub fn compare_fitness(&self, a: &[f64], b: &[f64]) -> Dominance {
        dominance_cmp(&self.project(a), &self.project(b))
    }

    /// `fitness` restricted to the active goals, in goal order.
    pub fn project(&self, fitness: &[f64]) -> Vec<f64> {
        self.goals
            .iter()
            .map(|goal| fitness.get(goal.index()).copied().unwrap_or(f64::INFINITY))
            .collect()
    }

    /// Compares two individuals on the active goals.
    pub fn compare<C: Chromosome>(&self, a: &Individual<C>, b: &Individual<C>) -> Dominance {
        self.compare_fitness(a.fitness().unwrap_or(&[]), b.fitness().unwrap_or(&[]))
    }
}

/// Projects each individual's fitness onto the active goals.
///
/// Row `i` holds the fitness of `population[i]` for each goal in `goals`,
/// in order. Unevaluated individuals get `f64::INFINITY`.
pub fn objective_matrix<C: Chromosome>(
    population: &[Individual<C>],
    goals: &[GoalId],
) -> Vec<Vec<f64>> {
    let comparator = DominanceComparator::new(goals);
    population
        .iter()
        .map(|ind| comparator.project(ind.fitness().unwrap_or(&[])))
        .collect()
}

/// Result of non-dominated sorting.
///
/// Each element of `ranks` corresponds to the Pareto rank of the solution
/// at the same index. Rank 0 is the Pareto front (non-dominated solutions).
#[derive(Debug, Clone, Default)]
pub struct NondominatedSortResult {
    /// Pareto rank for each solution (0 = front).
    pub ranks: Vec<usize>,

    /// Indices grouped by front: `fronts[0]` contains rank-0 indices, etc.
    pub fronts: Vec<Vec<usize>>,
}

/// Fast non-dominated sorting.
///
/// Assigns a Pareto rank to each solution based on dominance relationships.
/// All objectives are **minimized**: lower values are better. Solutions
/// with zero objectives are mutually non-dominated and all land in front 0.
///
/// # Complexity
///
/// O(m * n²) where m = number of objectives, n = number of solutions
///
/// # Example
///
/// ```
/// use u_mosa::mosa::multi_objective::non_dominated_sort;
///
/// let objectives = vec![
///     vec![0.0, 5.0],  // covers the first goal
///     vec![3.0, 0.0],  // covers the second goal
///     vec![4.0, 4.0],
///     vec![5.0, 6.0],  // dominated by the third
/// ];
///
/// let result = non_dominated_sort(&objectives);
///
/// assert_eq!(result.ranks, vec![0, 0, 0, 1]);
/// assert_eq!(result.fronts.len(), 2);
/// ```
pub fn non_dominated_sort(objectives: &[Vec<f64>]) -> NondominatedSortResult {
    let n = objectives.len();
    if n == 0 {
        return NondominatedSortResult::default();
    }

    let mut domination_count = vec![0usize; n];
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut ranks = vec![0usize; n];
    let mut front_0 = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            match dominance_cmp(&objectives[i], &objectives[j]) {
                Dominance::Left => {
                    dominated_by[i].push(j);
                    domination_count[j] += 1;
                }
                Dominance::Right => {
                    dominated_by[j].push(i);
                    domination_count[i] += 1;
                }
                Dominance::Neither => {}
            }
        }

        // Every j < i has already been compared with i at this point.
        if domination_count[i] == 0 {
            front_0.push(i);
        }
    }

    let mut fronts = vec![front_0];
    loop {
        let Some(current) = fronts.last() else { break };
        let mut next_front = Vec::new();

        for &i in current {
            for &j in &dominated_by[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    ranks[j] = fronts.len();
                    next_front.push(j);
                }
            }
        }

        if next_front.is_empty() {
            break;
        }
        fronts.push(next_front);
    }

    NondominatedSortResult { ranks, fronts }
}

/// Crowding distance assignment for diversity preservation.
///
/// Higher distance means the solution is more isolated in objective
/// space. Boundary solutions receive `f64::INFINITY`. Objectives whose
/// range is zero or unbounded contribute nothing.
///
/// # Example
///
/// ```
/// use u_mosa::mosa::multi_objective::crowding_distance;
///
/// let objectives = vec![
///     vec![1.0, 5.0],
///     vec![3.0, 3.0],
///     vec![5.0, 1.0],
/// ];
///
/// let distances = crowding_distance(&objectives);
///
/// assert!(distances[0].is_infinite());
/// assert!(distances[2].is_infinite());
/// assert!(distances[1].is_finite());
/// ```
pub fn crowding_distance(objectives: &[Vec<f64>]) -> Vec<f64> {
    let n = objectives.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let m = objectives[0].len();
    let mut distances = vec![0.0f64; n];

    #[allow(clippy::needless_range_loop)] // obj_idx is a column index into 2D data
    for obj_idx in 0..m {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.sort_by(|&a, &b| {
            objectives[a][obj_idx]
                .partial_cmp(&objectives[b][obj_idx])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        distances[indices[0]] = f64::INFINITY;
        distances[indices[n - 1]] = f64::INFINITY;

        let min_val = objectives[indices[0]][obj_idx];
        let max_val = objectives[indices[n - 1]][obj_idx];
        let range = max_val - min_val;

        if range > 0.0 && range.is_finite() {
            for i in 1..(n - 1) {
                let prev = objectives[indices[i - 1]][obj_idx];
                let next = objectives[indices[i + 1]][obj_idx];
                distances[indices[i]] += (next - prev) / range;
            }
        }
    }

    distances
}

/// The first non-dominated front of `population` on the active goals.
///
/// These are the "best individuals" of a generation.
pub fn non_dominated<'a, C: Chromosome>(
    population: &'a [Individual<C>],
    goals: &[GoalId],
) -> Vec<&'a Individual<C>> {
    let objectives = objective_matrix(population, goals);
    let sorted = non_dominated_sort(&objectives);
    sorted
        .fronts
        .first()
        .map(|front| front.iter().map(|&i| &population[i]).collect())
        .unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================
