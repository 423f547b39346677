//! Generational search loop.
//!
//! [`MosaSearch`] drives the state machine
//! `Initializing → Evolving → Done`:
//! random population → evaluation → archive update → repeat {breed →
//! evaluate offspring → archive update → non-dominated truncation} until
//! every goal is covered or the budget is spent. [`MosaRunner`] wraps it
//! with the default crossover and the budget from [`MosaConfig`].

use super::archive::Archive;
use super::config::MosaConfig;
use super::crossover::{Crossover, SinglePointRelativeCrossover};
use super::error::Result;
use super::individual::{IdSequence, Individual};
use super::multi_objective::{
    crowding_distance, non_dominated, non_dominated_sort, objective_matrix,
};
use super::stopping::{CancelFlag, SearchStatus, StoppingCondition};
use super::types::{Chromosome, FitnessFunction, GenerationProgress, GoalId, MosaProblem};
use crate::emit::Emitter;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// Every goal is covered.
    AllGoalsCovered,
    /// The stopping condition fired with goals left uncovered.
    BudgetExhausted,
}

/// Engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// No population yet.
    Initializing,
    /// Generations are being bred.
    Evolving,
    /// Terminal.
    Done(Termination),
}

/// Result of a search run.
#[derive(Debug, Clone)]
pub struct MosaResult<C> {
    /// Deduplicated archive solutions, in goal order.
    pub solutions: Vec<C>,

    /// Archived chromosome per goal (`None` = uncovered).
    pub records: Vec<Option<C>>,

    /// Covered goals in id order.
    pub covered_goals: Vec<GoalId>,

    /// Number of goals.
    pub total_goals: usize,

    /// Fraction of goals covered.
    pub coverage: f64,

    /// Generations executed after initialization.
    pub iterations: usize,

    /// Why the run ended.
    pub termination: Termination,

    /// Coverage after initialization and after each generation.
    pub coverage_history: Vec<f64>,
}

impl<C> MosaResult<C> {
    /// Hands the archive solutions to `emitter`.
    pub fn emit<E: Emitter<C>>(&self, emitter: &mut E) -> E::Output {
        emitter.emit(&self.solutions)
    }
}

/// Step-by-step many-objective search.
///
/// Composed of a problem, a crossover policy and a stopping condition.
/// Selection and breeding rates come from [`MosaConfig`]. A single
/// seeded `StdRng` drives every random decision, so a fixed seed
/// reproduces a run exactly.
pub struct MosaSearch<'p, P, X, S>
where
    P: MosaProblem,
{
    problem: &'p P,
    config: MosaConfig,
    crossover: X,
    stopping: S,
    rng: StdRng,
    ids: IdSequence,
    population: Vec<Individual<P::Chromosome>>,
    archive: Archive<P::Chromosome>,
    iteration: usize,
    state: SearchState,
    started: Instant,
    coverage_history: Vec<f64>,
}

impl<'p, P, X, S> MosaSearch<'p, P, X, S>
where
    P: MosaProblem,
    X: Crossover<P::Chromosome>,
    S: StoppingCondition,
{
    /// Creates a search in the `Initializing` state.
    ///
    /// # Errors
    /// [`MosaError::InvalidConfig`](super::MosaError::InvalidConfig) if
    /// the configuration does not validate.
    pub fn new(problem: &'p P, config: MosaConfig, crossover: X, stopping: S) -> Result<Self> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed.unwrap_or_else(rand::random));
        let goal_count = problem.fitness_functions().len();
        Ok(Self {
            problem,
            population: Vec::with_capacity(config.population_size * 2),
            config,
            crossover,
            stopping,
            rng,
            ids: IdSequence::new(),
            archive: Archive::new(goal_count),
            iteration: 0,
            state: SearchState::Initializing,
            started: Instant::now(),
            coverage_history: Vec::new(),
        })
    }

    /// Current state.
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Generations completed.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Current population.
    pub fn population(&self) -> &[Individual<P::Chromosome>] {
        &self.population
    }

    /// Current archive.
    pub fn archive(&self) -> &Archive<P::Chromosome> {
        &self.archive
    }

    /// Advances the state machine by one transition.
    ///
    /// `Initializing` builds and evaluates the first population;
    /// `Evolving` runs one generation unless termination is due; `Done`
    /// does nothing.
    ///
    /// # Errors
    /// Any fitness evaluation failure. The search should be abandoned.
    pub fn step(&mut self) -> Result<SearchState> {
        self.state = match self.state {
            SearchState::Initializing => {
                self.initialize()?;
                self.next_state()
            }
            SearchState::Evolving => match self.termination() {
                Some(termination) => SearchState::Done(termination),
                None => {
                    self.evolve()?;
                    self.next_state()
                }
            },
            done @ SearchState::Done(_) => done,
        };
        Ok(self.state)
    }

    /// Runs to completion.
    ///
    /// # Errors
    /// Any fitness evaluation failure aborts the run.
    pub fn run(mut self) -> Result<MosaResult<P::Chromosome>> {
        loop {
            if let SearchState::Done(termination) = self.step()? {
                info!(
                    "Search finished after {} generations: {:?}, coverage {:.5}",
                    self.iteration,
                    termination,
                    self.archive.coverage()
                );
                return Ok(self.into_result(termination));
            }
        }
    }

    fn next_state(&self) -> SearchState {
        match self.termination() {
            Some(termination) => SearchState::Done(termination),
            None => SearchState::Evolving,
        }
    }

    fn termination(&self) -> Option<Termination> {
        if self.archive.all_covered() {
            return Some(Termination::AllGoalsCovered);
        }
        let status = SearchStatus {
            iteration: self.iteration,
            elapsed: self.started.elapsed(),
            covered_goals: self.archive.covered_goals().len(),
            total_goals: self.archive.goal_count(),
        };
        self.stopping
            .is_fulfilled(&status)
            .then_some(Termination::BudgetExhausted)
    }

    fn initialize(&mut self) -> Result<()> {
        self.started = Instant::now();
        let mut population: Vec<Individual<P::Chromosome>> = (0..self.config.population_size)
            .map(|_| {
                let chromosome = self.problem.create_chromosome(&mut self.rng);
                Individual::new(self.ids.next_id(), chromosome)
            })
            .collect();

        evaluate_population(
            self.problem.fitness_functions(),
            &mut population,
            self.config.parallel,
        )?;
        self.archive.update(&population)?;
        self.population = truncate(
            population,
            self.config.population_size,
            self.archive.uncovered_goals(),
        );
        self.coverage_history.push(self.archive.coverage());

        info!(
            "Initial population: {} individuals, {} of {} goals covered",
            self.population.len(),
            self.archive.covered_goals().len(),
            self.archive.goal_count()
        );
        Ok(())
    }

    fn evolve(&mut self) -> Result<()> {
        let mut offspring = self.breed_next_generation()?;
        evaluate_population(
            self.problem.fitness_functions(),
            &mut offspring,
            self.config.parallel,
        )?;
        self.archive.update(&offspring)?;

        let mut union = std::mem::take(&mut self.population);
        union.append(&mut offspring);
        self.population = truncate(
            union,
            self.config.population_size,
            self.archive.uncovered_goals(),
        );

        self.iteration += 1;
        let coverage = self.archive.coverage();
        self.coverage_history.push(coverage);
        info!("Generation: {:5}. Coverage: {:.5}", self.iteration, coverage);

        let best = non_dominated(&self.population, self.archive.uncovered_goals());
        let solutions = self.archive.solutions();
        self.problem.on_generation(&GenerationProgress {
            iteration: self.iteration,
            coverage,
            covered_goals: self.archive.covered_goals().len(),
            total_goals: self.archive.goal_count(),
            best: best.iter().map(|ind| ind.chromosome()).collect(),
            solutions: solutions.iter().map(|ind| ind.chromosome()).collect(),
        });
        Ok(())
    }

    /// Breeds offspring from the current population plus random injection.
    ///
    /// Every returned individual is viable: changed and non-empty.
    fn breed_next_generation(&mut self) -> Result<Vec<Individual<P::Chromosome>>> {
        let mut offspring = Vec::with_capacity(self.config.population_size * 2);

        for _ in 0..self.config.population_size / 2 {
            let p1 = self.config.selection.select(&self.population, &mut self.rng)?;
            let p2 = self.config.selection.select(&self.population, &mut self.rng)?;
            let mut child1 = self.population[p1].offspring(self.ids.next_id());
            let mut child2 = self.population[p2].offspring(self.ids.next_id());

            if self.rng.random_range(0.0..1.0) < self.config.crossover_rate {
                if let Err(failure) = self.crossover.cross_over(
                    child1.chromosome_mut(),
                    child2.chromosome_mut(),
                    &mut self.rng,
                ) {
                    debug!("Crossover failed: {failure}");
                    continue;
                }
            }

            for mut child in [child1, child2] {
                mutate_with_retry(&mut child, &mut self.rng);
                if child.is_viable() {
                    offspring.push(child);
                }
            }
        }

        for _ in 0..self.config.insertions_per_generation() {
            offspring.extend(self.random_candidate());
        }

        debug!("Number of offspring = {}", offspring.len());
        Ok(offspring)
    }

    /// One injected individual: a fresh chromosome while nothing is
    /// covered, otherwise a fresh one or a mutated archive solution with
    /// equal odds. `None` if the result is not viable.
    fn random_candidate(&mut self) -> Option<Individual<P::Chromosome>> {
        let fresh = self.archive.covered_goals().is_empty() || self.rng.random_bool(0.5);
        let candidate = if fresh {
            let chromosome = self.problem.create_chromosome(&mut self.rng);
            Some(Individual::new(self.ids.next_id(), chromosome))
        } else {
            let solutions = self.archive.solutions();
            solutions.choose(&mut self.rng).map(|source| {
                let mut clone = source.offspring(self.ids.next_id());
                clone.mutate(&mut self.rng);
                clone
            })
        };
        candidate.filter(Individual::is_viable)
    }

    fn into_result(self, termination: Termination) -> MosaResult<P::Chromosome> {
        let solutions = self
            .archive
            .solutions()
            .into_iter()
            .map(|ind| ind.chromosome().clone())
            .collect();
        let records = (0..self.archive.goal_count())
            .map(|g| self.archive.record(GoalId(g)).map(|ind| ind.chromosome().clone()))
            .collect();
        MosaResult {
            solutions,
            records,
            covered_goals: self.archive.covered_goals().iter().copied().collect(),
            total_goals: self.archive.goal_count(),
            coverage: self.archive.coverage(),
            iterations: self.iteration,
            termination,
            coverage_history: self.coverage_history,
        }
    }
}

/// Executes a search with the default crossover and the configured budget.
///
/// # Usage
///
/// ```ignore
/// let problem = MyModuleUnderTest::new();
/// let config = MosaConfig::default().with_seed(42);
/// let result = MosaRunner::run(&problem, &config)?;
/// println!("Coverage: {:.2}", result.coverage);
/// ```
pub struct MosaRunner;

impl MosaRunner {
    /// Runs the search until all goals are covered or the budget is spent.
    ///
    /// # Errors
    /// Invalid configuration or a fitness evaluation failure.
    pub fn run<P: MosaProblem>(
        problem: &P,
        config: &MosaConfig,
    ) -> Result<MosaResult<P::Chromosome>> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs the search with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the search
    /// stops before the next generation and returns the archive as it is.
    pub fn run_with_cancel<P: MosaProblem>(
        problem: &P,
        config: &MosaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<MosaResult<P::Chromosome>> {
        let crossover = SinglePointRelativeCrossover::new(config.max_chromosome_size);
        let mut budget = config.budget();
        if let Some(flag) = cancel {
            budget = budget.or(CancelFlag::new(flag));
        }
        MosaSearch::new(problem, config.clone(), crossover, budget)?.run()
    }
}

/// Mutates once, and once more if the first attempt changed nothing.
fn mutate_with_retry<C: Chromosome, R: Rng>(individual: &mut Individual<C>, rng: &mut R) {
    individual.mutate(rng);
    if !individual.has_changed() {
        individual.mutate(rng);
    }
}

/// Evaluates every individual whose fitness cache is stale.
///
/// With `parallel`, individuals are spread across the rayon pool. Each
/// worker only touches its own individual.
#[cfg(feature = "parallel")]
fn evaluate_population<C: Chromosome>(
    goals: &[Box<dyn FitnessFunction<C>>],
    population: &mut [Individual<C>],
    parallel: bool,
) -> Result<()> {
    if !parallel {
        return evaluate_sequential(goals, population);
    }
    population
        .par_iter_mut()
        .filter(|ind| !ind.is_evaluated())
        .try_for_each(|ind| ind.evaluate(goals))
}

#[cfg(not(feature = "parallel"))]
fn evaluate_population<C: Chromosome>(
    goals: &[Box<dyn FitnessFunction<C>>],
    population: &mut [Individual<C>],
    _parallel: bool,
) -> Result<()> {
    evaluate_sequential(goals, population)
}

fn evaluate_sequential<C: Chromosome>(
    goals: &[Box<dyn FitnessFunction<C>>],
    population: &mut [Individual<C>],
) -> Result<()> {
    for ind in population.iter_mut().filter(|ind| !ind.is_evaluated()) {
        ind.evaluate(goals)?;
    }
    Ok(())
}

/// Keeps the best `capacity` individuals by non-domination rank on the
/// uncovered goals.
///
/// Whole fronts are taken while they fit. The front that overflows is
/// cut by crowding distance (larger first), then smaller size, then lower
/// id. Survivors carry their rank and crowding distance.
fn truncate<C: Chromosome>(
    union: Vec<Individual<C>>,
    capacity: usize,
    goals: &[GoalId],
) -> Vec<Individual<C>> {
    let objectives = objective_matrix(&union, goals);
    let sorted = non_dominated_sort(&objectives);
    let keys: Vec<(usize, u64)> = union.iter().map(|ind| (ind.size(), ind.id())).collect();
    let mut slots: Vec<Option<Individual<C>>> = union.into_iter().map(Some).collect();
    let mut survivors = Vec::with_capacity(capacity);

    for (rank, front) in sorted.fronts.iter().enumerate() {
        let remaining = capacity - survivors.len();
        if remaining == 0 {
            break;
        }

        let front_objectives: Vec<Vec<f64>> =
            front.iter().map(|&i| objectives[i].clone()).collect();
        let distances = crowding_distance(&front_objectives);

        let mut order: Vec<usize> = (0..front.len()).collect();
        if front.len() > remaining {
            order.sort_by(|&a, &b| {
                distances[b]
                    .partial_cmp(&distances[a])
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| keys[front[a]].cmp(&keys[front[b]]))
            });
            order.truncate(remaining);
        }

        for k in order {
            if let Some(mut ind) = slots[front[k]].take() {
                ind.set_ranking(rank, distances[k]);
                survivors.push(ind);
            }
        }
    }

    survivors
}

// ============================================================================
// Tests
// ============================================================================
