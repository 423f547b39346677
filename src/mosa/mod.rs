//! Many-objective search for test generation.
//!
//! Every coverage goal is a separate objective. The engine keeps a
//! population under non-dominated sorting restricted to the goals that
//! are still uncovered, and an [`Archive`] with the smallest covering
//! test case per goal. Users plug in their test case representation by
//! implementing [`Chromosome`] and [`MosaProblem`].
//!
//! # Core Traits
//!
//! - [`Chromosome`]: Opaque candidate with clone / mutate / crossover / size
//! - [`FitnessFunction`]: Distance of a candidate to one goal (0 = covered)
//! - [`MosaProblem`]: Chromosome factory, goal list, progress sink
//! - [`Crossover`], [`StoppingCondition`]: Breeding and termination policies
//!
//! # Key Types
//!
//! - [`MosaConfig`]: Population size, rates, budget, seed
//! - [`MosaSearch`]: The generational state machine
//! - [`MosaRunner`]: One-call entry point with default policies
//! - [`MosaResult`]: Archive solutions, coverage and termination reason
//!
//! # Submodules
//!
//! - [`multi_objective`]: Dominance comparison, non-dominated sorting, crowding distance
//!
//! # References
//!
//! - Panichella, Kifetew & Tonella (2015), "Reformulating Branch Coverage as a
//!   Many-Objective Optimization Problem"
//! - Deb et al. (2002), *A Fast and Elitist Multiobjective GA: NSGA-II*

mod archive;
mod config;
mod crossover;
mod error;
mod individual;
pub mod multi_objective;
mod runner;
mod selection;
mod stopping;
mod types;

pub use archive::Archive;
pub use config::MosaConfig;
pub use crossover::{Crossover, SinglePointRelativeCrossover};
pub use error::{ConstructionFailure, EvaluationError, MosaError, Result};
pub use individual::{IdSequence, Individual};
pub use multi_objective::{Dominance, DominanceComparator};
pub use runner::{MosaResult, MosaRunner, MosaSearch, SearchState, Termination};
pub use selection::{crowded_cmp, Selection};
pub use stopping::{
    AnyOf, CancelFlag, MaxIterations, MaxTime, SearchStatus, StoppingCondition, Unbounded,
};
pub use types::{
    Chromosome, FitnessFunction, FnFitness, GenerationProgress, GoalId, MosaProblem,
};
