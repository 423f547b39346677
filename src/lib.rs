//! Many-objective evolutionary search for automated test generation.
//!
//! Treats every coverage goal as its own objective and evolves a
//! population of candidate test cases toward all of them at once:
//!
//! - **MOSA engine**: Generational search with Pareto dominance over the
//!   still-uncovered goals, NSGA-II style non-dominated truncation, and an
//!   archive keeping the smallest covering test case per goal.
//! - **Emission**: Hand-off of archive solutions to an emitter, with a
//!   per-run naming session and a closed value model for assertions.
//!
//! # Architecture
//!
//! The crate knows nothing about the program under test. Test case
//! representation, execution and coverage measurement are supplied by
//! the consumer through the [`mosa::Chromosome`], [`mosa::FitnessFunction`]
//! and [`mosa::MosaProblem`] traits.

pub mod emit;
pub mod mosa;
