//! Hand-off of archive solutions to an emitter.
//!
//! The search ends with a deduplicated set of chromosomes. Turning them
//! into source code is the job of an [`Emitter`]. This module provides
//! the trait plus the assertion-rendering pieces most emitters share:
//!
//! - [`ObservedValue`]: Closed set of value kinds an assertion can check
//! - [`EmissionSession`]: Per-run naming state (`var_N`, `obj_N`)
//! - [`AssertionEmitter`]: Renders one block of assertions per solution

mod session;
mod value;

pub use session::EmissionSession;
pub use value::{Assertion, Collection, ObservedValue};

/// Consumes the solutions of a finished search.
pub trait Emitter<C> {
    /// What the emitter produces.
    type Output;

    /// Emits all solutions of one run.
    fn emit(&mut self, solutions: &[C]) -> Self::Output;
}

/// Emitter that renders the assertions observed on each solution.
///
/// `observe` supplies the assertions for one chromosome. Every call to
/// [`Emitter::emit`] uses a fresh [`EmissionSession`], so names never
/// leak from one run into the next.
///
/// ```
/// use u_mosa::emit::{Assertion, AssertionEmitter, Emitter, ObservedValue};
///
/// let mut emitter = AssertionEmitter::new(|n: &i64| {
///     vec![Assertion::Value { source: 0, value: ObservedValue::Int(*n) }]
/// });
/// let blocks = emitter.emit(&[3i64, 4]);
/// assert_eq!(blocks[1], vec!["assert var_0 == 4"]);
/// ```
pub struct AssertionEmitter<F> {
    observe: F,
}

impl<F> AssertionEmitter<F> {
    /// Emitter asking `observe` for the assertions of each solution.
    pub fn new(observe: F) -> Self {
        Self { observe }
    }
}

impl<C, F> Emitter<C> for AssertionEmitter<F>
where
    F: FnMut(&C) -> Vec<Assertion>,
{
    type Output = Vec<Vec<String>>;

    fn emit(&mut self, solutions: &[C]) -> Self::Output {
        let mut session = EmissionSession::new();
        solutions
            .iter()
            .map(|solution| {
                session.begin_test_case();
                (self.observe)(solution)
                    .iter()
                    .flat_map(|assertion| session.render(assertion))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
