//! Error taxonomy for the search engine.
//!
//! Two kinds of failure exist. [`ConstructionFailure`] is local: a
//! breeding operator could not build a valid offspring, so the engine
//! drops that offspring and moves on. Everything else surfaces as a
//! [`MosaError`] and aborts the run, because a corrupted fitness signal
//! would invalidate the archive.

use super::types::GoalId;
use thiserror::Error;

/// A breeding operator could not produce a valid offspring.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionFailure {
    /// The offspring would exceed the configured chromosome size bound.
    #[error("offspring size {size} exceeds maximum chromosome size {max}")]
    SizeExceeded { size: usize, max: usize },

    /// The two parents cannot be recombined at the requested positions.
    #[error("incompatible parents: {0}")]
    Incompatible(String),

    /// The chromosome type does not implement recombination.
    #[error("chromosome does not support crossover")]
    Unsupported,
}

/// A fitness function could not produce a value for a candidate.
///
/// Fitness functions usually wrap an executor that runs the candidate
/// against the subject program; any failure there is reported through
/// this type.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct EvaluationError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl EvaluationError {
    /// Creates an error with a plain message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error that wraps an underlying cause.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Unrecoverable errors raised by the search engine.
#[derive(Debug, Error)]
pub enum MosaError {
    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A fitness function failed.
    #[error("fitness evaluation failed for goal {goal}: {source}")]
    Evaluation {
        goal: GoalId,
        #[source]
        source: EvaluationError,
    },

    /// A fitness function returned NaN or a negative value.
    #[error("goal {goal} produced invalid fitness {value}")]
    InvalidFitness { goal: GoalId, value: f64 },

    /// Selection was asked to pick from an empty population.
    #[error("cannot select from an empty population")]
    EmptyPopulation,

    /// An individual reached the archive before being evaluated.
    #[error("individual {0} has not been evaluated")]
    NotEvaluated(u64),

    /// An individual carries fitness values for a different goal set.
    #[error("expected fitness for {expected} goals, found {actual}")]
    GoalCountMismatch { expected: usize, actual: usize },
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, MosaError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_evaluation_error_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "executor timed out");
        let err = MosaError::Evaluation {
            goal: GoalId(3),
            source: EvaluationError::with_source("execution aborted", io),
        };

        assert_eq!(
            err.to_string(),
            "fitness evaluation failed for goal 3: execution aborted"
        );
        let eval = err.source().expect("evaluation error is the source");
        let io = eval.source().expect("io error is the root cause");
        assert_eq!(io.to_string(), "executor timed out");
    }

    #[test]
    fn test_construction_failure_display() {
        let failure = ConstructionFailure::SizeExceeded { size: 41, max: 40 };
        assert_eq!(
            failure.to_string(),
            "offspring size 41 exceeds maximum chromosome size 40"
        );
    }
}
