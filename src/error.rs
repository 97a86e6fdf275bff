//! Error types for model construction and solving.

use thiserror::Error;

/// Result type for solver operations.
pub type Result<T> = std::result::Result<T, SolveError>;

/// Errors raised while building a model or running a solver.
///
/// Everything except `NonConvergence` is detected before the recursion or
/// iteration starts.
#[derive(Error, Debug)]
pub enum SolveError {
    /// A tensor or vector does not have the dimensions declared by the model.
    #[error("shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: String,
        found: String,
    },

    /// The model has no states or no actions.
    #[error("model must declare at least one state and one action (states: {states}, actions: {actions})")]
    EmptyModel { states: usize, actions: usize },

    /// A transition row is not a probability distribution.
    #[error("transition row for action {action}, state {state} is not a distribution (sum {sum})")]
    ProbabilityRowInvalid { action: usize, state: usize, sum: f64 },

    /// A NaN or infinite entry in an input table.
    #[error("non-finite value in {what} at index {index:?}")]
    NonFinite { what: &'static str, index: Vec<usize> },

    #[error("horizon must be non-negative, got {0}")]
    InvalidHorizon(i64),

    #[error("discount factor must lie in [0, 1), got {0}")]
    InvalidDiscount(f64),

    #[error("convergence threshold must be positive, got {0}")]
    InvalidThreshold(f64),

    #[error("max_iterations must be at least 1")]
    InvalidIterationCap,

    /// Value iteration stopped at the iteration cap.
    #[error("value iteration did not converge after {iterations} sweeps (last delta {delta:e})")]
    NonConvergence { iterations: usize, delta: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SolveError {
    pub(crate) fn shape(what: &'static str, expected: impl ToString, found: impl ToString) -> Self {
        SolveError::ShapeMismatch {
            what,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// True for errors the caller can recover from by accepting the
    /// approximate result or retrying with a larger iteration cap.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SolveError::NonConvergence { .. })
    }
}
