use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, SolveError};
use super::bellman;
use super::model::{check_state_vector, Model};
use super::observer::{Observer, Progress, Silent};

pub const DEFAULT_DISCOUNT: f64 = 0.9;
pub const DEFAULT_THRESHOLD: f64 = 1e-6;
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueIterationConfig {
    /// Weight on future reward, in `[0, 1)`.
    pub discount: f64,
    /// Stop once a sweep changes no value by `threshold` or more.
    pub threshold: f64,
    pub max_iterations: usize,
}

impl Default for ValueIterationConfig {
    fn default() -> Self {
        ValueIterationConfig {
            discount: DEFAULT_DISCOUNT,
            threshold: DEFAULT_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl ValueIterationConfig {
    pub fn new(discount: f64, threshold: f64, max_iterations: usize) -> Self {
        ValueIterationConfig { discount, threshold, max_iterations }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.discount) {
            return Err(SolveError::InvalidDiscount(self.discount));
        }
        if !(self.threshold > 0.0) || !self.threshold.is_finite() {
            return Err(SolveError::InvalidThreshold(self.threshold));
        }
        if self.max_iterations == 0 {
            return Err(SolveError::InvalidIterationCap);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfiniteSolution {
    values: Array1<f64>,
    policy: Array1<usize>,
    iterations: usize,
    delta: f64,
    discount: f64,
    converged: bool,
}

impl InfiniteSolution {
    pub fn values(&self) -> ArrayView1<f64> {
        self.values.view()
    }

    /// Greedy action of each state from the final sweep.
    pub fn policy(&self) -> ArrayView1<usize> {
        self.policy.view()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Sup-norm change of the final sweep.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    /// A-posteriori bound on the distance of `values` from the fixed point,
    /// `delta * discount / (1 - discount)`.
    pub fn error_bound(&self) -> f64 {
        self.delta * self.discount / (1.0 - self.discount)
    }

    /// Turns a run that hit the iteration cap into `NonConvergence`.
    pub fn ensure_converged(self) -> Result<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(SolveError::NonConvergence { iterations: self.iterations, delta: self.delta })
        }
    }

    pub fn into_parts(self) -> (Array1<f64>, Array1<usize>) {
        (self.values, self.policy)
    }
}

pub fn solve_infinite(model: &Model, config: &ValueIterationConfig, warm_start: Option<&[f64]>) -> Result<InfiniteSolution> {
    solve_infinite_with(model, config, warm_start, &mut Silent)
}

/// Value iteration with synchronous sweeps, reporting each sweep to `observer`.
///
/// Hitting `max_iterations` is not an error here: the returned solution has
/// `converged() == false` and the caller decides what to do with it.
pub fn solve_infinite_with<O>(
    model: &Model,
    config: &ValueIterationConfig,
    warm_start: Option<&[f64]>,
    observer: &mut O,
) -> Result<InfiniteSolution>
where
    O: Observer + ?Sized,
{
    config.validate()?;
    if !(model.reward_bound() / (1.0 - config.discount)).is_finite() {
        return Err(SolveError::NonFinite { what: "value bound", index: Vec::new() });
    }
    let mut values = match warm_start {
        Some(v) => {
            check_state_vector("warm start", model, v)?;
            Array1::from(v.to_vec())
        }
        None => Array1::zeros(model.n_states()),
    };
    let rewards = model.expected_reward_matrix();
    let mut policy = Array1::<usize>::zeros(model.n_states());
    let mut delta = f64::INFINITY;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        let (next, greedy) = bellman::backup(model, &rewards, values.view(), config.discount)?;
        delta = bellman::sup_norm_diff(values.view(), next.view());
        values = next;
        policy = greedy;
        iterations += 1;
        debug!(iteration = iterations, delta, "value iteration sweep");
        observer.observe(&Progress {
            step: iterations,
            values: values.view(),
            policy: policy.view(),
            delta: Some(delta),
        });
        if delta < config.threshold {
            break;
        }
    }

    let converged = delta < config.threshold;
    if converged {
        info!(iterations, delta, "value iteration converged");
    } else {
        warn!(iterations, delta, threshold = config.threshold, "value iteration hit the iteration cap");
    }
    Ok(InfiniteSolution {
        values,
        policy,
        iterations,
        delta,
        discount: config.discount,
        converged,
    })
}
