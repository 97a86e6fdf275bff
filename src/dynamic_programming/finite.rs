//! Backward induction over a fixed horizon.
//!
//! `values` has `N + 1` rows, row `t` holding the optimal expected value of
//! each state at stage `t`; row `N` is the terminal boundary condition.
//! `policy` has `N` rows because the terminal stage carries no decision.
use std::convert::TryFrom;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SolveError};
use super::bellman;
use super::model::{check_state_vector, Model};
use super::observer::{Observer, Progress, Silent};

/// Number of decision stages. Negative horizons are rejected when converting
/// from a signed integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon(usize);

impl Horizon {
    pub fn stages(self) -> usize {
        self.0
    }
}

impl From<usize> for Horizon {
    fn from(n: usize) -> Self {
        Horizon(n)
    }
}

impl TryFrom<i64> for Horizon {
    type Error = SolveError;

    fn try_from(n: i64) -> Result<Horizon> {
        usize::try_from(n).map(Horizon).map_err(|_| SolveError::InvalidHorizon(n))
    }
}

/// Boundary condition at the end of the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalValue {
    Zeros,
    Fixed(Vec<f64>),
    /// `baseline + max_a r(i, a)`: one greedy step, no continuation.
    OneStep { baseline: f64 },
}

impl Default for TerminalValue {
    fn default() -> Self {
        TerminalValue::Zeros
    }
}

impl TerminalValue {
    pub fn resolve(&self, model: &Model) -> Result<Vec<f64>> {
        match self {
            TerminalValue::Zeros => Ok(vec![0.0; model.n_states()]),
            TerminalValue::Fixed(v) => {
                check_state_vector("terminal value", model, v)?;
                Ok(v.clone())
            }
            TerminalValue::OneStep { baseline } => {
                let rewards = model.expected_reward_matrix();
                Ok(rewards
                    .outer_iter()
                    .map(|row| baseline + row.iter().cloned().fold(f64::NEG_INFINITY, f64::max))
                    .collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FiniteSolution {
    values: Array2<f64>,
    policy: Array2<usize>,
}

impl FiniteSolution {
    pub fn horizon(&self) -> usize {
        self.policy.nrows()
    }

    /// `(N + 1) x S`
    pub fn values(&self) -> ArrayView2<f64> {
        self.values.view()
    }

    /// `N x S`
    pub fn policy(&self) -> ArrayView2<usize> {
        self.policy.view()
    }

    pub fn value(&self, stage: usize, state: usize) -> f64 {
        self.values[[stage, state]]
    }

    pub fn action(&self, stage: usize, state: usize) -> usize {
        self.policy[[stage, state]]
    }

    pub fn stage_values(&self, stage: usize) -> ArrayView1<f64> {
        self.values.row(stage)
    }

    pub fn stage_policy(&self, stage: usize) -> ArrayView1<usize> {
        self.policy.row(stage)
    }

    /// The per-state actions when every stage prescribes the same ones.
    pub fn stationary_policy(&self) -> Option<Array1<usize>> {
        let first = self.policy.outer_iter().next()?;
        if self.policy.outer_iter().all(|row| row == first) {
            Some(first.to_owned())
        } else {
            None
        }
    }

    pub fn into_tables(self) -> (Array2<f64>, Array2<usize>) {
        (self.values, self.policy)
    }
}

pub fn solve_finite(model: &Model, horizon: impl Into<Horizon>, terminal: &[f64]) -> Result<FiniteSolution> {
    solve_finite_with(model, horizon, terminal, &mut Silent)
}

/// Backward induction reporting each computed stage to `observer`.
pub fn solve_finite_with<O>(model: &Model, horizon: impl Into<Horizon>, terminal: &[f64], observer: &mut O) -> Result<FiniteSolution>
where
    O: Observer + ?Sized,
{
    check_state_vector("terminal value", model, terminal)?;
    let n = horizon.into().stages();
    let terminal_bound = terminal.iter().fold(0f64, |m, v| m.max(v.abs()));
    if !(n as f64 * model.reward_bound() + terminal_bound).is_finite() {
        return Err(SolveError::NonFinite { what: "value bound", index: Vec::new() });
    }
    let rewards = model.expected_reward_matrix();

    let mut values = Array2::<f64>::zeros((n + 1, model.n_states()));
    let mut policy = Array2::<usize>::zeros((n, model.n_states()));
    values.row_mut(n).assign(&ArrayView1::from(terminal));

    for t in (0..n).rev() {
        let (stage_values, stage_policy) = bellman::backup(model, &rewards, values.row(t + 1), 1.0)?;
        values.row_mut(t).assign(&stage_values);
        policy.row_mut(t).assign(&stage_policy);
        debug!(stage = t, "backward induction stage computed");
        observer.observe(&Progress {
            step: t,
            values: values.row(t),
            policy: policy.row(t),
            delta: None,
        });
    }
    info!(horizon = n, states = model.n_states(), actions = model.n_actions(), "backward induction finished");
    Ok(FiniteSolution { values, policy })
}
