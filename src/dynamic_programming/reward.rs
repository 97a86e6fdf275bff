use ndarray::{s, Array2, Array3, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolveError};
use super::model::finite_entry;

/// Immediate reward structure of a model.
///
/// Both variants answer the same question through
/// [`RewardModel::expected_immediate_reward`]: what does the decision maker
/// expect to earn right now for taking `action` in `state`.
#[derive(Debug, Clone, PartialEq)]
pub enum RewardModel {
    /// `[S][A]`, the reward depends only on the decision made in a state.
    PerAction(Array2<f64>),
    /// `[S][A][S]`, the reward is earned on the transition to a destination.
    PerDestination(Array3<f64>),
}

impl RewardModel {
    /// Expected one-step reward given the transition row `P(action, state, .)`.
    ///
    /// For per-destination rewards this is itself an expectation over the next
    /// state, `sum_j P(a,i,j) * R(i,a,j)`.
    pub fn expected_immediate_reward(&self, state: usize, action: usize, row: ArrayView1<f64>) -> f64 {
        match self {
            RewardModel::PerAction(r) => r[[state, action]],
            RewardModel::PerDestination(r) => row.dot(&r.slice(s![state, action, ..])),
        }
    }

    pub(crate) fn validate(&self, n_states: usize, n_actions: usize) -> Result<()> {
        match self {
            RewardModel::PerAction(r) => {
                if r.dim() != (n_states, n_actions) {
                    return Err(SolveError::shape(
                        "per-action rewards",
                        format!("{:?}", (n_states, n_actions)),
                        format!("{:?}", r.dim()),
                    ));
                }
                for ((i, a), &x) in r.indexed_iter() {
                    finite_entry("rewards", &[i, a], x)?;
                }
            }
            RewardModel::PerDestination(r) => {
                if r.dim() != (n_states, n_actions, n_states) {
                    return Err(SolveError::shape(
                        "per-destination rewards",
                        format!("{:?}", (n_states, n_actions, n_states)),
                        format!("{:?}", r.dim()),
                    ));
                }
                for ((i, a, j), &x) in r.indexed_iter() {
                    finite_entry("rewards", &[i, a, j], x)?;
                }
            }
        }
        Ok(())
    }
}

/// JSON form of the reward table, `{"per_action": ...}` or `{"per_destination": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardSpec {
    PerAction(Vec<Vec<f64>>),
    PerDestination(Vec<Vec<Vec<f64>>>),
}

impl RewardSpec {
    /// Builds the dense table, rejecting ragged input.
    pub fn into_model(self, n_states: usize, n_actions: usize) -> Result<RewardModel> {
        match self {
            RewardSpec::PerAction(rows) => {
                check_len("per-action rewards", n_states, rows.len())?;
                let mut flat = Vec::with_capacity(n_states * n_actions);
                for row in rows {
                    check_len("per-action reward row", n_actions, row.len())?;
                    flat.extend(row);
                }
                let table = Array2::from_shape_vec((n_states, n_actions), flat)
                    .map_err(|e| SolveError::shape("per-action rewards", "[S][A]", e))?;
                Ok(RewardModel::PerAction(table))
            }
            RewardSpec::PerDestination(blocks) => {
                check_len("per-destination rewards", n_states, blocks.len())?;
                let mut flat = Vec::with_capacity(n_states * n_actions * n_states);
                for block in blocks {
                    check_len("per-destination reward block", n_actions, block.len())?;
                    for row in block {
                        check_len("per-destination reward row", n_states, row.len())?;
                        flat.extend(row);
                    }
                }
                let table = Array3::from_shape_vec((n_states, n_actions, n_states), flat)
                    .map_err(|e| SolveError::shape("per-destination rewards", "[S][A][S]", e))?;
                Ok(RewardModel::PerDestination(table))
            }
        }
    }
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(SolveError::shape(what, expected, found))
    }
}
