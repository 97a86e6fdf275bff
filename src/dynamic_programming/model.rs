use itertools::Itertools;
use ndarray::{s, Array2, Array3, ArrayView1, ArrayView3};
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolveError};
use super::reward::{RewardModel, RewardSpec};

/// Tolerance on the sum of every transition row.
pub const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// A fully enumerated MDP: labelled states and actions, a transition tensor
/// `[A][S][S]` and a reward model. Validated once at construction and never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct Model {
    states: Vec<String>,
    actions: Vec<String>,
    transitions: Array3<f64>,
    rewards: RewardModel,
}

impl Model {
    pub fn new(states: Vec<String>, actions: Vec<String>, transitions: Array3<f64>, rewards: RewardModel) -> Result<Model> {
        let (n_states, n_actions) = (states.len(), actions.len());
        if n_states == 0 || n_actions == 0 {
            return Err(SolveError::EmptyModel { states: n_states, actions: n_actions });
        }
        if transitions.dim() != (n_actions, n_states, n_states) {
            return Err(SolveError::shape(
                "transition tensor",
                format!("{:?}", (n_actions, n_states, n_states)),
                format!("{:?}", transitions.dim()),
            ));
        }
        for (a, i) in (0..n_actions).cartesian_product(0..n_states) {
            let row = transitions.slice(s![a, i, ..]);
            for (j, &p) in row.iter().enumerate() {
                finite_entry("transitions", &[a, i, j], p)?;
            }
            let sum: f64 = row.sum();
            if row.iter().any(|&p| p < 0.0) || (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(SolveError::ProbabilityRowInvalid { action: a, state: i, sum });
            }
        }
        rewards.validate(n_states, n_actions)?;
        Ok(Model { states, actions, transitions, rewards })
    }

    /// Model with generated labels `s0..`, `a0..`.
    pub fn unlabelled(transitions: Array3<f64>, rewards: RewardModel) -> Result<Model> {
        let (n_actions, n_states, _) = transitions.dim();
        let states = (0..n_states).map(|i| format!("s{}", i)).collect();
        let actions = (0..n_actions).map(|a| format!("a{}", a)).collect();
        Model::new(states, actions, transitions, rewards)
    }

    /// Builds a model from the sparse JSON description.
    pub fn from_spec(spec: ModelSpec) -> Result<Model> {
        let (n_states, n_actions) = (spec.states.len(), spec.actions.len());
        let mut transitions = Array3::<f64>::zeros((n_actions, n_states, n_states));
        for t in spec.transitions.iter() {
            if t.a >= n_actions || t.s >= n_states {
                return Err(SolveError::shape(
                    "transition source",
                    format!("action < {}, state < {}", n_actions, n_states),
                    format!("action {}, state {}", t.a, t.s),
                ));
            }
            for sprime in t.s_prime.iter() {
                if sprime.s >= n_states {
                    return Err(SolveError::shape("transition destination", format!("< {}", n_states), sprime.s));
                }
                transitions[[t.a, t.s, sprime.s]] += sprime.p;
            }
        }
        let rewards = spec.rewards.into_model(n_states, n_actions)?;
        Model::new(spec.states, spec.actions, transitions, rewards)
    }

    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    pub fn n_actions(&self) -> usize {
        self.actions.len()
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn state_label(&self, state: usize) -> Option<&str> {
        self.states.get(state).map(String::as_str)
    }

    pub fn action_label(&self, action: usize) -> Option<&str> {
        self.actions.get(action).map(String::as_str)
    }

    pub fn transitions(&self) -> ArrayView3<f64> {
        self.transitions.view()
    }

    /// Distribution over next states for `action` taken in `state`.
    pub fn transition_row(&self, action: usize, state: usize) -> ArrayView1<f64> {
        self.transitions.slice(s![action, state, ..])
    }

    pub fn rewards(&self) -> &RewardModel {
        &self.rewards
    }

    pub fn expected_immediate_reward(&self, state: usize, action: usize) -> f64 {
        self.rewards.expected_immediate_reward(state, action, self.transition_row(action, state))
    }

    /// `[S][A]` table of expected immediate rewards, computed once per solve.
    pub fn expected_reward_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.n_states(), self.n_actions()), |(i, a)| self.expected_immediate_reward(i, a))
    }

    /// Largest absolute expected immediate reward.
    pub fn reward_bound(&self) -> f64 {
        self.expected_reward_matrix().iter().fold(0f64, |m, r| m.max(r.abs()))
    }
}

/// Serialisable description of a model, transitions listed sparsely per
/// (state, action) pair. Rows that are never listed stay zero and are
/// rejected by validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub states: Vec<String>,
    pub actions: Vec<String>,
    pub transitions: Vec<TransitionSpec>,
    pub rewards: RewardSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub s: usize,
    pub a: usize,
    pub s_prime: Vec<TransitionPair>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionPair {
    pub s: usize,
    pub p: f64,
}

pub(crate) fn finite_entry(what: &'static str, index: &[usize], x: f64) -> Result<NotNan<f64>> {
    match NotNan::new(x) {
        Ok(v) if x.is_finite() => Ok(v),
        _ => Err(SolveError::NonFinite { what, index: index.to_vec() }),
    }
}

/// Rejects vectors that are the wrong length or hold NaN/infinite entries.
pub(crate) fn check_state_vector(what: &'static str, model: &Model, values: &[f64]) -> Result<()> {
    if values.len() != model.n_states() {
        return Err(SolveError::shape(what, model.n_states(), values.len()));
    }
    for (i, &v) in values.iter().enumerate() {
        finite_entry(what, &[i], v)?;
    }
    Ok(())
}
