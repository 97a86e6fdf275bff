//! Numeric helpers shared by both solvers.
//!
//! `backup` is one synchronous application of the Bellman optimality
//! operator: every entry of the returned vector is computed from the frozen
//! `continuation` vector, never from a partially updated one.
use ndarray::{Array1, Array2, ArrayView1};
use ordered_float::NotNan;

use crate::error::{Result, SolveError};
use super::model::{finite_entry, Model};

/// Probability-weighted expectation of `values` under one transition row.
pub fn expectation(row: ArrayView1<f64>, values: ArrayView1<f64>) -> f64 {
    row.dot(&values)
}

/// Max and arg-max of `q`, `None` when `q` is empty. Exact ties go to the
/// lowest index.
pub fn greedy(q: &[NotNan<f64>]) -> Option<(NotNan<f64>, usize)> {
    let mut iter = q.iter().copied().enumerate();
    let (first, v0) = iter.next()?;
    Some(iter.fold((v0, first), |best, (a, v)| if v > best.0 { (v, a) } else { best }))
}

/// `Q(state, a) = r(state, a) + discount * sum_j P(a, state, j) * continuation[j]`
/// written into `out`, one entry per action.
pub fn fill_q_values(model: &Model, rewards: &Array2<f64>, state: usize, continuation: ArrayView1<f64>, discount: f64, out: &mut [f64]) {
    for (a, q) in out.iter_mut().enumerate() {
        *q = rewards[[state, a]] + discount * expectation(model.transition_row(a, state), continuation);
    }
}

pub fn q_values(model: &Model, rewards: &Array2<f64>, state: usize, continuation: ArrayView1<f64>, discount: f64) -> Vec<f64> {
    let mut q = vec![0.0; model.n_actions()];
    fill_q_values(model, rewards, state, continuation, discount, &mut q);
    q
}

/// One synchronous sweep over all states. Returns the new values and the
/// greedy action of every state, produced together.
///
/// Fails with `NonFinite { what: "q values", index: [state, action] }` once a
/// Q value overflows.
pub fn backup(
    model: &Model,
    rewards: &Array2<f64>,
    continuation: ArrayView1<f64>,
    discount: f64,
) -> Result<(Array1<f64>, Array1<usize>)> {
    let (n_states, n_actions) = (model.n_states(), model.n_actions());
    let mut values = Array1::<f64>::zeros(n_states);
    let mut policy = Array1::<usize>::zeros(n_states);
    let mut q = vec![0.0; n_actions];
    let mut checked = Vec::with_capacity(n_actions);
    for i in 0..n_states {
        fill_q_values(model, rewards, i, continuation, discount, &mut q);
        checked.clear();
        for (a, &v) in q.iter().enumerate() {
            checked.push(finite_entry("q values", &[i, a], v)?);
        }
        let (v, a) = greedy(&checked).ok_or(SolveError::EmptyModel { states: n_states, actions: n_actions })?;
        values[i] = v.into_inner();
        policy[i] = a;
    }
    Ok((values, policy))
}

/// `max_i |b[i] - a[i]|`, NaN if any difference is NaN.
pub fn sup_norm_diff(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    let c: Array1<f64> = &b - &a;
    c.iter().fold(0f64, |m, d| if m.is_nan() || d.is_nan() { f64::NAN } else { m.max(d.abs()) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic_programming::reward::RewardModel;
    use ndarray::{arr1, arr2, Array3};

    fn not_nan(q: &[f64]) -> Vec<NotNan<f64>> {
        q.iter().map(|&x| NotNan::new(x).unwrap()).collect()
    }

    #[test]
    fn greedy_prefers_lowest_index_on_ties() {
        let best = |q: &[f64]| greedy(&not_nan(q)).map(|(v, a)| (v.into_inner(), a));
        assert_eq!(best(&[1.0, 3.0, 3.0, 2.0]), Some((3.0, 1)));
        assert_eq!(best(&[0.0, 0.0]), Some((0.0, 0)));
        assert_eq!(best(&[-2.0]), Some((-2.0, 0)));
        assert_eq!(best(&[]), None);
    }

    #[test]
    fn sup_norm_propagates_nan() {
        let a = arr1(&[0.0, 1.0]);
        let b = arr1(&[f64::NAN, 1.0]);
        assert!(sup_norm_diff(a.view(), b.view()).is_nan());
        assert!(sup_norm_diff(b.view(), a.view()).is_nan());
        let inf = arr1(&[f64::INFINITY, 1.0]);
        assert!(sup_norm_diff(inf.view(), inf.view()).is_nan());
    }

    #[test]
    fn backup_rejects_overflowing_q_values() {
        let mut p = Array3::zeros((1, 2, 2));
        p[[0, 0, 1]] = 1.0;
        p[[0, 1, 1]] = 1.0;
        let model = Model::unlabelled(p, RewardModel::PerAction(arr2(&[[1e308], [0.0]]))).unwrap();
        let rewards = model.expected_reward_matrix();
        let err = backup(&model, &rewards, arr1(&[0.0, 1e308]).view(), 1.0).unwrap_err();
        match err {
            SolveError::NonFinite { what, index } => {
                assert_eq!(what, "q values");
                assert_eq!(index, vec![0, 0]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn sup_norm_is_symmetric_max_abs() {
        let a = arr1(&[1.0, -2.0, 0.5]);
        let b = arr1(&[1.5, 1.0, 0.5]);
        assert_eq!(sup_norm_diff(a.view(), b.view()), 3.0);
        assert_eq!(sup_norm_diff(b.view(), a.view()), 3.0);
    }

    #[test]
    fn backup_reads_only_the_frozen_vector() {
        // s0 -> s1 under the only action; s1 absorbing
        let mut p = Array3::zeros((1, 2, 2));
        p[[0, 0, 1]] = 1.0;
        p[[0, 1, 1]] = 1.0;
        let model = Model::unlabelled(p, RewardModel::PerAction(arr2(&[[1.0], [2.0]]))).unwrap();
        let rewards = model.expected_reward_matrix();
        let (v, pi) = backup(&model, &rewards, arr1(&[0.0, 0.0]).view(), 1.0).unwrap();
        // s0 must see continuation[1] == 0, not the freshly computed 2.0
        assert_eq!(v, arr1(&[1.0, 2.0]));
        assert_eq!(pi, arr1(&[0, 0]));
    }

    #[test]
    fn q_values_apply_discount_to_continuation_only() {
        let mut p = Array3::zeros((2, 1, 1));
        p[[0, 0, 0]] = 1.0;
        p[[1, 0, 0]] = 1.0;
        let model = Model::unlabelled(p, RewardModel::PerAction(arr2(&[[1.0, 0.5]]))).unwrap();
        let rewards = model.expected_reward_matrix();
        let q = q_values(&model, &rewards, 0, arr1(&[10.0]).view(), 0.5);
        assert_eq!(q, vec![6.0, 5.5]);
    }
}
