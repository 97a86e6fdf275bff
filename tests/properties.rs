//! Property-based tests for both solvers.
//!
//! Uses proptest to generate small random models with rewards in [-1, 1].

use markov_dp::dynamic_programming::bellman;
use markov_dp::{solve_finite, solve_infinite, Model, RewardModel, ValueIterationConfig, ROW_SUM_TOLERANCE};
use ndarray::{Array2, Array3, Axis};
use proptest::prelude::*;

fn model_strategy() -> impl Strategy<Value = Model> {
    (1usize..5, 1usize..4, any::<bool>())
        .prop_flat_map(|(s, a, per_destination)| {
            let weights = prop::collection::vec(0.01f64..1.0, a * s * s);
            let n_rewards = if per_destination { s * a * s } else { s * a };
            let rewards = prop::collection::vec(-1.0f64..1.0, n_rewards);
            (Just(s), Just(a), Just(per_destination), weights, rewards)
        })
        .prop_map(|(s, a, per_destination, weights, rewards)| {
            let mut p = Array3::from_shape_vec((a, s, s), weights).unwrap();
            for mut row in p.lanes_mut(Axis(2)) {
                let sum = row.sum();
                row.mapv_inplace(|w| w / sum);
            }
            let rewards = if per_destination {
                RewardModel::PerDestination(Array3::from_shape_vec((s, a, s), rewards).unwrap())
            } else {
                RewardModel::PerAction(Array2::from_shape_vec((s, a), rewards).unwrap())
            };
            Model::unlabelled(p, rewards).unwrap()
        })
}

/// Largest residual `|V[i] - max_a Q(i, a)|` of the discounted Bellman equation.
fn bellman_residual(model: &Model, values: ndarray::ArrayView1<f64>, discount: f64) -> f64 {
    let rewards = model.expected_reward_matrix();
    let (next, _) = bellman::backup(model, &rewards, values, discount).unwrap();
    bellman::sup_norm_diff(values, next.view())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Normalised rows pass validation within tolerance.
    #[test]
    fn rows_are_distributions(model in model_strategy()) {
        for row in model.transitions().lanes(Axis(2)) {
            prop_assert!((row.sum() - 1.0).abs() <= ROW_SUM_TOLERANCE);
        }
    }

    /// The last stage is the terminal vector, bit for bit.
    #[test]
    fn terminal_stage_is_untouched(model in model_strategy(), n in 0usize..6, base in -10.0f64..10.0) {
        let terminal: Vec<f64> = (0..model.n_states()).map(|i| base + i as f64).collect();
        let sol = solve_finite(&model, n, &terminal).unwrap();
        prop_assert_eq!(sol.stage_values(n).to_vec(), terminal);
        prop_assert_eq!(sol.policy().nrows(), n);
    }

    /// Stage values are the max over actions and the recorded action attains it.
    #[test]
    fn finite_values_are_action_maxima(model in model_strategy(), n in 1usize..6) {
        let rewards = model.expected_reward_matrix();
        let sol = solve_finite(&model, n, &vec![0.0; model.n_states()]).unwrap();
        for t in 0..n {
            for i in 0..model.n_states() {
                let q = bellman::q_values(&model, &rewards, i, sol.stage_values(t + 1), 1.0);
                prop_assert!(q.iter().all(|&qa| sol.value(t, i) >= qa));
                let best = sol.action(t, i);
                prop_assert_eq!(q[best], sol.value(t, i));
                // lowest index among the maximisers
                prop_assert!(q[..best].iter().all(|&qa| qa < q[best]));
            }
        }
    }

    /// With |r| <= 1 and a zero start, delta_k <= gamma^(k-1), so the sweep
    /// count is bounded independently of the model.
    #[test]
    fn value_iteration_converges_within_contraction_bound(
        model in model_strategy(),
        gamma in 0.0f64..0.95,
        eps in 1e-8f64..1e-3,
    ) {
        let config = ValueIterationConfig::new(gamma, eps, 100_000);
        let sol = solve_infinite(&model, &config, None).unwrap();
        prop_assert!(sol.converged());
        let bound = (eps.ln() / gamma.ln()).max(0.0).floor() as usize + 3;
        prop_assert!(sol.iterations() <= bound, "{} sweeps > bound {}", sol.iterations(), bound);
        prop_assert!(bellman_residual(&model, sol.values(), gamma) < eps);
    }

    /// Restarting from a converged estimate converges after one more sweep.
    #[test]
    fn warm_start_is_idempotent(model in model_strategy(), gamma in 0.0f64..0.95) {
        let config = ValueIterationConfig::new(gamma, 1e-6, 100_000);
        let first = solve_infinite(&model, &config, None).unwrap();
        let warm = first.values().to_vec();
        let again = solve_infinite(&model, &ValueIterationConfig::new(gamma, 1e-6, 1), Some(warm.as_slice())).unwrap();
        prop_assert!(again.converged());
        prop_assert!(bellman::sup_norm_diff(first.values(), again.values()) < 1e-6);
    }

    /// Duplicated actions always resolve to the first copy.
    #[test]
    fn duplicate_actions_pick_lowest_index(model in model_strategy(), copies in 2usize..4) {
        let s = model.n_states();
        let mut p = Array3::<f64>::zeros((copies, s, s));
        let mut r = Array2::<f64>::zeros((s, copies));
        for c in 0..copies {
            for i in 0..s {
                p.slice_mut(ndarray::s![c, i, ..]).assign(&model.transition_row(0, i));
                r[[i, c]] = model.expected_immediate_reward(i, 0);
            }
        }
        let dup = Model::unlabelled(p, RewardModel::PerAction(r)).unwrap();
        let sol = solve_finite(&dup, 3usize, &vec![0.0; s]).unwrap();
        prop_assert!(sol.policy().iter().all(|&a| a == 0));
        let inf = solve_infinite(&dup, &ValueIterationConfig::new(0.5, 1e-6, 10_000), None).unwrap();
        prop_assert!(inf.policy().iter().all(|&a| a == 0));
    }
}
