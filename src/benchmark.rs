use criterion::{black_box, criterion_group, criterion_main, Criterion};
use criterion::measurement::WallTime;
use markov_dp::{solve_finite, solve_infinite, Model, RewardModel, ValueIterationConfig};
use ndarray::{Array2, Array3};

enum Chain {
    SMALL,
    MEDIUM,
    LARGE,
}

impl Chain {
    fn states(&self) -> usize {
        match self {
            Chain::SMALL => 10,
            Chain::MEDIUM => 50,
            Chain::LARGE => 200,
        }
    }
}

/// Two action chain: `wait` mostly stays put, `advance` moves forward but may
/// fall back to the start. Reward grows along the chain.
fn setup(c: Chain) -> Model {
    let n = c.states();
    let mut p = Array3::<f64>::zeros((2, n, n));
    let mut r = Array2::<f64>::zeros((n, 2));
    for i in 0..n {
        let next = (i + 1).min(n - 1);
        p[[0, i, i]] += 0.8;
        p[[0, i, next]] += 0.2;
        p[[1, i, next]] += 0.6;
        p[[1, i, 0]] += 0.4;
        r[[i, 0]] = i as f64 / n as f64;
        r[[i, 1]] = i as f64 / n as f64 - 0.05;
    }
    Model::unlabelled(p, RewardModel::PerAction(r)).unwrap()
}

pub fn backward_induction_benchmark(c: &mut Criterion) -> &mut Criterion<WallTime> {
    let model = setup(Chain::MEDIUM);
    let terminal = vec![0.0; model.n_states()];
    c.bench_function("backward induction 50 states 50 stages", |b|
        b.iter(|| solve_finite(black_box(&model), 50usize, &terminal).unwrap()))
}

pub fn value_iteration_benchmark(c: &mut Criterion) -> &mut Criterion<WallTime> {
    let config = ValueIterationConfig::new(0.95, 1e-6, 10_000);
    for (name, chain) in vec![
        ("value iteration 10 states", Chain::SMALL),
        ("value iteration 200 states", Chain::LARGE),
    ] {
        let model = setup(chain);
        c.bench_function(name, |b| b.iter(|| solve_infinite(black_box(&model), &config, None).unwrap()));
    }
    c
}

criterion_group!(benches, backward_induction_benchmark, value_iteration_benchmark);
criterion_main!(benches);
