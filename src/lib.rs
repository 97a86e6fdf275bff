//! Optimal policies for small, fully enumerated Markov Decision Processes.
//!
//! Two solvers share one [`Model`]: backward induction over a fixed horizon
//! ([`solve_finite`]) and value iteration to the discounted fixed point
//! ([`solve_infinite`]).
//!
//! ```
//! use markov_dp::{solve_infinite, Model, RewardModel, ValueIterationConfig};
//! use ndarray::{arr2, Array3};
//!
//! let mut p = Array3::zeros((2, 2, 2));
//! p[[0, 0, 0]] = 1.0;
//! p[[0, 1, 1]] = 1.0;
//! p[[1, 0, 1]] = 1.0;
//! p[[1, 1, 0]] = 1.0;
//! let model = Model::unlabelled(p, RewardModel::PerAction(arr2(&[[1.0, 0.0], [0.0, 1.0]]))).unwrap();
//! let sol = solve_infinite(&model, &ValueIterationConfig::new(0.9, 1e-6, 1_000), None).unwrap();
//! assert!(sol.converged());
//! assert!((sol.values()[0] - 10.0).abs() < 1e-4);
//! ```
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub mod config;
pub mod dynamic_programming;
pub mod error;
pub mod logging;
pub mod solution;

pub use config::{SolverConfig, TieBreak};
pub use dynamic_programming::finite::{solve_finite, solve_finite_with, FiniteSolution, Horizon, TerminalValue};
pub use dynamic_programming::infinite::{solve_infinite, solve_infinite_with, InfiniteSolution, ValueIterationConfig};
pub use dynamic_programming::model::{Model, ModelSpec, TransitionPair, TransitionSpec, ROW_SUM_TOLERANCE};
pub use dynamic_programming::observer::{DeltaHistory, Observer, Progress, Silent};
pub use dynamic_programming::reward::{RewardModel, RewardSpec};
pub use error::{Result, SolveError};
pub use solution::{Convergence, Solution, SolutionDocument};

pub fn read_model_json<P: AsRef<Path>>(path: P) -> Result<Model> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let spec: ModelSpec = serde_json::from_reader(reader)?;
    Model::from_spec(spec)
}

pub fn read_config_json<P: AsRef<Path>>(path: P) -> Result<SolverConfig> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let u = serde_json::from_reader(reader)?;
    Ok(u)
}
