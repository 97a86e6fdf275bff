//! Solver configuration as read from a JSON file.
//!
//! ```json
//! {"mode": "finite", "horizon": 4, "terminal": {"one_step": {"baseline": 60.0}}}
//! {"mode": "infinite", "discount": 0.9, "threshold": 1e-6, "max_iterations": 10000}
//! ```
use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

use crate::dynamic_programming::finite::{solve_finite, Horizon, TerminalValue};
use crate::dynamic_programming::infinite::{solve_infinite, ValueIterationConfig};
use crate::dynamic_programming::model::Model;
use crate::error::Result;
use crate::solution::Solution;

/// Rule for choosing among actions with equal value. Only the lowest index
/// is supported; the knob exists so configuration files can state it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    LowestIndex,
}

impl Default for TieBreak {
    fn default() -> Self {
        TieBreak::LowestIndex
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SolverConfig {
    Finite {
        /// Signed so that a negative horizon in a file is reported as
        /// `InvalidHorizon` rather than a parse error.
        horizon: i64,
        #[serde(default)]
        terminal: TerminalValue,
        #[serde(default)]
        tie_break: TieBreak,
    },
    Infinite {
        /// `discount`, `threshold` and `max_iterations` at the top level of the
        /// document, each defaulted independently.
        #[serde(flatten)]
        value_iteration: ValueIterationConfig,
        #[serde(default)]
        warm_start: Option<Vec<f64>>,
        #[serde(default)]
        tie_break: TieBreak,
    },
}

impl SolverConfig {
    pub fn finite(horizon: i64, terminal: TerminalValue) -> Self {
        SolverConfig::Finite { horizon, terminal, tie_break: TieBreak::LowestIndex }
    }

    pub fn infinite(config: ValueIterationConfig, warm_start: Option<Vec<f64>>) -> Self {
        SolverConfig::Infinite { value_iteration: config, warm_start, tie_break: TieBreak::LowestIndex }
    }

    /// Validates the knobs against `model` and runs the selected solver.
    pub fn solve(&self, model: &Model) -> Result<Solution> {
        match self {
            SolverConfig::Finite { horizon, terminal, .. } => {
                let horizon = Horizon::try_from(*horizon)?;
                let terminal = terminal.resolve(model)?;
                Ok(Solution::Finite(solve_finite(model, horizon, &terminal)?))
            }
            SolverConfig::Infinite { value_iteration, warm_start, .. } => {
                Ok(Solution::Infinite(solve_infinite(model, value_iteration, warm_start.as_deref())?))
            }
        }
    }
}
