use serde::Serialize;

use crate::dynamic_programming::finite::FiniteSolution;
use crate::dynamic_programming::infinite::InfiniteSolution;
use crate::dynamic_programming::model::Model;

/// Output of either solver.
#[derive(Debug, Clone, PartialEq)]
pub enum Solution {
    Finite(FiniteSolution),
    Infinite(InfiniteSolution),
}

/// Serialisable view of a solution, rows indexed by stage (a single row for
/// value iteration).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionDocument {
    pub mode: &'static str,
    pub states: Vec<String>,
    pub actions: Vec<String>,
    pub values: Vec<Vec<f64>>,
    pub policy: Vec<Vec<usize>>,
    pub policy_labels: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convergence: Option<Convergence>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Convergence {
    pub converged: bool,
    pub iterations: usize,
    pub delta: f64,
    pub error_bound: f64,
}

impl Solution {
    pub fn to_document(&self, model: &Model) -> SolutionDocument {
        let (mode, values, policy, convergence) = match self {
            Solution::Finite(f) => (
                "finite",
                f.values().outer_iter().map(|row| row.to_vec()).collect(),
                f.policy().outer_iter().map(|row| row.to_vec()).collect::<Vec<_>>(),
                None,
            ),
            Solution::Infinite(s) => (
                "infinite",
                vec![s.values().to_vec()],
                vec![s.policy().to_vec()],
                Some(Convergence {
                    converged: s.converged(),
                    iterations: s.iterations(),
                    delta: s.delta(),
                    error_bound: s.error_bound(),
                }),
            ),
        };
        let policy_labels = policy
            .iter()
            .map(|row| row.iter().map(|&a| model.action_label(a).unwrap_or_default().to_string()).collect())
            .collect();
        SolutionDocument {
            mode,
            states: model.states().to_vec(),
            actions: model.actions().to_vec(),
            values,
            policy,
            policy_labels,
            convergence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic_programming::finite::solve_finite;
    use crate::dynamic_programming::reward::RewardModel;
    use ndarray::{arr2, Array3};

    #[test]
    fn finite_document_labels_every_stage() {
        let mut p = Array3::zeros((2, 1, 1));
        p[[0, 0, 0]] = 1.0;
        p[[1, 0, 0]] = 1.0;
        let model = Model::new(
            vec!["only".into()],
            vec!["wait".into(), "act".into()],
            p,
            RewardModel::PerAction(arr2(&[[0.0, 1.0]])),
        )
        .unwrap();
        let doc = Solution::Finite(solve_finite(&model, 2usize, &[0.0]).unwrap()).to_document(&model);
        assert_eq!(doc.mode, "finite");
        assert_eq!(doc.values, vec![vec![2.0], vec![1.0], vec![0.0]]);
        assert_eq!(doc.policy_labels, vec![vec!["act".to_string()], vec!["act".to_string()]]);
        assert!(doc.convergence.is_none());
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("convergence").is_none());
    }
}
