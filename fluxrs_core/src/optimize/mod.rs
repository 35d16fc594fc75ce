//! Module for constructing and solving optimization problems

pub mod constraint;
pub mod objective;
pub mod problem;
pub mod solvers;
pub mod variable;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Struct representing the solution to an optimization problem
///
/// Only produced for successful solves; failures are reported as
/// [`SolverError`](crate::optimize::solvers::SolverError).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSolution {
    /// Optimized value of the objective
    pub objective_value: f64,
    /// Values of the variables at the optimum, keyed by variable id
    pub variable_values: IndexMap<String, f64>,
}
