//! Solver backends for optimization problems
pub mod microlp;

use thiserror::Error;

use crate::optimize::problem::{Problem, ProblemType};
use crate::optimize::ProblemSolution;

/// A backend capable of solving an optimization [`Problem`]
pub trait Solver {
    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError>;
}

/// Errors produced while solving a problem
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The constraints are conflicting, no feasible point exists
    #[error("the problem is infeasible")]
    Infeasible,
    /// The objective value is not bounded over the feasible region
    #[error("the objective value is unbounded")]
    Unbounded,
    /// The solver failed for numerical or internal reasons
    #[error("the solver encountered an error: {0}")]
    Numerical(String),
    /// The selected backend cannot solve this type of problem
    #[error("{0} problems are not supported by the selected solver")]
    UnsupportedProblemType(ProblemType),
}
