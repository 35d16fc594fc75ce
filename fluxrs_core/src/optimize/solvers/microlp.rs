//! Implements a solver interface for microlp
use ::microlp::{
    ComparisonOp, Error as MicrolpError, LinearExpr, OptimizationDirection,
    Problem as MicrolpProblem, Variable as MicrolpVariable,
};
use indexmap::IndexMap;

use crate::optimize::constraint::{Constraint, ConstraintTerm};
use crate::optimize::objective::{ObjectiveSense, ObjectiveTerm};
use crate::optimize::problem::{Problem, ProblemType};
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::variable::VariableType;
use crate::optimize::ProblemSolution;

/// Solver backend based on the pure-Rust microlp simplex implementation
///
/// Handles linear continuous and linear mixed-integer problems; quadratic
/// objectives are rejected with
/// [`SolverError::UnsupportedProblemType`].
pub struct MicrolpSolver;

impl Solver for MicrolpSolver {
    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        match problem.problem_type() {
            ProblemType::LinearContinuous | ProblemType::LinearMixedInteger => {}
            quadratic => return Err(SolverError::UnsupportedProblemType(quadratic)),
        }

        let direction = match problem.objective().sense() {
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
        };

        // microlp attaches the objective coefficient to each variable, so
        // accumulate the coefficient of every linear term first
        let mut objective_coefficients: IndexMap<&str, f64> = IndexMap::new();
        for term in problem.objective().terms() {
            match term {
                ObjectiveTerm::Linear {
                    variable,
                    coefficient,
                } => {
                    *objective_coefficients
                        .entry(variable.as_str())
                        .or_insert(0.) += coefficient;
                }
                ObjectiveTerm::Quadratic { .. } => {
                    return Err(SolverError::UnsupportedProblemType(problem.problem_type()));
                }
            }
        }

        let mut lp = MicrolpProblem::new(direction);
        let mut lp_variables: IndexMap<&str, MicrolpVariable> = IndexMap::new();
        for (id, variable) in problem.variables() {
            let coefficient = objective_coefficients.get(id.as_str()).copied().unwrap_or(0.);
            let lp_var = match variable.variable_type {
                VariableType::Continuous => {
                    lp.add_var(coefficient, (variable.lower_bound, variable.upper_bound))
                }
                VariableType::Integer => lp.add_integer_var(
                    coefficient,
                    (variable.lower_bound as i32, variable.upper_bound as i32),
                ),
                VariableType::Binary => lp.add_integer_var(coefficient, (0, 1)),
            };
            lp_variables.insert(id.as_str(), lp_var);
        }

        for constraint in problem.constraints().values() {
            let expr = Self::linear_expr(constraint.terms(), &lp_variables);
            match constraint {
                Constraint::Equality { equals, .. } => {
                    lp.add_constraint(expr, ComparisonOp::Eq, *equals);
                }
                Constraint::Inequality {
                    lower_bound,
                    upper_bound,
                    ..
                } => {
                    if lower_bound == upper_bound {
                        lp.add_constraint(expr, ComparisonOp::Eq, *lower_bound);
                    } else {
                        if lower_bound.is_finite() {
                            lp.add_constraint(expr.clone(), ComparisonOp::Ge, *lower_bound);
                        }
                        if upper_bound.is_finite() {
                            lp.add_constraint(expr, ComparisonOp::Le, *upper_bound);
                        }
                    }
                }
            }
        }

        let lp_solution = lp.solve().map_err(|err| match err {
            MicrolpError::Infeasible => SolverError::Infeasible,
            MicrolpError::Unbounded => SolverError::Unbounded,
            other => SolverError::Numerical(other.to_string()),
        })?;

        let variable_values = lp_variables
            .iter()
            .map(|(id, lp_var)| (id.to_string(), *lp_solution.var_value(*lp_var)))
            .collect();
        Ok(ProblemSolution {
            objective_value: lp_solution.objective(),
            variable_values,
        })
    }
}

impl MicrolpSolver {
    /// Translate constraint terms into a microlp linear expression
    fn linear_expr(
        terms: &[ConstraintTerm],
        lp_variables: &IndexMap<&str, MicrolpVariable>,
    ) -> LinearExpr {
        let mut expr = LinearExpr::empty();
        for term in terms {
            // Problem validation guarantees every referenced variable exists
            if let Some(lp_var) = lp_variables.get(term.variable.as_str()) {
                expr.add(*lp_var, term.coefficient);
            }
        }
        expr
    }
}
