//! Provides struct representing an optimization problem
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use thiserror::Error;

use crate::configuration::{SolverBackend, CONFIGURATION};
use crate::optimize::constraint::Constraint;
use crate::optimize::objective::{Objective, ObjectiveSense, ObjectiveTerm};
use crate::optimize::solvers::microlp::MicrolpSolver;
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::variable::{Variable, VariableType};
use crate::optimize::ProblemSolution;

/// An optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    /// Objective to optimize
    objective: Objective,
    /// Variables of the optimization problem
    variables: IndexMap<String, Variable>,
    /// Constraints of the optimization problem
    constraints: IndexMap<String, Constraint>,
    /// Type of problem
    problem_type: ProblemType,
}

impl Problem {
    // region Creation Functions
    /// Create a new optimization problem
    pub fn new(objective_sense: ObjectiveSense) -> Self {
        Self {
            objective: Objective::new(objective_sense),
            variables: IndexMap::new(),
            constraints: IndexMap::new(),
            problem_type: ProblemType::LinearContinuous,
        }
    }

    /// Create a new maximization problem
    pub fn new_maximization() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new minimization problem
    pub fn new_minimization() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }

    // endregion Creation Functions

    // region Accessors
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn variables(&self) -> &IndexMap<String, Variable> {
        &self.variables
    }

    pub fn constraints(&self) -> &IndexMap<String, Constraint> {
        &self.constraints
    }

    pub fn problem_type(&self) -> ProblemType {
        self.problem_type
    }

    pub fn has_variable(&self, id: &str) -> bool {
        self.variables.contains_key(id)
    }

    // endregion Accessors

    // region Update Objective Sense
    /// Update the objective sense of the problem
    pub fn update_objective_sense(&mut self, sense: ObjectiveSense) {
        self.objective.set_sense(sense);
    }
    // endregion Update Objective Sense

    // region Adding Variables
    /// Add a variable to the optimization problem
    pub fn add_variable(&mut self, variable: Variable) -> Result<(), ProblemError> {
        // Validate that the variable can in fact be added to the problem
        self.validate_variable(&variable)?;
        // Update the type of the problem if needed
        match variable.variable_type {
            VariableType::Continuous => {
                // This will not change the type
            }
            VariableType::Integer | VariableType::Binary => match self.problem_type {
                ProblemType::LinearContinuous => {
                    self.problem_type = ProblemType::LinearMixedInteger;
                }
                ProblemType::QuadraticContinuous => {
                    self.problem_type = ProblemType::QuadraticMixedInteger;
                }
                _ => {}
            },
        }
        self.variables.insert(variable.id.clone(), variable);
        Ok(())
    }

    /// Create a new variable and add it to the optimization problem
    pub fn add_new_variable(
        &mut self,
        id: &str,
        name: Option<&str>,
        variable_type: VariableType,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        let mut new_var = Variable::new(id, variable_type, lower_bound, upper_bound);
        new_var.name = name.map(str::to_string);
        self.add_variable(new_var)
    }
    // endregion Adding Variables

    // region Adding Constraints
    /// Add a constraint to the problem
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), ProblemError> {
        self.validate_constraint(&constraint)?;
        self.constraints
            .insert(constraint.id().to_string(), constraint);
        Ok(())
    }

    /// Create a new equality constraint and add it to the problem
    pub fn add_new_equality_constraint(
        &mut self,
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        equals: f64,
    ) -> Result<(), ProblemError> {
        let new_cons = Constraint::new_equality(id, variables, coefficients, equals);
        self.add_constraint(new_cons)
    }

    /// Create a new inequality constraint and add it to the problem
    pub fn add_new_inequality_constraint(
        &mut self,
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        let new_cons =
            Constraint::new_inequality(id, variables, coefficients, lower_bound, upper_bound);
        self.add_constraint(new_cons)
    }

    // endregion Adding Constraints

    // region Adding Objective Terms
    /// Add a new term to the objective
    pub fn add_objective_term(&mut self, objective_term: ObjectiveTerm) -> Result<(), ProblemError> {
        self.validate_objective_term(&objective_term)?;
        if let ObjectiveTerm::Quadratic { .. } = &objective_term {
            match self.problem_type {
                ProblemType::LinearContinuous => {
                    self.problem_type = ProblemType::QuadraticContinuous;
                }
                ProblemType::LinearMixedInteger => {
                    self.problem_type = ProblemType::QuadraticMixedInteger;
                }
                _ => {}
            }
        }
        self.objective.add_term(objective_term);
        Ok(())
    }

    /// Add a new linear term to the objective
    pub fn add_new_linear_objective_term(
        &mut self,
        variable_id: &str,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        self.add_objective_term(ObjectiveTerm::new_linear(variable_id, coefficient))
    }

    /// Add a new quadratic term to the objective
    pub fn add_new_quadratic_objective_term(
        &mut self,
        variable1: &str,
        variable2: &str,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        self.add_objective_term(ObjectiveTerm::new_quadratic(variable1, variable2, coefficient))
    }

    // endregion Adding Objective Terms

    // region Remove Variables
    /// Remove a variable from the problem
    ///
    /// Fails if the variable is still referenced by a constraint or an
    /// objective term.
    pub fn remove_variable(&mut self, variable_id: &str) -> Result<(), ProblemError> {
        if !self.variables.contains_key(variable_id) {
            return Err(ProblemError::NonExistentVariable(variable_id.to_string()));
        }
        let referenced = self
            .constraints
            .values()
            .flat_map(|cons| cons.terms())
            .any(|term| term.variable == variable_id)
            || self.objective.terms().iter().any(|term| match term {
                ObjectiveTerm::Linear { variable, .. } => variable == variable_id,
                ObjectiveTerm::Quadratic {
                    variable1,
                    variable2,
                    ..
                } => variable1 == variable_id || variable2 == variable_id,
            });
        if referenced {
            return Err(ProblemError::VariableInUse(variable_id.to_string()));
        }
        self.variables.shift_remove(variable_id);
        Ok(())
    }
    // endregion Remove Variables

    // region Remove Constraints
    /// Remove a constraint (by id) from the problem
    pub fn remove_constraint(&mut self, constraint_id: &str) {
        self.constraints.shift_remove(constraint_id);
    }
    // endregion Remove Constraints

    // region Validation Functions
    /// Check that a variable to be added is valid to add to this problem
    fn validate_variable(&self, variable: &Variable) -> Result<(), ProblemError> {
        // Check if there is already a variable with this id
        if self.variables.contains_key(&variable.id) {
            return Err(ProblemError::VariableIdAlreadyExists(variable.id.clone()));
        }
        // Check if the variable bounds are valid
        if variable.lower_bound > variable.upper_bound {
            return Err(ProblemError::InvalidVariableBounds(variable.id.clone()));
        }
        Ok(())
    }

    /// Check that a constraint to be added is valid to add to this Problem
    fn validate_constraint(&self, constraint: &Constraint) -> Result<(), ProblemError> {
        // Check that a constraint with the same id doesn't already exist
        if self.constraints.contains_key(constraint.id()) {
            return Err(ProblemError::ConstraintAlreadyExists(
                constraint.id().to_string(),
            ));
        }
        // Check that for inequality constraints the bounds make sense
        if let Constraint::Inequality {
            lower_bound,
            upper_bound,
            ..
        } = constraint
        {
            if lower_bound > upper_bound {
                return Err(ProblemError::InvalidConstraintBounds(
                    constraint.id().to_string(),
                ));
            }
        }
        // Check that the variables in this constraint are in the problem
        for term in constraint.terms() {
            if !self.variables.contains_key(&term.variable) {
                return Err(ProblemError::NonExistentVariableInConstraint {
                    constraint: constraint.id().to_string(),
                    variable: term.variable.clone(),
                });
            }
        }
        // All checks have passed
        Ok(())
    }

    /// Check that an objective term to be added is valid to add to this Problem
    fn validate_objective_term(&self, objective_term: &ObjectiveTerm) -> Result<(), ProblemError> {
        // Make sure the variables in the objective are in the problem
        match objective_term {
            ObjectiveTerm::Linear { variable, .. } => {
                if !self.variables.contains_key(variable) {
                    return Err(ProblemError::NonExistentVariableInObjective(
                        variable.clone(),
                    ));
                }
            }
            ObjectiveTerm::Quadratic {
                variable1,
                variable2,
                ..
            } => {
                for variable in [variable1, variable2] {
                    if !self.variables.contains_key(variable) {
                        return Err(ProblemError::NonExistentVariableInObjective(
                            variable.clone(),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    // endregion Validation Functions

    // region Check Problem
    /*
    Functions for checking properties of the Problem, such as if integer variables are
    present, if the objective contains quadratic terms, etc.
    */
    pub fn has_integer_variables(&self) -> bool {
        self.variables
            .values()
            .any(|var| var.variable_type != VariableType::Continuous)
    }

    pub fn has_quadratic_objective_terms(&self) -> bool {
        self.objective.contains_quadratic()
    }

    // endregion Check Problem

    // region Solving
    /// Solve the problem with the backend selected in the global configuration
    pub fn solve(&self) -> Result<ProblemSolution, SolverError> {
        let backend = CONFIGURATION.read().unwrap().solver;
        match backend {
            SolverBackend::Microlp => MicrolpSolver.solve(self),
        }
    }
    // endregion Solving
}

/// Types of optimization problems
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProblemType {
    /// Problem with linear objectives and constraints, and continuous variables
    LinearContinuous,
    /// Problem with quadratic objective, linear constraints, and continuous variables
    QuadraticContinuous,
    /// Problem with linear objective and constraints, with integer and continuous variables
    LinearMixedInteger,
    /// Problem with a quadratic objective function, and some integer variables
    QuadraticMixedInteger,
}

impl Display for ProblemType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemType::LinearContinuous => write!(f, "linear continuous"),
            ProblemType::QuadraticContinuous => write!(f, "quadratic continuous"),
            ProblemType::LinearMixedInteger => write!(f, "linear mixed-integer"),
            ProblemType::QuadraticMixedInteger => write!(f, "quadratic mixed-integer"),
        }
    }
}

/// Errors associated with the Problem
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// Error when trying to add a variable with the same id as an existing variable
    #[error("a variable with id {0} already exists in the problem")]
    VariableIdAlreadyExists(String),
    /// Error when trying to add variable with invalid bounds
    #[error("variable {0} has lower_bound > upper_bound")]
    InvalidVariableBounds(String),
    /// Error when trying to add a constraint with the same id as an existing constraint
    #[error("a constraint with id {0} already exists in the problem")]
    ConstraintAlreadyExists(String),
    /// Error when trying to add a constraint with invalid bounds
    #[error("inequality constraint {0} has lower_bound > upper_bound")]
    InvalidConstraintBounds(String),
    /// Error when trying to add a constraint that contains variables not in the problem
    #[error("constraint {constraint} references variable {variable} which is not in the problem")]
    NonExistentVariableInConstraint { constraint: String, variable: String },
    /// Error when trying to add an objective term which includes variables not in the problem
    #[error("the objective references variable {0} which is not in the problem")]
    NonExistentVariableInObjective(String),
    /// Error when trying to update or remove a variable that doesn't exist
    #[error("variable {0} does not exist in the problem")]
    NonExistentVariable(String),
    /// Error when trying to remove a variable still referenced by a constraint or the objective
    #[error("variable {0} is still referenced by a constraint or the objective")]
    VariableInUse(String),
}
