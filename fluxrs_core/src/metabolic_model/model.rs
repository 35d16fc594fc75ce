//! This module provides the Model struct for representing an entire metabolic model
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::reaction::Reaction;
use crate::optimize::constraint::{Constraint, ConstraintTerm};
use crate::optimize::objective::{Objective, ObjectiveTerm};
use crate::optimize::problem::{Problem, ProblemError};
use crate::optimize::solvers::SolverError;
use crate::optimize::variable::{Variable, VariableType};

/// How reversible reactions are encoded as solver variables
///
/// The encoding is an explicit parameter of problem construction, scoped to a
/// single solve, rather than mutable model state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionEncoding {
    /// One signed variable per reaction, bounded by the reaction's flux bounds
    Signed,
    /// Two non-negative variables per reaction, one for each direction; the
    /// net flux is forward minus reverse
    Split,
}

/// Represents a metabolic model under steady-state flux balance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Map of reaction ids to Reaction objects
    pub reactions: IndexMap<String, Reaction>,
    /// Map of metabolite ids to Metabolite objects
    pub metabolites: IndexMap<String, Metabolite>,
    /// Objective optimized by [`Model::solve`]; linear terms may reference
    /// reaction ids
    pub objective: Objective,
    /// Extra solver variables registered alongside the reaction variables,
    /// normally added by simulation methods through a transaction
    auxiliary_variables: IndexMap<String, Variable>,
    /// Extra constraints registered alongside the mass-balance constraints,
    /// normally added by simulation methods through a transaction
    auxiliary_constraints: IndexMap<String, Constraint>,
    /// Id associated with the Model
    pub id: Option<String>,
}

impl Model {
    pub fn new_empty() -> Self {
        Model {
            reactions: IndexMap::new(),
            metabolites: IndexMap::new(),
            objective: Objective::new_maximize(),
            auxiliary_variables: IndexMap::new(),
            auxiliary_constraints: IndexMap::new(),
            id: None,
        }
    }

    /// Add a reaction to the model
    pub fn add_reaction(&mut self, reaction: Reaction) {
        let id = reaction.id.clone();
        self.reactions.insert(id, reaction);
    }

    /// Add a metabolite to the model
    pub fn add_metabolite(&mut self, metabolite: Metabolite) {
        let id = metabolite.id.clone();
        self.metabolites.insert(id, metabolite);
    }

    /// Iterate over the exchange (boundary) reactions of the model
    pub fn exchanges(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions.values().filter(|reaction| reaction.boundary)
    }

    /// Replace the model objective, returning the previous one
    pub fn set_objective(&mut self, objective: Objective) -> Objective {
        std::mem::replace(&mut self.objective, objective)
    }

    /// Update a reaction's flux bounds, returning the previous
    /// (lower, upper) pair
    pub fn set_reaction_bounds(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(f64, f64), ModelError> {
        let reaction = self
            .reactions
            .get_mut(id)
            .ok_or_else(|| ModelError::UnknownReaction(id.to_string()))?;
        let previous = (reaction.lower_bound, reaction.upper_bound);
        reaction.lower_bound = lower_bound;
        reaction.upper_bound = upper_bound;
        Ok(previous)
    }

    // region Auxiliary registries
    /// Register an extra solver variable
    ///
    /// The id must not collide with a reaction id, since reaction ids become
    /// solver variables as well.
    pub fn add_auxiliary_variable(&mut self, variable: Variable) -> Result<(), ModelError> {
        if self.auxiliary_variables.contains_key(&variable.id)
            || self.reactions.contains_key(&variable.id)
        {
            return Err(ModelError::DuplicateVariable(variable.id.clone()));
        }
        self.auxiliary_variables
            .insert(variable.id.clone(), variable);
        Ok(())
    }

    /// Drop an extra solver variable, returning it if present
    pub fn remove_auxiliary_variable(&mut self, id: &str) -> Option<Variable> {
        self.auxiliary_variables.shift_remove(id)
    }

    /// Register an extra constraint
    pub fn add_auxiliary_constraint(&mut self, constraint: Constraint) -> Result<(), ModelError> {
        if self.auxiliary_constraints.contains_key(constraint.id()) {
            return Err(ModelError::DuplicateConstraint(constraint.id().to_string()));
        }
        self.auxiliary_constraints
            .insert(constraint.id().to_string(), constraint);
        Ok(())
    }

    /// Drop an extra constraint, returning it if present
    pub fn remove_auxiliary_constraint(&mut self, id: &str) -> Option<Constraint> {
        self.auxiliary_constraints.shift_remove(id)
    }

    pub fn auxiliary_variables(&self) -> &IndexMap<String, Variable> {
        &self.auxiliary_variables
    }

    pub fn auxiliary_constraints(&self) -> &IndexMap<String, Constraint> {
        &self.auxiliary_constraints
    }
    // endregion Auxiliary registries

    // region Problem construction
    /// Build the optimization problem for the current model state
    ///
    /// Creates the reaction variables according to `encoding`, the auxiliary
    /// variables, one steady-state mass-balance equality per metabolite, the
    /// auxiliary constraints, and the objective. Terms that reference a
    /// reaction id are expanded to the directional variable pair in split
    /// encoding.
    pub fn build_problem(&self, encoding: ReactionEncoding) -> Result<Problem, ProblemError> {
        let mut problem = Problem::new(self.objective.sense());

        for (id, reaction) in &self.reactions {
            match encoding {
                ReactionEncoding::Signed => {
                    problem.add_new_variable(
                        id,
                        reaction.name.as_deref(),
                        VariableType::Continuous,
                        reaction.lower_bound,
                        reaction.upper_bound,
                    )?;
                }
                ReactionEncoding::Split => {
                    problem.add_new_variable(
                        &reaction.forward_id(),
                        None,
                        VariableType::Continuous,
                        reaction.forward_lower_bound(),
                        reaction.forward_upper_bound(),
                    )?;
                    problem.add_new_variable(
                        &reaction.reverse_id(),
                        None,
                        VariableType::Continuous,
                        reaction.reverse_lower_bound(),
                        reaction.reverse_upper_bound(),
                    )?;
                }
            }
        }

        for variable in self.auxiliary_variables.values() {
            problem.add_variable(variable.clone())?;
        }

        // Steady state: for every metabolite the net production is zero
        for metabolite_id in self.metabolites.keys() {
            let mut variables: Vec<String> = Vec::new();
            let mut coefficients: Vec<f64> = Vec::new();
            for reaction in self.reactions.values() {
                if let Some(&stoichiometry) = reaction.metabolites.get(metabolite_id) {
                    match encoding {
                        ReactionEncoding::Signed => {
                            variables.push(reaction.id.clone());
                            coefficients.push(stoichiometry);
                        }
                        ReactionEncoding::Split => {
                            variables.push(reaction.forward_id());
                            coefficients.push(stoichiometry);
                            variables.push(reaction.reverse_id());
                            coefficients.push(-stoichiometry);
                        }
                    }
                }
            }
            if variables.is_empty() {
                continue;
            }
            let variable_refs: Vec<&str> = variables.iter().map(String::as_str).collect();
            problem.add_new_equality_constraint(
                &format!("mass_balance_{}", metabolite_id),
                &variable_refs,
                &coefficients,
                0.,
            )?;
        }

        for constraint in self.auxiliary_constraints.values() {
            let resolved = self.resolve_constraint(constraint, encoding, &problem)?;
            problem.add_constraint(resolved)?;
        }

        for term in self.objective.terms() {
            match term {
                ObjectiveTerm::Linear {
                    variable,
                    coefficient,
                } => {
                    let resolved = self.resolve_term(variable, *coefficient, encoding, &problem)?;
                    for (id, coefficient) in resolved {
                        problem.add_new_linear_objective_term(&id, coefficient)?;
                    }
                }
                ObjectiveTerm::Quadratic {
                    variable1,
                    variable2,
                    coefficient,
                } => {
                    // Quadratic terms are never expanded over directional pairs
                    problem.add_new_quadratic_objective_term(variable1, variable2, *coefficient)?;
                }
            }
        }

        Ok(problem)
    }

    /// Resolve a linear term's variable id into problem variables
    ///
    /// A term may reference a solver variable directly (an auxiliary variable,
    /// or a reaction variable in signed encoding), or a reaction in split
    /// encoding, in which case it expands to `+c*forward, -c*reverse`.
    fn resolve_term(
        &self,
        variable: &str,
        coefficient: f64,
        encoding: ReactionEncoding,
        problem: &Problem,
    ) -> Result<Vec<(String, f64)>, ProblemError> {
        if problem.has_variable(variable) {
            return Ok(vec![(variable.to_string(), coefficient)]);
        }
        if let Some(reaction) = self.reactions.get(variable) {
            if encoding == ReactionEncoding::Split {
                return Ok(vec![
                    (reaction.forward_id(), coefficient),
                    (reaction.reverse_id(), -coefficient),
                ]);
            }
        }
        Err(ProblemError::NonExistentVariable(variable.to_string()))
    }

    /// Resolve all terms of an auxiliary constraint against the problem
    fn resolve_constraint(
        &self,
        constraint: &Constraint,
        encoding: ReactionEncoding,
        problem: &Problem,
    ) -> Result<Constraint, ProblemError> {
        let mut resolved_terms = Vec::with_capacity(constraint.terms().len());
        for term in constraint.terms() {
            for (variable, coefficient) in
                self.resolve_term(&term.variable, term.coefficient, encoding, problem)?
            {
                resolved_terms.push(ConstraintTerm {
                    variable,
                    coefficient,
                });
            }
        }
        Ok(match constraint {
            Constraint::Equality { id, equals, .. } => Constraint::Equality {
                id: id.clone(),
                terms: resolved_terms,
                equals: *equals,
            },
            Constraint::Inequality {
                id,
                lower_bound,
                upper_bound,
                ..
            } => Constraint::Inequality {
                id: id.clone(),
                terms: resolved_terms,
                lower_bound: *lower_bound,
                upper_bound: *upper_bound,
            },
        })
    }
    // endregion Problem construction

    // region Solving
    /// Solve the model with the signed reaction encoding
    pub fn solve(&self) -> Result<Solution, SolveError> {
        self.solve_with_encoding(ReactionEncoding::Signed)
    }

    /// Solve the model; equivalent entry point to [`Model::solve`]
    pub fn optimize(&self) -> Result<Solution, SolveError> {
        self.solve()
    }

    /// Build the problem with the given reaction encoding and solve it
    ///
    /// The returned fluxes are net per-reaction values (forward minus reverse
    /// in split encoding). The model itself is left untouched.
    pub fn solve_with_encoding(
        &self,
        encoding: ReactionEncoding,
    ) -> Result<Solution, SolveError> {
        let problem = self.build_problem(encoding)?;
        let result = problem.solve()?;
        let mut fluxes = IndexMap::with_capacity(self.reactions.len());
        for (id, reaction) in &self.reactions {
            let flux = match encoding {
                ReactionEncoding::Signed => {
                    result.variable_values.get(id).copied().unwrap_or(0.)
                }
                ReactionEncoding::Split => {
                    result
                        .variable_values
                        .get(&reaction.forward_id())
                        .copied()
                        .unwrap_or(0.)
                        - result
                            .variable_values
                            .get(&reaction.reverse_id())
                            .copied()
                            .unwrap_or(0.)
                }
            };
            fluxes.insert(id.clone(), flux);
        }
        Ok(Solution {
            objective_value: result.objective_value,
            fluxes,
        })
    }
    // endregion Solving
}

/// Result of a successful solve, owned by the caller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Achieved value of the objective that was active during the solve
    pub objective_value: f64,
    /// Net flux carried by each reaction, keyed by reaction id
    pub fluxes: IndexMap<String, f64>,
}

/// Errors from a failed solve
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    /// The optimization problem could not be constructed from the model
    #[error("failed to construct the optimization problem: {0}")]
    Build(#[from] ProblemError),
    /// The backend could not find an optimal solution
    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Errors from misusing the model registries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("reaction {0} is not part of the model")]
    UnknownReaction(String),
    #[error("a variable with id {0} already exists in the model")]
    DuplicateVariable(String),
    #[error("a constraint with id {0} already exists in the model")]
    DuplicateConstraint(String),
}
