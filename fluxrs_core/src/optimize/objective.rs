//! Provides struct for representing an optimization problem's objective

use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Represents the Objective of an optimization problem
///
/// Linear terms reference variables by id. At the model level the ids may be
/// reaction ids, which are resolved into solver variables when the problem is
/// built (see
/// [`Model::build_problem`](crate::metabolic_model::model::Model::build_problem)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Terms included in the objective (See [`ObjectiveTerm`])
    terms: Vec<ObjectiveTerm>,
    /// Sense of the objective (maximize, or minimize), see [`ObjectiveSense`]
    sense: ObjectiveSense,
}

impl Objective {
    /// Create a new empty objective, with a given sense
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            terms: Vec::new(),
            sense,
        }
    }

    /// Create a new empty maximization objective
    pub fn new_maximize() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new empty minimization objective
    pub fn new_minimize() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }

    /// Change the sense of the objective
    pub fn set_sense(&mut self, sense: ObjectiveSense) {
        self.sense = sense;
    }

    /// Get the sense of the objective
    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    /// Get the terms of the objective
    pub fn terms(&self) -> &[ObjectiveTerm] {
        &self.terms
    }

    /// Add a new term to the objective
    pub fn add_term(&mut self, term: ObjectiveTerm) {
        self.terms.push(term);
    }

    /// Add a new linear term to the objective
    pub fn add_linear_term(&mut self, variable: &str, coefficient: f64) {
        self.terms
            .push(ObjectiveTerm::new_linear(variable, coefficient));
    }

    /// Add a new quadratic term to the objective
    pub fn add_quadratic_term(&mut self, variable1: &str, variable2: &str, coefficient: f64) {
        self.terms
            .push(ObjectiveTerm::new_quadratic(variable1, variable2, coefficient));
    }

    /// Whether any term in the objective is quadratic
    pub fn contains_quadratic(&self) -> bool {
        self.terms
            .iter()
            .any(|term| matches!(term, ObjectiveTerm::Quadratic { .. }))
    }

    /// The (variable id, coefficient) pairs of a purely linear objective,
    /// or None if the objective contains quadratic terms
    pub fn linear_coefficients(&self) -> Option<Vec<(String, f64)>> {
        let mut coefficients = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            match term {
                ObjectiveTerm::Linear {
                    variable,
                    coefficient,
                } => coefficients.push((variable.clone(), *coefficient)),
                ObjectiveTerm::Quadratic { .. } => return None,
            }
        }
        Some(coefficients)
    }

    /// Evaluate the objective expression against a map of variable values,
    /// treating missing variables as zero
    pub fn evaluate(&self, values: &IndexMap<String, f64>) -> f64 {
        self.terms
            .iter()
            .map(|term| match term {
                ObjectiveTerm::Linear {
                    variable,
                    coefficient,
                } => coefficient * values.get(variable).copied().unwrap_or(0.),
                ObjectiveTerm::Quadratic {
                    variable1,
                    variable2,
                    coefficient,
                } => {
                    coefficient
                        * values.get(variable1).copied().unwrap_or(0.)
                        * values.get(variable2).copied().unwrap_or(0.)
                }
            })
            .sum()
    }
}

impl Display for Objective {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sense)?;
        if self.terms.is_empty() {
            return write!(f, " 0");
        }
        for (index, term) in self.terms.iter().enumerate() {
            if index == 0 {
                write!(f, " {}", term)?;
            } else {
                write!(f, " + {}", term)?;
            }
        }
        Ok(())
    }
}

/// Represents the sense of the objective, whether it should be maximized or
/// minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveSense {
    /// The objective should be minimized
    Minimize,
    /// The objective should be maximized
    Maximize,
}

impl Display for ObjectiveSense {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectiveSense::Minimize => write!(f, "min"),
            ObjectiveSense::Maximize => write!(f, "max"),
        }
    }
}

// region Objective Terms
/// A term in the objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectiveTerm {
    /// A quadratic term in the objective
    Quadratic {
        /// Id of the first variable in the objective term
        variable1: String,
        /// Id of the second variable in the objective term
        variable2: String,
        /// Coefficient for quadratic term
        coefficient: f64,
    },
    /// A linear term in the objective
    Linear {
        /// Id of the variable in objective term
        variable: String,
        /// Coefficient for linear term
        coefficient: f64,
    },
}

impl ObjectiveTerm {
    /// Create a new quadratic objective term
    pub fn new_quadratic(variable1: &str, variable2: &str, coefficient: f64) -> Self {
        ObjectiveTerm::Quadratic {
            variable1: variable1.to_string(),
            variable2: variable2.to_string(),
            coefficient,
        }
    }

    /// Create a new linear objective term
    pub fn new_linear(variable: &str, coefficient: f64) -> Self {
        ObjectiveTerm::Linear {
            variable: variable.to_string(),
            coefficient,
        }
    }
}

impl Display for ObjectiveTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectiveTerm::Linear {
                variable,
                coefficient,
            } => write!(f, "{}*{}", coefficient, variable),
            ObjectiveTerm::Quadratic {
                variable1,
                variable2,
                coefficient,
            } => write!(f, "{}*{}*{}", coefficient, variable1, variable2),
        }
    }
}

// endregion Objective Terms
