//! Module providing representation of optimization problem variables
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Used to identify the variable
    pub id: String,
    /// Optional human-readable name
    pub name: Option<String>,
    /// Type of the variable, see [`VariableType`]
    pub variable_type: VariableType,
    /// Lowest value the variable can take
    pub lower_bound: f64,
    /// Highest value the variable can take
    pub upper_bound: f64,
}

impl Variable {
    /// Create a new variable
    pub fn new(
        id: &str,
        variable_type: VariableType,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Variable {
        Variable {
            id: id.to_string(),
            name: None,
            variable_type,
            lower_bound,
            upper_bound,
        }
    }

    /// Create a new continuous variable
    pub fn new_continuous(id: &str, lower_bound: f64, upper_bound: f64) -> Variable {
        Variable::new(id, VariableType::Continuous, lower_bound, upper_bound)
    }

    /// Create a new binary variable
    pub fn new_binary(id: &str) -> Variable {
        Variable::new(id, VariableType::Binary, 0., 1.)
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}:{}", name, self.variable_type),
            None => write!(f, "{}:{}", self.id, self.variable_type),
        }
    }
}

/// Represents the type of variable in an optimization problem
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum VariableType {
    /// Continuous variable
    Continuous,
    /// Integer variable
    Integer,
    /// Binary Variable
    Binary,
}

impl Display for VariableType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableType::Continuous => write!(f, "CONTINUOUS"),
            VariableType::Integer => write!(f, "INTEGER"),
            VariableType::Binary => write!(f, "BINARY"),
        }
    }
}
