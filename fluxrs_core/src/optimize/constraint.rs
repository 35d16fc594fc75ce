//! Provides struct for representing a constraint in an optimization problem
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Represents a linear constraint in an optimization problem
///
/// Terms reference problem variables by id; the ids are bound to actual
/// variables when the constraint is added to a
/// [`Problem`](crate::optimize::problem::Problem).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    /// Represents an equality constraint, where `terms` = `equals`
    Equality {
        /// Used to identify the constraint
        id: String,
        /// Linear terms which are added together, see [`ConstraintTerm`] for more
        terms: Vec<ConstraintTerm>,
        /// The right hand side of the equality constraint
        equals: f64,
    },
    /// Represents an inequality constraint
    Inequality {
        /// Used to identify the constraint
        id: String,
        /// Linear terms which are added together, see [`ConstraintTerm`] for more
        terms: Vec<ConstraintTerm>,
        /// The lowest value the sum of the terms can take, `f64::NEG_INFINITY`
        /// for a one-sided upper-bound constraint
        lower_bound: f64,
        /// The highest value the sum of the terms can take, `f64::INFINITY`
        /// for a one-sided lower-bound constraint
        upper_bound: f64,
    },
}

impl Constraint {
    /// Create a new equality constraint
    ///
    /// # Parameters
    /// - `id`: Identifier for the constraint
    /// - `variables`: A slice of variable ids
    /// - `coefficients`: A slice of coefficients for the variables
    /// - `equals`: The right hand side of the equality
    pub fn new_equality(
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        equals: f64,
    ) -> Self {
        Constraint::Equality {
            id: id.to_string(),
            terms: Constraint::zip_into_terms(variables, coefficients),
            equals,
        }
    }

    /// Create a new inequality constraint
    ///
    /// # Parameters
    /// - `id`: Identifier for the constraint
    /// - `variables`: A slice of variable ids
    /// - `coefficients`: A slice of coefficients for the variables
    /// - `lower_bound`: The lowest value the constraint can take
    /// - `upper_bound`: The highest value the constraint can take
    pub fn new_inequality(
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Self {
        Constraint::Inequality {
            id: id.to_string(),
            terms: Constraint::zip_into_terms(variables, coefficients),
            lower_bound,
            upper_bound,
        }
    }

    /// Get the id of the constraint
    pub fn id(&self) -> &str {
        match self {
            Constraint::Equality { id, .. } => id,
            Constraint::Inequality { id, .. } => id,
        }
    }

    /// Get the linear terms of the constraint
    pub fn terms(&self) -> &[ConstraintTerm] {
        match self {
            Constraint::Equality { terms, .. } => terms,
            Constraint::Inequality { terms, .. } => terms,
        }
    }

    /// Take a slice of variable ids, and a slice of coefficients and zip
    /// them together into a vec of ConstraintTerms
    fn zip_into_terms(variables: &[&str], coefficients: &[f64]) -> Vec<ConstraintTerm> {
        variables
            .iter()
            .zip(coefficients)
            .map(|(var, coef)| ConstraintTerm {
                variable: var.to_string(),
                coefficient: *coef,
            })
            .collect()
    }

    /// Create a string representation of the terms in the Constraint
    fn constraint_to_string(&self) -> String {
        match self {
            Constraint::Equality { terms, equals, .. } => {
                format!("{} = {}", Self::terms_to_string(terms), equals)
            }
            Constraint::Inequality {
                terms,
                lower_bound,
                upper_bound,
                ..
            } => {
                format!(
                    "{} <= {} <= {}",
                    lower_bound,
                    Self::terms_to_string(terms),
                    upper_bound
                )
            }
        }
    }

    /// Convert a vector of terms into a String representation
    fn terms_to_string(terms: &[ConstraintTerm]) -> String {
        match terms.split_last() {
            None => "0".to_string(),
            Some((last, rest)) => {
                let mut str_rep = String::new();
                for t in rest {
                    str_rep.push_str(format!("{} + ", t).as_str());
                }
                str_rep.push_str(format!("{}", last).as_str());
                str_rep
            }
        }
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.constraint_to_string())
    }
}

/// Represents a single term in a constraint, specifically
/// represents the multiplication of the `variable` by the `coefficient`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintTerm {
    /// Id of the referenced [`Variable`](crate::optimize::variable::Variable)
    pub variable: String,
    /// The coefficient for the variable
    pub coefficient: f64,
}

impl Display for ConstraintTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*{}", self.coefficient, self.variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_display() {
        // Create a constraint representing 3*x + 2*y = 6
        let constraint = Constraint::new_equality("c", &["x", "y"], &[3., 2.], 6.);
        assert_eq!(constraint.id(), "c");
        assert_eq!(format!("{}", constraint), "3*x + 2*y = 6");
    }

    #[test]
    fn inequality_display() {
        // represents the inequality 2 <= 3*x + 2*y <= 6
        let constraint = Constraint::new_inequality("c", &["x", "y"], &[3., 2.], 2., 6.);
        assert_eq!(format!("{}", constraint), "2 <= 3*x + 2*y <= 6");
    }

    #[test]
    fn terms() {
        let constraint = Constraint::new_inequality("c", &["x", "y"], &[3., 2.], 2., 6.);
        let terms = constraint.terms();
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].variable, "x");
        assert_eq!(terms[1].coefficient, 2.);
    }
}
