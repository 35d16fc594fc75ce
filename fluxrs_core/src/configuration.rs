//! Global configuration defaults shared across models and solves
use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

pub struct Configuration {
    /// Default lower flux bound for newly created reactions
    pub lower_bound: f64,
    /// Default upper flux bound for newly created reactions
    pub upper_bound: f64,
    /// Numerical tolerance used when comparing flux values
    pub tolerance: f64,
    /// Backend used to solve optimization problems
    pub solver: SolverBackend,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            tolerance: 1e-07,
            solver: SolverBackend::Microlp,
        }
    }
}

/// Enum used to specify the solver backend to use
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverBackend {
    /// Use the microlp simplex solver, which also handles mixed integer
    /// problems through branch and bound
    Microlp,
}
