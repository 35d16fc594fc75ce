//! Provides representation of a metabolic model, including reactions and metabolites
pub mod metabolite;
pub mod model;
pub mod reaction;
