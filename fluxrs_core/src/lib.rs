//! Core rust implementation of fluxrs, a crate for flux simulation over
//! constraint-based metabolic models.
//!
//! Simulation methods ([`flux_analysis`]) temporarily rewrite a model's
//! objective, bounds, and constraint registries inside a transaction scope,
//! solve the resulting optimization problem, and always restore the model to
//! its prior state before returning.

pub mod configuration;
pub mod flux_analysis;
pub mod metabolic_model;
pub mod optimize;
