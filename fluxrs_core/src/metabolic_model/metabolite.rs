//! This module provides a struct for representing metabolites
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Represents a metabolite in the metabolic model
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct Metabolite {
    /// Used to identify the metabolite
    pub id: String,
    /// Human-readable metabolite name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Compartment the metabolite belongs to
    #[builder(default = "None")]
    pub compartment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let metabolite = MetaboliteBuilder::default()
            .id("glc__D_e")
            .name("D-Glucose".to_string())
            .compartment("e".to_string())
            .build()
            .unwrap();
        assert_eq!(metabolite.id, "glc__D_e");
        assert_eq!(metabolite.name.as_deref(), Some("D-Glucose"));
        assert_eq!(metabolite.compartment.as_deref(), Some("e"));
    }
}
