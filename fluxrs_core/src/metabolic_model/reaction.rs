//! This module provides a struct for representing reactions
use std::hash::{DefaultHasher, Hash, Hasher};

use derive_builder::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::configuration::CONFIGURATION;

/// Represents a reaction in the metabolic model
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Metabolite stoichiometry of the reaction
    #[builder(default = "IndexMap::new()")]
    pub metabolites: IndexMap<String, f64>,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Lower flux bound
    #[builder(default = "CONFIGURATION.read().unwrap().lower_bound")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "CONFIGURATION.read().unwrap().upper_bound")]
    pub upper_bound: f64,
    /// Whether this reaction exchanges mass with the environment, as opposed
    /// to an internal network reaction
    #[builder(default = "false")]
    pub boundary: bool,
}

impl Reaction {
    /// Determine the id associated with the forward variable when the
    /// reaction is split into two non-negative directional variables
    ///
    /// # Note:
    /// The forward id is "{reaction_id}_forward"
    pub fn forward_id(&self) -> String {
        format!("{}_forward", &self.id)
    }

    /// Determine the id associated with the reverse variable when the
    /// reaction is split into two non-negative directional variables
    ///
    /// # Note:
    /// The reverse id is "{reaction_id}_reverse_{hexadecimal hash of reaction_id}"
    pub fn reverse_id(&self) -> String {
        format!("{}_reverse_{}", &self.id, hash_as_hex_string(&self.id))
    }

    /// Determine the upper bound of the forward directional variable
    pub(crate) fn forward_upper_bound(&self) -> f64 {
        if self.upper_bound > 0f64 {
            self.upper_bound
        } else {
            0f64
        }
    }

    /// Determine the lower bound of the forward directional variable
    pub(crate) fn forward_lower_bound(&self) -> f64 {
        if self.lower_bound > 0f64 {
            self.lower_bound
        } else {
            0f64
        }
    }

    /// Determine the upper bound of the reverse directional variable
    pub(crate) fn reverse_upper_bound(&self) -> f64 {
        if self.lower_bound < 0f64 {
            -self.lower_bound
        } else {
            0f64
        }
    }

    /// Determine the lower bound of the reverse directional variable
    pub(crate) fn reverse_lower_bound(&self) -> f64 {
        if self.upper_bound < 0f64 {
            -self.upper_bound
        } else {
            0f64
        }
    }

    /// Force the reaction to carry no flux by setting both bounds to zero
    pub fn knock_out(&mut self) {
        self.lower_bound = 0f64;
        self.upper_bound = 0f64;
    }
}

fn calculate_hash<T: Hash>(t: &T) -> u64 {
    let mut s = DefaultHasher::new();
    t.hash(&mut s);
    s.finish()
}

fn hash_as_hex_string<T: Hash>(t: &T) -> String {
    format!("{:x}", calculate_hash(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let reaction = ReactionBuilder::default().id("R1").build().unwrap();
        let configuration = CONFIGURATION.read().unwrap();
        assert_eq!(reaction.lower_bound, configuration.lower_bound);
        assert_eq!(reaction.upper_bound, configuration.upper_bound);
        assert!(!reaction.boundary);
        assert!(reaction.metabolites.is_empty());
    }

    #[test]
    fn directional_ids() {
        let reaction = ReactionBuilder::default().id("R1").build().unwrap();
        assert_eq!(reaction.forward_id(), "R1_forward");
        assert!(reaction.reverse_id().starts_with("R1_reverse_"));
        // The hash suffix keeps reverse ids distinct between reactions
        let other = ReactionBuilder::default().id("R2").build().unwrap();
        assert_ne!(reaction.reverse_id(), other.reverse_id());
    }

    #[test]
    fn split_bounds_reversible() {
        let reaction = ReactionBuilder::default()
            .id("R1")
            .lower_bound(-100.)
            .upper_bound(100.)
            .build()
            .unwrap();
        assert_eq!(reaction.forward_lower_bound(), 0.);
        assert_eq!(reaction.forward_upper_bound(), 100.);
        assert_eq!(reaction.reverse_lower_bound(), 0.);
        assert_eq!(reaction.reverse_upper_bound(), 100.);
    }

    #[test]
    fn split_bounds_irreversible_forward() {
        let reaction = ReactionBuilder::default()
            .id("R1")
            .lower_bound(2.)
            .upper_bound(10.)
            .build()
            .unwrap();
        assert_eq!(reaction.forward_lower_bound(), 2.);
        assert_eq!(reaction.forward_upper_bound(), 10.);
        assert_eq!(reaction.reverse_lower_bound(), 0.);
        assert_eq!(reaction.reverse_upper_bound(), 0.);
    }

    #[test]
    fn split_bounds_irreversible_reverse() {
        let reaction = ReactionBuilder::default()
            .id("R1")
            .lower_bound(-10.)
            .upper_bound(-2.)
            .build()
            .unwrap();
        assert_eq!(reaction.forward_lower_bound(), 0.);
        assert_eq!(reaction.forward_upper_bound(), 0.);
        assert_eq!(reaction.reverse_lower_bound(), 2.);
        assert_eq!(reaction.reverse_upper_bound(), 10.);
    }

    #[test]
    fn knock_out() {
        let mut reaction = ReactionBuilder::default()
            .id("R1")
            .lower_bound(-100.)
            .upper_bound(100.)
            .build()
            .unwrap();
        reaction.knock_out();
        assert_eq!(reaction.lower_bound, 0.);
        assert_eq!(reaction.upper_bound, 0.);
    }
}
