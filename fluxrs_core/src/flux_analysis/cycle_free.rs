//! Projection of a flux distribution onto its cycle-free equivalent
use indexmap::IndexMap;

use crate::flux_analysis::simulation::{checked_solve, SimulationError};
use crate::flux_analysis::transaction::Transaction;
use crate::metabolic_model::model::{Model, Solution};
use crate::optimize::objective::Objective;

/// Remove thermodynamically infeasible internal cycles from `fluxes`
///
/// Exchange reactions are pinned to their given flux, so the projection keeps
/// the same exchange behavior. Every internal reaction is confined to the
/// interval between zero and its given flux and contributes its magnitude to
/// a minimization objective; a reaction with zero flux keeps its original
/// bounds and contributes nothing. Reactions named in `fix` are pinned like
/// exchanges. The result carries the same sign pattern with no larger
/// magnitudes, with any flux that only circulated in a loop removed.
pub fn cycle_free_flux(
    model: &mut Model,
    fluxes: &IndexMap<String, f64>,
    fix: &[&str],
) -> Result<Solution, SimulationError> {
    let mut transaction = Transaction::new(model);
    let mut objective = Objective::new_minimize();
    let reactions: Vec<(String, bool)> = transaction
        .model()
        .reactions
        .values()
        .map(|reaction| (reaction.id.clone(), reaction.boundary))
        .collect();
    for (reaction_id, boundary) in &reactions {
        let flux = flux_for(fluxes, reaction_id)?;
        if *boundary {
            transaction.set_reaction_bounds(reaction_id, flux, flux)?;
        } else if flux > 0. {
            transaction.set_reaction_bounds(reaction_id, 0., flux)?;
            objective.add_linear_term(reaction_id, 1.);
        } else if flux < 0. {
            transaction.set_reaction_bounds(reaction_id, flux, 0.)?;
            objective.add_linear_term(reaction_id, -1.);
        }
    }
    for reaction_id in fix {
        let flux = flux_for(fluxes, reaction_id)?;
        transaction.set_reaction_bounds(reaction_id, flux, flux)?;
    }
    transaction.set_objective(objective);
    let solution = checked_solve(
        "cycle_free_flux",
        transaction.model(),
        transaction.model().optimize(),
    )?;
    transaction.rollback();
    Ok(solution)
}

fn flux_for(fluxes: &IndexMap<String, f64>, reaction_id: &str) -> Result<f64, SimulationError> {
    fluxes
        .get(reaction_id)
        .copied()
        .ok_or_else(|| SimulationError::MissingFlux(reaction_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::metabolite::MetaboliteBuilder;
    use crate::metabolic_model::reaction::ReactionBuilder;
    use indexmap::indexmap;

    /// A is imported, converted to B by R1, converted back by R2, and B is
    /// exported; R1/R2 can carry an arbitrary internal cycle on top of the
    /// productive flux
    fn loop_model(reverse_cycle: bool) -> Model {
        let mut model = Model::new_empty();
        model.add_metabolite(MetaboliteBuilder::default().id("A").build().unwrap());
        model.add_metabolite(MetaboliteBuilder::default().id("B").build().unwrap());
        model.add_reaction(
            ReactionBuilder::default()
                .id("EX_A")
                .metabolites(indexmap! {"A".to_string() => 1.})
                .lower_bound(10.)
                .upper_bound(10.)
                .boundary(true)
                .build()
                .unwrap(),
        );
        model.add_reaction(
            ReactionBuilder::default()
                .id("R1")
                .metabolites(indexmap! {"A".to_string() => -1., "B".to_string() => 1.})
                .lower_bound(-1000.)
                .upper_bound(1000.)
                .build()
                .unwrap(),
        );
        let cycle_metabolites = if reverse_cycle {
            // Same orientation as R1; the cycle runs it backwards
            indexmap! {"A".to_string() => -1., "B".to_string() => 1.}
        } else {
            indexmap! {"A".to_string() => 1., "B".to_string() => -1.}
        };
        model.add_reaction(
            ReactionBuilder::default()
                .id("R2")
                .metabolites(cycle_metabolites)
                .lower_bound(-1000.)
                .upper_bound(1000.)
                .build()
                .unwrap(),
        );
        model.add_reaction(
            ReactionBuilder::default()
                .id("EX_B")
                .metabolites(indexmap! {"B".to_string() => -1.})
                .lower_bound(0.)
                .upper_bound(100.)
                .boundary(true)
                .build()
                .unwrap(),
        );
        model
    }

    #[test]
    fn removes_internal_loop() {
        let mut model = loop_model(false);
        let snapshot = model.clone();
        // 100 units circulate through R1/R2 on top of the productive 10
        let fluxes = indexmap! {
            "EX_A".to_string() => 10.,
            "R1".to_string() => 110.,
            "R2".to_string() => 100.,
            "EX_B".to_string() => 10.,
        };
        let solution = cycle_free_flux(&mut model, &fluxes, &[]).unwrap();
        assert!((solution.fluxes["R1"] - 10.).abs() < 1e-6);
        assert!(solution.fluxes["R2"].abs() < 1e-6);
        assert!((solution.fluxes["EX_A"] - 10.).abs() < 1e-6);
        assert!((solution.fluxes["EX_B"] - 10.).abs() < 1e-6);
        assert_eq!(model, snapshot);
    }

    #[test]
    fn preserves_signs_and_magnitudes() {
        let mut model = loop_model(true);
        let snapshot = model.clone();
        let fluxes = indexmap! {
            "EX_A".to_string() => 10.,
            "R1".to_string() => 110.,
            "R2".to_string() => -100.,
            "EX_B".to_string() => 10.,
        };
        let solution = cycle_free_flux(&mut model, &fluxes, &[]).unwrap();
        for (reaction_id, &input_flux) in &fluxes {
            let output_flux = solution.fluxes[reaction_id];
            assert!(
                output_flux * input_flux >= 0.,
                "sign flipped for {reaction_id}"
            );
            assert!(
                output_flux.abs() <= input_flux.abs() + 1e-6,
                "magnitude grew for {reaction_id}"
            );
        }
        assert!((solution.fluxes["R1"] - 10.).abs() < 1e-6);
        assert!(solution.fluxes["R2"].abs() < 1e-6);
        assert_eq!(model, snapshot);
    }

    #[test]
    fn fixed_reactions_keep_their_flux() {
        let mut model = loop_model(false);
        let fluxes = indexmap! {
            "EX_A".to_string() => 10.,
            "R1".to_string() => 110.,
            "R2".to_string() => 100.,
            "EX_B".to_string() => 10.,
        };
        let solution = cycle_free_flux(&mut model, &fluxes, &["R2"]).unwrap();
        // Pinning R2 forces the loop flux to stay in R1 as well
        assert!((solution.fluxes["R2"] - 100.).abs() < 1e-6);
        assert!((solution.fluxes["R1"] - 110.).abs() < 1e-6);
    }

    #[test]
    fn missing_flux_entry() {
        let mut model = loop_model(false);
        let snapshot = model.clone();
        let fluxes = indexmap! {
            "EX_A".to_string() => 10.,
            "R1".to_string() => 110.,
        };
        assert_eq!(
            cycle_free_flux(&mut model, &fluxes, &[]),
            Err(SimulationError::MissingFlux("R2".to_string()))
        );
        assert_eq!(model, snapshot);
    }

    #[test]
    fn zero_flux_reactions_stay_unconstrained() {
        let mut model = loop_model(false);
        let snapshot = model.clone();
        let fluxes = indexmap! {
            "EX_A".to_string() => 10.,
            "R1".to_string() => 10.,
            "R2".to_string() => 0.,
            "EX_B".to_string() => 10.,
        };
        let solution = cycle_free_flux(&mut model, &fluxes, &[]).unwrap();
        // R2 keeps its original bounds and carries no penalty, so the
        // cheapest route drains A through R2 running backwards while the
        // penalized R1 drops to zero
        assert!(solution.fluxes["R1"].abs() < 1e-6);
        assert!((solution.fluxes["R2"] + 10.).abs() < 1e-6);
        assert!(solution.objective_value.abs() < 1e-6);
        assert_eq!(model, snapshot);
    }
}
