//! Simulation methods predicting flux distributions of a metabolic model
//!
//! Every method follows the same discipline: open a
//! [`Transaction`](crate::flux_analysis::transaction::Transaction) over the
//! model, stage the method-specific objective and constraints through it,
//! solve, and unwind. The model is left exactly as found whether the solve
//! succeeded or failed.
use indexmap::IndexMap;
use log::{debug, warn};
use thiserror::Error;

use crate::flux_analysis::transaction::Transaction;
use crate::metabolic_model::model::{Model, ModelError, ReactionEncoding, Solution, SolveError};
use crate::optimize::constraint::Constraint;
use crate::optimize::objective::{Objective, ObjectiveSense};
use crate::optimize::variable::Variable;

/// Default allowed relative deviation from the reference flux in [`room`]
pub const ROOM_DELTA: f64 = 0.03;
/// Default allowed absolute deviation from the reference flux in [`room`]
pub const ROOM_EPSILON: f64 = 1e-3;

// Big-M bound relaxations for the room indicator rows
const ROOM_UPPER_RELAXATION: f64 = 1e6;
const ROOM_LOWER_RELAXATION: f64 = -1e6;

/// Flux balance analysis
///
/// Maximizes (or minimizes) the model objective subject to the steady-state
/// mass-balance and flux-bound constraints. When `objective` is given it
/// replaces the model objective for the duration of the call.
pub fn fba(model: &mut Model, objective: Option<Objective>) -> Result<Solution, SimulationError> {
    let mut transaction = Transaction::new(model);
    if let Some(objective) = objective {
        transaction.set_objective(objective);
    }
    let solution = checked_solve("fba", transaction.model(), transaction.model().solve())?;
    transaction.rollback();
    Ok(solution)
}

/// Parsimonious flux balance analysis
///
/// Phase 1 optimizes the (optionally replaced) model objective. Phase 2 fixes
/// that objective at its optimum and minimizes the total absolute flux, by
/// minimizing the sum of every directional variable in the split reaction
/// encoding. The returned solution carries the phase-2 fluxes; its objective
/// value is the minimal total flux.
pub fn pfba(model: &mut Model, objective: Option<Objective>) -> Result<Solution, SimulationError> {
    let mut transaction = Transaction::new(model);
    if let Some(objective) = objective {
        transaction.set_objective(objective);
    }
    // Fixing the optimum as a constraint only works for a linear objective
    let coefficients = transaction
        .model()
        .objective
        .linear_coefficients()
        .ok_or(SimulationError::NonlinearObjective { algorithm: "pfba" })?;

    debug!("pfba phase 1: optimizing the model objective");
    let phase_one = checked_solve(
        "pfba phase 1",
        transaction.model(),
        transaction.model().solve_with_encoding(ReactionEncoding::Split),
    )?;

    let (variables, coefficient_values): (Vec<String>, Vec<f64>) =
        coefficients.into_iter().unzip();
    let variable_refs: Vec<&str> = variables.iter().map(String::as_str).collect();
    let fixation = match transaction.model().objective.sense() {
        ObjectiveSense::Maximize => Constraint::new_inequality(
            "pfba_objective_fixation",
            &variable_refs,
            &coefficient_values,
            phase_one.objective_value,
            f64::INFINITY,
        ),
        ObjectiveSense::Minimize => Constraint::new_inequality(
            "pfba_objective_fixation",
            &variable_refs,
            &coefficient_values,
            f64::NEG_INFINITY,
            phase_one.objective_value,
        ),
    };
    transaction.add_constraint(fixation)?;

    let mut parsimonious = Objective::new_minimize();
    for reaction in transaction.model().reactions.values() {
        parsimonious.add_linear_term(&reaction.forward_id(), 1.);
        parsimonious.add_linear_term(&reaction.reverse_id(), 1.);
    }
    transaction.set_objective(parsimonious);

    debug!("pfba phase 2: minimizing total flux at the fixed optimum");
    let solution = checked_solve(
        "pfba phase 2",
        transaction.model(),
        transaction.model().solve_with_encoding(ReactionEncoding::Split),
    )?;
    transaction.rollback();
    Ok(solution)
}

/// Linear minimization of metabolic adjustment
///
/// Finds the flux distribution closest to `reference` in L1 distance. Each
/// referenced reaction `r` gets two non-negative deviation variables bounded
/// below by `x_r - v_ref` and `v_ref - x_r`; minimizing their sum makes the
/// objective value the exact distance at the optimum.
pub fn lmoma(
    model: &mut Model,
    reference: &IndexMap<String, f64>,
) -> Result<Solution, SimulationError> {
    let mut transaction = Transaction::new(model);
    let mut objective = Objective::new_minimize();
    for (reaction_id, &reference_flux) in reference {
        if !transaction.model().reactions.contains_key(reaction_id) {
            return Err(ModelError::UnknownReaction(reaction_id.clone()).into());
        }
        let positive = format!("u_{reaction_id}_pos");
        let negative = format!("u_{reaction_id}_neg");
        transaction.add_variable(Variable::new_continuous(&positive, 0., f64::INFINITY))?;
        transaction.add_variable(Variable::new_continuous(&negative, 0., f64::INFINITY))?;
        // u_pos - x >= -v_ref, so u_pos >= x - v_ref
        transaction.add_constraint(Constraint::new_inequality(
            &format!("lmoma_{reaction_id}_above"),
            &[positive.as_str(), reaction_id.as_str()],
            &[1., -1.],
            -reference_flux,
            f64::INFINITY,
        ))?;
        // u_neg + x >= v_ref, so u_neg >= v_ref - x
        transaction.add_constraint(Constraint::new_inequality(
            &format!("lmoma_{reaction_id}_below"),
            &[negative.as_str(), reaction_id.as_str()],
            &[1., 1.],
            reference_flux,
            f64::INFINITY,
        ))?;
        objective.add_linear_term(&positive, 1.);
        objective.add_linear_term(&negative, 1.);
    }
    transaction.set_objective(objective);
    let solution = checked_solve("lmoma", transaction.model(), transaction.model().solve())?;
    transaction.rollback();
    Ok(solution)
}

/// Quadratic minimization of metabolic adjustment
///
/// Not implemented; the quadratic distance objective needs a QP-capable
/// backend. Use [`lmoma`] for the linear variant.
pub fn moma(
    _model: &mut Model,
    _reference: &IndexMap<String, f64>,
) -> Result<Solution, SimulationError> {
    Err(SimulationError::Unimplemented("moma"))
}

/// Regulatory on/off minimization
///
/// Minimizes the number of reactions whose flux leaves the tolerance window
/// around its reference value. Each referenced reaction gets a binary
/// indicator forced to 1 by big-M rows whenever its flux escapes
/// `[v_ref - delta*|v_ref| - epsilon, v_ref + delta*|v_ref| + epsilon]`; the
/// objective value is the indicator count. Requires the MILP-capable backend.
pub fn room(
    model: &mut Model,
    reference: &IndexMap<String, f64>,
    delta: f64,
    epsilon: f64,
) -> Result<Solution, SimulationError> {
    let mut transaction = Transaction::new(model);
    let mut objective = Objective::new_minimize();
    for (reaction_id, &reference_flux) in reference {
        if !transaction.model().reactions.contains_key(reaction_id) {
            return Err(ModelError::UnknownReaction(reaction_id.clone()).into());
        }
        let indicator = format!("y_{reaction_id}");
        transaction.add_variable(Variable::new_binary(&indicator))?;
        let upper_window = reference_flux + delta * reference_flux.abs() + epsilon;
        let lower_window = reference_flux - delta * reference_flux.abs() - epsilon;
        // x + (w_u - U)*y <= w_u: inactive indicator keeps x below the window
        transaction.add_constraint(Constraint::new_inequality(
            &format!("room_{reaction_id}_above"),
            &[reaction_id.as_str(), indicator.as_str()],
            &[1., upper_window - ROOM_UPPER_RELAXATION],
            f64::NEG_INFINITY,
            upper_window,
        ))?;
        // x + (w_l - L)*y >= w_l: inactive indicator keeps x above the window
        transaction.add_constraint(Constraint::new_inequality(
            &format!("room_{reaction_id}_below"),
            &[reaction_id.as_str(), indicator.as_str()],
            &[1., lower_window - ROOM_LOWER_RELAXATION],
            lower_window,
            f64::INFINITY,
        ))?;
        objective.add_linear_term(&indicator, 1.);
    }
    transaction.set_objective(objective);
    let solution = checked_solve("room", transaction.model(), transaction.model().solve())?;
    transaction.rollback();
    Ok(solution)
}

/// Translate a solve failure into a [`SimulationError::Solve`] carrying the
/// algorithm name and the objective that was active
pub(crate) fn checked_solve(
    algorithm: &'static str,
    model: &Model,
    result: Result<Solution, SolveError>,
) -> Result<Solution, SimulationError> {
    result.map_err(|source| {
        let objective = model.objective.to_string();
        warn!("{algorithm} could not find an optimal solution for objective {objective}: {source}");
        SimulationError::Solve {
            algorithm,
            objective,
            source,
        }
    })
}

/// Errors surfaced by the simulation methods
///
/// Solver failures are never swallowed or retried; they are re-raised after
/// the transaction has restored the model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// The backend could not produce an optimum for the staged problem
    #[error("{algorithm} could not find an optimal solution for objective {objective}: {source}")]
    Solve {
        algorithm: &'static str,
        objective: String,
        source: SolveError,
    },
    /// Construction-time misuse, like an unknown reference reaction id
    #[error(transparent)]
    Model(#[from] ModelError),
    /// A quadratic objective was given to a linear-only formulation
    #[error("{algorithm} requires a linear objective")]
    NonlinearObjective { algorithm: &'static str },
    /// A required flux value was missing from the input flux map
    #[error("no flux value provided for reaction {0}")]
    MissingFlux(String),
    /// The method is a known placeholder
    #[error("{0} is not implemented")]
    Unimplemented(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::metabolite::MetaboliteBuilder;
    use crate::metabolic_model::reaction::ReactionBuilder;
    use crate::optimize::solvers::SolverError;
    use indexmap::indexmap;

    /// Metabolite A imported by the exchange EX_A, drained by the internal
    /// reaction R1, with the model objective maximizing R1
    fn toy_model(exchange_lower: f64, exchange_upper: f64) -> Model {
        let mut model = Model::new_empty();
        model.add_metabolite(MetaboliteBuilder::default().id("A").build().unwrap());
        model.add_reaction(
            ReactionBuilder::default()
                .id("EX_A")
                .metabolites(indexmap! {"A".to_string() => 1.})
                .lower_bound(exchange_lower)
                .upper_bound(exchange_upper)
                .boundary(true)
                .build()
                .unwrap(),
        );
        model.add_reaction(
            ReactionBuilder::default()
                .id("R1")
                .metabolites(indexmap! {"A".to_string() => -1.})
                .lower_bound(-100.)
                .upper_bound(100.)
                .build()
                .unwrap(),
        );
        let mut objective = Objective::new_maximize();
        objective.add_linear_term("R1", 1.);
        model.set_objective(objective);
        model
    }

    #[test]
    fn fba_toy_model() {
        let mut model = toy_model(10., 10.);
        let snapshot = model.clone();
        let solution = fba(&mut model, None).unwrap();
        assert!((solution.objective_value - 10.).abs() < 1e-6);
        assert!((solution.fluxes["R1"] - 10.).abs() < 1e-6);
        assert!((solution.fluxes["EX_A"] - 10.).abs() < 1e-6);
        assert_eq!(model, snapshot);
    }

    #[test]
    fn fba_with_objective_swap() {
        let mut model = toy_model(10., 10.);
        let snapshot = model.clone();
        let mut objective = Objective::new_maximize();
        objective.add_linear_term("EX_A", 1.);
        let solution = fba(&mut model, Some(objective)).unwrap();
        assert!((solution.objective_value - 10.).abs() < 1e-6);
        // The replacement objective does not outlive the call
        assert_eq!(model, snapshot);
    }

    #[test]
    fn fba_infeasible_restores_model() {
        let mut model = toy_model(10., 10.);
        model.reactions.get_mut("R1").unwrap().knock_out();
        let snapshot = model.clone();
        let error = fba(&mut model, None).unwrap_err();
        match error {
            SimulationError::Solve {
                algorithm, source, ..
            } => {
                assert_eq!(algorithm, "fba");
                assert_eq!(source, SolveError::Solver(SolverError::Infeasible));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(model, snapshot);
    }

    #[test]
    fn pfba_reproduces_the_fba_optimum() {
        let mut model = toy_model(0., 10.);
        let snapshot = model.clone();
        let solution = pfba(&mut model, None).unwrap();
        // The original objective evaluated on the parsimonious fluxes matches
        // the phase-1 optimum
        assert!((model.objective.evaluate(&solution.fluxes) - 10.).abs() < 1e-6);
        // Total flux is 10 through the exchange plus 10 through R1
        assert!((solution.objective_value - 20.).abs() < 1e-6);
        assert_eq!(model, snapshot);
    }

    #[test]
    fn pfba_rejects_quadratic_objective() {
        let mut model = toy_model(0., 10.);
        let snapshot = model.clone();
        let mut objective = Objective::new_maximize();
        objective.add_quadratic_term("R1", "R1", 1.);
        assert_eq!(
            pfba(&mut model, Some(objective)),
            Err(SimulationError::NonlinearObjective { algorithm: "pfba" })
        );
        assert_eq!(model, snapshot);
    }

    #[test]
    fn lmoma_distance_is_exact() {
        let mut model = toy_model(0., 100.);
        model.reactions.get_mut("R1").unwrap().knock_out();
        let snapshot = model.clone();
        let reference = indexmap! {"R1".to_string() => 10.};
        let solution = lmoma(&mut model, &reference).unwrap();
        // R1 is pinned at zero, so the L1 distance to the reference is 10
        assert!((solution.objective_value - 10.).abs() < 1e-6);
        assert!(solution.fluxes["R1"].abs() < 1e-6);
        assert_eq!(model, snapshot);
    }

    #[test]
    fn lmoma_unknown_reference_reaction() {
        let mut model = toy_model(0., 100.);
        let snapshot = model.clone();
        let reference = indexmap! {"R1".to_string() => 10., "ghost".to_string() => 1.};
        assert_eq!(
            lmoma(&mut model, &reference),
            Err(SimulationError::Model(ModelError::UnknownReaction(
                "ghost".to_string()
            )))
        );
        assert_eq!(model, snapshot);
    }

    #[test]
    fn room_indicator_count_shrinks_with_wider_windows() {
        let mut model = toy_model(0., 100.);
        model.reactions.get_mut("R1").unwrap().knock_out();
        let snapshot = model.clone();
        let reference = indexmap! {"EX_A".to_string() => 10., "R1".to_string() => 10.};

        // Both fluxes are forced to zero, well outside the tight windows
        let tight = room(&mut model, &reference, ROOM_DELTA, ROOM_EPSILON).unwrap();
        assert!((tight.objective_value - 2.).abs() < 1e-6);
        assert_eq!(model, snapshot);

        // A window wide enough to contain zero needs no indicators
        let loose = room(&mut model, &reference, 2., ROOM_EPSILON).unwrap();
        assert!(loose.objective_value.abs() < 1e-6);
        assert!(loose.objective_value <= tight.objective_value);
        assert_eq!(model, snapshot);
    }

    #[test]
    fn moma_is_a_placeholder() {
        let mut model = toy_model(10., 10.);
        let reference = indexmap! {"R1".to_string() => 10.};
        assert_eq!(
            moma(&mut model, &reference),
            Err(SimulationError::Unimplemented("moma"))
        );
    }
}
