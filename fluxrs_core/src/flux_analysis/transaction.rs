//! Undo-capable model mutation for the duration of one simulation
use crate::metabolic_model::model::{Model, ModelError};
use crate::optimize::constraint::Constraint;
use crate::optimize::objective::Objective;
use crate::optimize::variable::Variable;

/// A reversible mutation applied to a model
///
/// Each entry captures exactly the state needed to undo the mutation that
/// produced it.
#[derive(Debug, Clone)]
enum ModelChange {
    ObjectiveReplaced {
        previous: Objective,
    },
    BoundsChanged {
        reaction: String,
        previous_lower: f64,
        previous_upper: f64,
    },
    VariableAdded {
        id: String,
    },
    ConstraintAdded {
        id: String,
    },
}

/// Exclusive mutation scope over a model that records every change and
/// undoes all of them when it goes out of scope
///
/// The simulation methods route all of their temporary model edits through a
/// `Transaction`, so the model compares equal to its pre-simulation state
/// afterwards, whether the simulation succeeded or bailed out early with `?`.
/// Unwinding runs in `Drop`; every mutating method captures prior state
/// before applying, so a recorded entry is always an exact inverse and the
/// unwind cannot fail.
pub struct Transaction<'m> {
    model: &'m mut Model,
    changes: Vec<ModelChange>,
}

impl<'m> Transaction<'m> {
    /// Open a transaction over the model
    pub fn new(model: &'m mut Model) -> Self {
        Transaction {
            model,
            changes: Vec::new(),
        }
    }

    /// Read access to the model in its current (mutated) state
    pub fn model(&self) -> &Model {
        self.model
    }

    /// Replace the model objective
    pub fn set_objective(&mut self, objective: Objective) {
        let previous = self.model.set_objective(objective);
        self.changes.push(ModelChange::ObjectiveReplaced { previous });
    }

    /// Update a reaction's flux bounds
    pub fn set_reaction_bounds(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ModelError> {
        let (previous_lower, previous_upper) =
            self.model.set_reaction_bounds(id, lower_bound, upper_bound)?;
        self.changes.push(ModelChange::BoundsChanged {
            reaction: id.to_string(),
            previous_lower,
            previous_upper,
        });
        Ok(())
    }

    /// Register an auxiliary solver variable on the model
    pub fn add_variable(&mut self, variable: Variable) -> Result<(), ModelError> {
        let id = variable.id.clone();
        self.model.add_auxiliary_variable(variable)?;
        self.changes.push(ModelChange::VariableAdded { id });
        Ok(())
    }

    /// Register an auxiliary constraint on the model
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), ModelError> {
        let id = constraint.id().to_string();
        self.model.add_auxiliary_constraint(constraint)?;
        self.changes.push(ModelChange::ConstraintAdded { id });
        Ok(())
    }

    /// Undo every recorded change and release the model
    ///
    /// Equivalent to dropping the transaction; spelled out so the success
    /// path reads explicitly.
    pub fn rollback(self) {}
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        // Strict reverse order, so overlapping edits to the same reaction or
        // objective unwind to the original state
        while let Some(change) = self.changes.pop() {
            match change {
                ModelChange::ObjectiveReplaced { previous } => {
                    self.model.set_objective(previous);
                }
                ModelChange::BoundsChanged {
                    reaction,
                    previous_lower,
                    previous_upper,
                } => {
                    if let Some(reaction) = self.model.reactions.get_mut(&reaction) {
                        reaction.lower_bound = previous_lower;
                        reaction.upper_bound = previous_upper;
                    }
                }
                ModelChange::VariableAdded { id } => {
                    let _ = self.model.remove_auxiliary_variable(&id);
                }
                ModelChange::ConstraintAdded { id } => {
                    let _ = self.model.remove_auxiliary_constraint(&id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::reaction::ReactionBuilder;

    fn small_model() -> Model {
        let mut model = Model::new_empty();
        model.add_reaction(
            ReactionBuilder::default()
                .id("R1")
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
    fn bounds_unwind_in_reverse_order() {
        let mut model = small_model();
        let snapshot = model.clone();
        {
            let mut transaction = Transaction::new(&mut model);
            transaction.set_reaction_bounds("R1", 0., 50.).unwrap();
            transaction.set_reaction_bounds("R1", 5., 5.).unwrap();
            assert_eq!(transaction.model().reactions["R1"].lower_bound, 5.);
        }
        assert_eq!(model, snapshot);
    }

    #[test]
    fn objective_restored() {
        let mut model = small_model();
        let snapshot = model.clone();
        {
            let mut transaction = Transaction::new(&mut model);
            transaction.set_objective(Objective::new_minimize());
            assert!(transaction.model().objective.terms().is_empty());
        }
        assert_eq!(model, snapshot);
    }

    #[test]
    fn registries_emptied_on_unwind() {
        let mut model = small_model();
        let snapshot = model.clone();
        {
            let mut transaction = Transaction::new(&mut model);
            transaction
                .add_variable(Variable::new_continuous("u", 0., f64::INFINITY))
                .unwrap();
            transaction
                .add_constraint(Constraint::new_inequality(
                    "c",
                    &["u", "R1"],
                    &[1., -1.],
                    0.,
                    f64::INFINITY,
                ))
                .unwrap();
            assert_eq!(transaction.model().auxiliary_variables().len(), 1);
            assert_eq!(transaction.model().auxiliary_constraints().len(), 1);
        }
        assert_eq!(model, snapshot);
    }

    #[test]
    fn failed_mutation_records_nothing() {
        let mut model = small_model();
        let snapshot = model.clone();
        {
            let mut transaction = Transaction::new(&mut model);
            assert!(transaction.set_reaction_bounds("nope", 0., 0.).is_err());
            assert!(transaction
                .add_variable(Variable::new_continuous("R1", 0., 1.))
                .is_err());
        }
        assert_eq!(model, snapshot);
    }

    #[test]
    fn early_return_unwinds() {
        fn mutate_then_fail(model: &mut Model) -> Result<(), ModelError> {
            let mut transaction = Transaction::new(model);
            transaction.set_reaction_bounds("R1", 0., 0.)?;
            transaction.set_reaction_bounds("missing", 0., 0.)?;
            transaction.rollback();
            Ok(())
        }

        let mut model = small_model();
        let snapshot = model.clone();
        assert!(mutate_then_fail(&mut model).is_err());
        assert_eq!(model, snapshot);
    }

    #[test]
    fn rollback_on_success_path() {
        let mut model = small_model();
        let snapshot = model.clone();
        let mut transaction = Transaction::new(&mut model);
        transaction.set_reaction_bounds("R1", 0., 10.).unwrap();
        transaction.rollback();
        assert_eq!(model, snapshot);
    }
}
