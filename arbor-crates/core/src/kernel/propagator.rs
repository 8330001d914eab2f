use std::fmt::Debug;

use dyn_clone::DynClone;

use super::VariableId;

// Allow Box<dyn Propagator<M>> to be cloned
dyn_clone::clone_trait_object!(<M> Propagator<M>);

/// A propagator removes values from the domains of the variables of a model `M` which cannot be
/// part of any solution.
///
/// A propagator is posted on a [`crate::Space`], which subscribes it to the variables returned
/// by [`Propagator::variables`]. Whenever one of those variables is modified by another
/// propagator or by a branching, the propagator is scheduled with its [`Priority`]. When it runs
/// it reports one of:
/// - [`ExecStatus::Fix`]: the propagator is at its own fixpoint and only needs to run again when
///   a subscribed variable changes.
/// - [`ExecStatus::NoFix`]: the propagator should be scheduled again. A propagator is never
///   woken up by its own modifications, so this is how it asks for another run.
/// - [`ExecStatus::Subsumed`]: the propagator can never prune again and is removed from the
///   space.
/// - [`Inconsistency`]: the space is failed.
///
/// Propagators are cloned whenever the space holding them is cloned, hence the [`DynClone`]
/// bound. They must not share mutable state with propagators in other spaces.
pub trait Propagator<M>: Debug + DynClone + Send {
    /// Name used in logging and debugging output.
    fn name(&self) -> &str;

    /// The variables this propagator is subscribed to.
    fn variables(&self) -> Vec<VariableId>;

    /// The queue this propagator is scheduled in. Higher priorities are always run first.
    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&mut self, context: &mut PropagationContext<'_, M>) -> PropagationStatus;
}

/// The result of running a propagator.
pub type PropagationStatus = Result<ExecStatus, Inconsistency>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    Fix,
    NoFix,
    Subsumed,
}

/// Signals that a space can not contain any solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Inconsistency;

/// The scheduling priority of a propagator; [`Priority::High`] propagators run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Priority {
    High = 0,
    #[default]
    Medium = 1,
    Low = 2,
    VeryLow = 3,
}

impl Priority {
    pub(crate) const LEVELS: usize = 4;
}

/// Access to the model of a space while a propagator or branching runs.
///
/// Reads go through [`PropagationContext::model`]; every write goes through
/// [`PropagationContext::modify`], which records the modified variable so that its subscribers
/// are scheduled once the running actor returns.
#[derive(Debug)]
pub struct PropagationContext<'a, M> {
    model: &'a mut M,
    modified: &'a mut Vec<VariableId>,
}

impl<'a, M> PropagationContext<'a, M> {
    pub(crate) fn new(model: &'a mut M, modified: &'a mut Vec<VariableId>) -> Self {
        PropagationContext { model, modified }
    }

    pub fn model(&self) -> &M {
        &*self.model
    }

    /// Apply `change` to the model as a modification of `variable`.
    ///
    /// The closure returns whether the domain of `variable` changed, or an [`Inconsistency`] when
    /// it became empty.
    pub fn modify<F>(&mut self, variable: VariableId, change: F) -> Result<bool, Inconsistency>
    where
        F: FnOnce(&mut M) -> Result<bool, Inconsistency>,
    {
        let changed = change(&mut *self.model)?;
        if changed {
            self.modified.push(variable);
        }

        Ok(changed)
    }
}
