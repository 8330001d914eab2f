use std::fmt::Debug;

use dyn_clone::DynClone;

use super::BranchingId;
use super::Inconsistency;
use super::PropagationContext;

// Allow Box<dyn Branching<M>> to be cloned
dyn_clone::clone_trait_object!(<M> Branching<M>);

/// A branching decides how a space at a fixpoint is split into alternatives.
///
/// Branchings are kept in the order in which they were posted. When a space is asked for its
/// status, the first branching which still has alternatives describes the next choice point
/// through [`Branching::description`]; the search engines later hand that description back to
/// [`Branching::commit`], possibly on a different (cloned or recomputed) space.
///
/// The description must be a function of the model only: recomputation replays stored
/// descriptions on spaces that never called [`Branching::description`] themselves, so a
/// branching must not depend on how many descriptions it has produced.
pub trait Branching<M>: Debug + DynClone + Send {
    fn name(&self) -> &str;

    /// Whether this branching has alternatives left in `model`.
    fn status(&self, model: &M) -> bool;

    /// Describe the choice point of `model`. Only called when [`Branching::status`] is true.
    fn description(&self, id: BranchingId, model: &M) -> BranchingDesc;

    /// Apply `alternative` of `desc` to the model.
    fn commit(
        &self,
        context: &mut PropagationContext<'_, M>,
        desc: &BranchingDesc,
        alternative: u32,
    ) -> Result<(), Inconsistency>;
}

/// An immutable description of a choice point.
///
/// A description records which branching produced it, how many alternatives the choice point
/// has, and the values the branching needs to commit to any of them (typically a variable and a
/// value). It is shared between the space that produced it and the stack node that keeps it for
/// recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchingDesc {
    branching: BranchingId,
    alternatives: u32,
    values: Box<[i64]>,
}

impl BranchingDesc {
    pub fn new(branching: BranchingId, alternatives: u32, values: impl Into<Box<[i64]>>) -> Self {
        crate::arbor_assert_simple!(
            alternatives > 0,
            "a choice point has at least one alternative"
        );

        BranchingDesc {
            branching,
            alternatives,
            values: values.into(),
        }
    }

    pub fn branching(&self) -> BranchingId {
        self.branching
    }

    pub fn alternatives(&self) -> u32 {
        self.alternatives
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// The value at `index`; panics when the branching did not record it.
    pub fn value(&self, index: usize) -> i64 {
        self.values[index]
    }
}
