//! The stacks that remember the open choice points of a depth-first exploration.
//!
//! A stack stores one node per choice point on the path from the root to the current space. A
//! node records which alternative is being explored and how many remain, together with the
//! [`BranchingDesc`] needed to commit to them. Backtracking asks the stack for the space of the
//! next alternative; how that space is obtained (from a stored copy or by replaying decisions)
//! is up to the stack.
use std::fmt::Debug;
use std::sync::Arc;

use crate::kernel::BranchingDesc;
use crate::kernel::Model;
use crate::kernel::Space;
use crate::statistics::Statistics;

mod copy_stack;
mod reco_stack;

pub use copy_stack::CopyStack;
pub use reco_stack::ReCoStack;

pub trait SearchStack<M: Model>: Debug + Send {
    /// Push a node for the choice point `desc` of `space`, which is about to be committed to
    /// its first alternative.
    ///
    /// `distance` counts the commits since the last stored copy; the stack decides whether to
    /// store a copy of `space` and updates it accordingly.
    fn push(
        &mut self,
        space: &Space<M>,
        desc: Arc<BranchingDesc>,
        distance: &mut u32,
        statistics: &mut Statistics,
    );

    /// Move to the next open alternative, discarding exhausted nodes. Returns false when no
    /// alternative is left.
    fn next(&mut self) -> bool;

    /// Produce the space for the alternative selected by [`SearchStack::next`].
    fn recompute(&mut self, distance: &mut u32, statistics: &mut Statistics) -> Space<M>;

    /// The number of nodes on the stack.
    fn entries(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.entries() == 0
    }

    fn reset(&mut self);

    /// An estimate of the memory held by the stack, in bytes.
    fn memory(&self) -> usize;
}

