//! Sequential search engines.
//!
//! Every engine drives a root [`Space`] through the search tree defined by its branchings and
//! hands out the solutions it finds through [`SearchEngine::next`]:
//! - [`Dfs`] enumerates all solutions depth-first, left to right.
//! - [`Lds`] enumerates solutions by increasing number of discrepancies (alternatives other than
//!   the first), up to a limit.
//! - [`Bab`] returns a sequence of solutions, each strictly better than the previous one.
//! - [`Restart`] returns the same sequence as [`Bab`], but restarts from the root after every
//!   solution instead of continuing from where it was found.
//!
//! Backtracking is served by a [`stack::SearchStack`]. The default [`stack::ReCoStack`] only
//! stores a copy of the space every `commit_distance` choice points and recomputes the others
//! by replaying decisions; [`stack::CopyStack`] stores a copy at every choice point.
use crate::kernel::BranchingDesc;
use crate::kernel::Constrain;
use crate::kernel::Model;
use crate::kernel::Space;
use crate::statistics::Statistics;

mod bab;
mod dfs;
mod lds;
mod options;
mod restart;
pub mod stack;

pub use bab::Bab;
pub(crate) use bab::BranchAndBound;
pub(crate) use dfs::DepthFirst;
pub use dfs::Dfs;
pub use lds::Lds;
pub(crate) use lds::Probe;
pub use options::*;
pub use restart::Restart;

/// A source of solutions.
pub trait SearchEngine<M: Model> {
    /// Search for the next solution. Returns `None` once the search tree is exhausted.
    fn next(&mut self) -> Option<Space<M>>;

    /// The statistics accumulated so far.
    fn statistics(&self) -> Statistics;
}

/// Find the first solution of `root` depth-first.
pub fn dfs<M: Model>(root: Space<M>, options: &SearchOptions) -> Option<Space<M>> {
    Dfs::new(root, options).next()
}

/// Find a best solution of `root` with branch-and-bound.
pub fn bab<M: Constrain>(root: Space<M>, options: &SearchOptions) -> Option<Space<M>> {
    let mut engine = Bab::new(root, options);

    let mut best = None;
    while let Some(solution) = engine.next() {
        best = Some(solution);
    }

    best
}

/// Find a best solution of `root` with branch-and-bound, restarting after every solution.
pub fn restart<M: Constrain>(root: Space<M>, options: &SearchOptions) -> Option<Space<M>> {
    let mut engine = Restart::new(root, options);

    let mut best = None;
    while let Some(solution) = engine.next() {
        best = Some(solution);
    }

    best
}

/// An exploration loop advanced one step at a time.
pub(crate) trait Explorer<M: Model> {
    fn has_work(&self) -> bool;

    fn step(&mut self) -> Step<M>;

    fn statistics(&self) -> Statistics;
}

/// What a single step of an engine did.
#[derive(Debug)]
#[allow(
    variant_size_differences,
    reason = "solutions are handed out by value and immediately consumed"
)]
pub(crate) enum Step<M: Model> {
    /// A space was restored from the stack; it is propagated by the next step.
    Propagating,
    /// The current space was at a choice point and committed to an alternative.
    Branching,
    Solved(Space<M>),
    Failed,
    /// A leaf with discrepancies left over was discarded.
    Skipped,
    Exhausted,
}

/// Commit `space` to `alternative` of `desc`, where `desc` was created on the path to `space`.
///
/// A rejected commit means the search stack and the space disagree, which cannot be recovered
/// from.
pub(crate) fn commit_alternative<M: Model>(
    space: &mut Space<M>,
    desc: &BranchingDesc,
    alternative: u32,
    statistics: &mut Statistics,
) {
    if let Err(error) = space.commit(desc, alternative, statistics) {
        panic!("committing a stored decision failed: {error}");
    }
}

