use std::sync::Arc;

use log::debug;

use super::commit_alternative;
use super::stack::CopyStack;
use super::stack::ReCoStack;
use super::stack::SearchStack;
use super::Explorer;
use super::SearchEngine;
use super::SearchOptions;
use super::Step;
use crate::kernel::Model;
use crate::kernel::Space;
use crate::kernel::SpaceStatus;
use crate::parallel::ShareStrategy;
use crate::statistics::Statistics;

/// The depth-first exploration loop shared by [`Dfs`] and the parallel workers.
#[derive(Debug)]
pub(crate) struct DepthFirst<M: Model, S: SearchStack<M>> {
    current: Option<Space<M>>,
    stack: S,
    /// Commits since the last stored copy.
    distance: u32,
    statistics: Statistics,
}

impl<M: Model, S: SearchStack<M>> DepthFirst<M, S> {
    pub(crate) fn new(root: Option<Space<M>>, stack: S) -> Self {
        DepthFirst {
            current: root,
            stack,
            distance: 0,
            statistics: Statistics::default(),
        }
    }

    /// Start exploring the subtree rooted at `root`, discarding any remaining work.
    pub(crate) fn reset(&mut self, root: Space<M>) {
        self.stack.reset();
        self.current = Some(root);
        self.distance = 0;
    }

    /// Drop all remaining work.
    pub(crate) fn clear(&mut self) {
        self.stack.reset();
        self.current = None;
    }

    pub(crate) fn statistics_mut(&mut self) -> &mut Statistics {
        &mut self.statistics
    }
}

impl<M: Model, S: SearchStack<M>> Explorer<M> for DepthFirst<M, S> {
    fn has_work(&self) -> bool {
        self.current.is_some() || !self.stack.is_empty()
    }

    fn statistics(&self) -> Statistics {
        self.statistics
    }

    fn step(&mut self) -> Step<M> {
        let Some(mut space) = self.current.take() else {
            if !self.stack.next() {
                return Step::Exhausted;
            }
            self.current = Some(
                self.stack
                    .recompute(&mut self.distance, &mut self.statistics),
            );
            return Step::Propagating;
        };

        match space.status(&mut self.statistics) {
            SpaceStatus::Failed => {
                self.statistics.fail += 1;
                Step::Failed
            }
            SpaceStatus::Solved => Step::Solved(space),
            SpaceStatus::Branch { .. } => {
                let desc = space.description();
                self.stack.push(
                    &space,
                    Arc::clone(&desc),
                    &mut self.distance,
                    &mut self.statistics,
                );
                commit_alternative(&mut space, &desc, 0, &mut self.statistics);
                self.current = Some(space);
                Step::Branching
            }
        }
    }
}

impl<M: Model> DepthFirst<M, ReCoStack<M>> {
    /// Give away an open alternative of the stack as a standalone space.
    pub(crate) fn share_subtree(&mut self, strategy: &ShareStrategy) -> Option<Space<M>> {
        self.stack.share(strategy, &mut self.statistics)
    }
}

/// Depth-first search for all solutions, left to right.
///
/// Backtracking recomputes spaces with a [`ReCoStack`] configured by the commit and adaptive
/// distance of the [`SearchOptions`]; [`Dfs::with_copying`] stores a copy at every choice point
/// instead. Solutions are returned in the same order regardless of the stack.
#[derive(Debug)]
pub struct Dfs<M: Model, S: SearchStack<M> = ReCoStack<M>> {
    explorer: DepthFirst<M, S>,
}

impl<M: Model> Dfs<M> {
    pub fn new(root: Space<M>, options: &SearchOptions) -> Self {
        Dfs {
            explorer: DepthFirst::new(
                Some(root),
                ReCoStack::new(options.commit_distance, options.adaptive_distance),
            ),
        }
    }
}

impl<M: Model> Dfs<M, CopyStack<M>> {
    pub fn with_copying(root: Space<M>) -> Self {
        Dfs {
            explorer: DepthFirst::new(Some(root), CopyStack::default()),
        }
    }
}

impl<M: Model, S: SearchStack<M>> SearchEngine<M> for Dfs<M, S> {
    fn next(&mut self) -> Option<Space<M>> {
        loop {
            match self.explorer.step() {
                Step::Solved(solution) => {
                    debug!("dfs found a solution");
                    return Some(solution);
                }
                Step::Exhausted => return None,
                Step::Propagating | Step::Branching | Step::Failed | Step::Skipped => {}
            }
        }
    }

    fn statistics(&self) -> Statistics {
        self.explorer.statistics()
    }
}
