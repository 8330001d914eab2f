use std::sync::Arc;

use log::debug;

use super::stack::ReCoStack;
use super::DepthFirst;
use super::Explorer;
use super::SearchEngine;
use super::SearchOptions;
use super::Step;
use crate::kernel::Constrain;
use crate::kernel::Space;
use crate::kernel::SpaceStatus;
use crate::statistics::Statistics;

/// Branch-and-bound search that restarts from the root after every solution.
///
/// The root is constrained by every solution found and explored depth-first again. As with
/// [`super::Bab`], every solution returned is strictly better than the previous one; the stack
/// is emptied on every restart, so a single path of the tree is held at any time.
#[derive(Debug)]
pub struct Restart<M: Constrain> {
    /// `None` once constraining the root made it fail.
    root: Option<Space<M>>,
    explorer: DepthFirst<M, ReCoStack<M>>,
    best: Option<Arc<M>>,
}

impl<M: Constrain> Restart<M> {
    pub fn new(root: Space<M>, options: &SearchOptions) -> Self {
        let stack = ReCoStack::new(options.commit_distance, options.adaptive_distance);
        let mut restart = Restart {
            root: Some(root),
            explorer: DepthFirst::new(None, stack),
            best: None,
        };
        restart.restart();

        restart
    }

    /// The model of the best solution found so far.
    pub fn best(&self) -> Option<&M> {
        self.best.as_deref()
    }

    /// Explore a fresh copy of the root, constrained by the best solution so far.
    fn restart(&mut self) {
        let Some(root) = &mut self.root else {
            return;
        };

        let statistics = self.explorer.statistics_mut();
        if let Some(best) = &self.best {
            root.constrain(best);
            statistics.restart += 1;
        }

        if root.status(statistics) == SpaceStatus::Failed {
            statistics.fail += 1;
            self.root = None;
            self.explorer.clear();
        } else {
            statistics.clone += 1;
            let copy = root.clone_space(true);
            self.explorer.reset(copy);
        }
    }
}

impl<M: Constrain> SearchEngine<M> for Restart<M> {
    fn next(&mut self) -> Option<Space<M>> {
        loop {
            match self.explorer.step() {
                Step::Solved(solution) => {
                    debug!("restart found an improving solution");
                    self.best = Some(Arc::new(solution.model().clone()));
                    self.restart();
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
