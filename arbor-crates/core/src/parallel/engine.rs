use std::ops::Range;
use std::sync::Arc;

use super::channel::Work;
use super::ShareStrategy;
use crate::kernel::Constrain;
use crate::kernel::Model;
use crate::kernel::Space;
use crate::search::stack::ReCoStack;
use crate::search::BranchAndBound;
use crate::search::DepthFirst;
use crate::search::Explorer;
use crate::search::Probe;
use crate::search::Step;
use crate::statistics::Statistics;

/// The exploration loop run by a single worker.
pub(crate) trait ParallelEngine<M: Model>: Explorer<M> + Send {
    /// Start on work received from the controller. Only called when [`Explorer::has_work`] is
    /// false.
    fn accept(&mut self, work: Work<M>);

    /// Give away part of the current work, if it can be spared.
    fn share(&mut self, _strategy: &ShareStrategy) -> Option<Space<M>> {
        None
    }

    /// Adopt a better solution accepted by the controller.
    fn adopt_incumbent(&mut self, _incumbent: Arc<M>) {}

    /// The discrepancy level proved exhaustive since the last call, if any.
    fn take_exhausted_level(&mut self) -> Option<u32> {
        None
    }
}

impl<M: Model> ParallelEngine<M> for DepthFirst<M, ReCoStack<M>> {
    fn accept(&mut self, work: Work<M>) {
        match work {
            Work::Subtree(root) => self.reset(root),
            Work::Levels(_) => unreachable!("depth-first workers only receive subtrees"),
        }
    }

    fn share(&mut self, strategy: &ShareStrategy) -> Option<Space<M>> {
        self.share_subtree(strategy)
    }
}

impl<M: Constrain> ParallelEngine<M> for BranchAndBound<M> {
    fn accept(&mut self, work: Work<M>) {
        match work {
            Work::Subtree(root) => self.reset(root),
            Work::Levels(_) => unreachable!("branch-and-bound workers only receive subtrees"),
        }
    }

    fn share(&mut self, strategy: &ShareStrategy) -> Option<Space<M>> {
        self.share_subtree(strategy)
    }

    fn adopt_incumbent(&mut self, incumbent: Arc<M>) {
        self.improve(incumbent);
    }
}

/// Probes blocks of discrepancy levels handed out by the controller.
///
/// Every worker keeps its own copy of the propagated root, so levels can be probed in any
/// order by any worker.
#[derive(Debug)]
pub(crate) struct LdsWorker<M: Model> {
    root: Option<Space<M>>,
    probe: Probe<M>,
    /// The levels still to be probed after the current one.
    levels: Range<u32>,
    level: u32,
    probing: bool,
    exhausted_level: Option<u32>,
}

impl<M: Model> LdsWorker<M> {
    /// A worker probing copies of `root`, which must be stable; `None` if the root failed.
    ///
    /// The probes add to `statistics`.
    pub(crate) fn new(root: Option<Space<M>>, statistics: Statistics) -> Self {
        let mut probe = Probe::default();
        *probe.statistics_mut() = statistics;

        LdsWorker {
            root,
            probe,
            levels: 0..0,
            level: 0,
            probing: false,
            exhausted_level: None,
        }
    }

    fn start_next_level(&mut self) -> bool {
        let Some(root) = &self.root else {
            self.levels = 0..0;
            return false;
        };
        let Some(level) = self.levels.next() else {
            return false;
        };

        self.probe.statistics_mut().clone += 1;
        let copy = root.clone_space(true);
        self.probe.reset(copy, level);
        self.level = level;
        self.probing = true;

        true
    }
}

impl<M: Model> Explorer<M> for LdsWorker<M> {
    fn has_work(&self) -> bool {
        self.probing || (self.root.is_some() && !self.levels.is_empty())
    }

    fn step(&mut self) -> Step<M> {
        if !self.probing && !self.start_next_level() {
            return Step::Exhausted;
        }

        match self.probe.step() {
            Step::Exhausted => {
                self.probing = false;
                if self.probe.exhausted() {
                    self.exhausted_level = Some(self.level);
                    self.levels = 0..0;
                }
                Step::Exhausted
            }
            step => step,
        }
    }

    fn statistics(&self) -> Statistics {
        self.probe.statistics()
    }
}

impl<M: Model> ParallelEngine<M> for LdsWorker<M> {
    fn accept(&mut self, work: Work<M>) {
        match work {
            Work::Levels(levels) => self.levels = levels,
            Work::Subtree(_) => unreachable!("limited discrepancy workers only receive levels"),
        }
    }

    fn take_exhausted_level(&mut self) -> Option<u32> {
        self.exhausted_level.take()
    }
}
