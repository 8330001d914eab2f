use std::fmt::Debug;
use std::fmt::Formatter;
use std::sync::Arc;
use std::sync::Barrier;
use std::sync::Mutex;
use std::thread::JoinHandle;

use log::debug;
use log::info;
use log::trace;
use log::warn;

use super::channel::create_channels;
use super::channel::ControllerChannels;
use super::channel::ControllerMessage;
use super::channel::Work;
use super::channel::WorkerMessage;
use super::engine::LdsWorker;
use super::engine::ParallelEngine;
use super::worker::Worker;
use crate::kernel::Constrain;
use crate::kernel::Model;
use crate::kernel::Space;
use crate::kernel::SpaceStatus;
use crate::search::stack::ReCoStack;
use crate::search::BranchAndBound;
use crate::search::DepthFirst;
use crate::search::Explorer;
use crate::search::SearchEngine;
use crate::search::SearchOptions;
use crate::statistics::ParallelStatistics;
use crate::statistics::Statistics;

/// What the controller knows about a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerState {
    Busy,
    Idle,
    /// Idle, with a share request on its behalf outstanding.
    Waiting,
}

#[derive(Debug, Clone, Copy)]
enum Distribution {
    /// Idle workers steal subtrees from busy ones.
    Subtrees,
    /// Idle workers receive blocks of discrepancy levels from `next` up to `end` (exclusive).
    Levels { next: u32, end: u32, increment: u32 },
}

struct Optimisation<M: Model> {
    constrain: fn(&mut Space<M>, &M),
    incumbent: Option<Arc<M>>,
}

impl<M: Model> Debug for Optimisation<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Optimisation")
            .field("incumbent", &self.incumbent)
            .finish_non_exhaustive()
    }
}

/// Runs a search on several worker threads.
///
/// Each worker runs its own engine on a private stack. The root goes to the first worker; the
/// others start idle, and the controller asks busy workers to share an open node with every idle
/// one (see [`super::ShareStrategy`]). For branch-and-bound, a reported solution is only accepted
/// if it is better than the incumbent, and every accepted solution is broadcast to all workers.
/// For limited discrepancy search, every worker probes its own copy of the root and the
/// controller hands out discrepancy levels instead.
///
/// Solutions are returned in the order they are accepted, which depends on timing. Dropping the
/// controller stops and joins all workers.
#[derive(Debug)]
pub struct Controller<M: Model> {
    channels: ControllerChannels<M>,
    handles: Vec<JoinHandle<()>>,
    states: Vec<WorkerState>,
    distribution: Distribution,
    optimisation: Option<Optimisation<M>>,
    statistics: Vec<Arc<Mutex<ParallelStatistics>>>,
}

impl<M: Model> Controller<M> {
    /// Enumerate all solutions of `root` depth-first on `options.threads` workers.
    pub fn dfs(root: Space<M>, options: &SearchOptions) -> Self {
        let mut root = Some(root);
        let engines = (0..options.threads.max(1))
            .map(|_| {
                DepthFirst::new(
                    root.take(),
                    ReCoStack::new(options.commit_distance, options.adaptive_distance),
                )
            })
            .collect();

        Controller::start(engines, options, Distribution::Subtrees, None)
    }

    /// Enumerate the solutions of `root` with at most `options.discrepancy_limit` discrepancies on
    /// `options.threads` workers.
    pub fn lds(mut root: Space<M>, options: &SearchOptions) -> Self {
        let mut root_statistics = Statistics::default();
        let failed = root.status(&mut root_statistics) == SpaceStatus::Failed;
        if failed {
            root_statistics.fail += 1;
        }

        // The propagation of the root is counted by the first worker.
        let engines = (0..options.threads.max(1))
            .map(|id| {
                let statistics = if id == 0 {
                    root_statistics
                } else {
                    Statistics::default()
                };
                LdsWorker::new((!failed).then(|| root.clone_space(true)), statistics)
            })
            .collect();
        let end = if failed {
            0
        } else {
            options.discrepancy_limit.saturating_add(1)
        };
        let distribution = Distribution::Levels {
            next: 0,
            end,
            increment: options.share.lds_increment.max(1),
        };

        Controller::start(engines, options, distribution, None)
    }

    fn start<E: ParallelEngine<M> + 'static>(
        engines: Vec<E>,
        options: &SearchOptions,
        distribution: Distribution,
        optimisation: Option<Optimisation<M>>,
    ) -> Self {
        let workers = engines.len();
        let (channels, worker_channels) = create_channels(workers);

        let mut controller = Controller {
            channels,
            handles: Vec::with_capacity(workers),
            states: engines
                .iter()
                .map(|engine| {
                    if engine.has_work() {
                        WorkerState::Busy
                    } else {
                        WorkerState::Idle
                    }
                })
                .collect(),
            distribution,
            optimisation,
            statistics: engines
                .iter()
                .map(|engine| {
                    Arc::new(Mutex::new(ParallelStatistics {
                        search: engine.statistics(),
                        ..ParallelStatistics::default()
                    }))
                })
                .collect(),
        };
        // The initial requests are queued before any worker runs.
        controller.dispatch();

        let start = Arc::new(Barrier::new(workers + 1));
        for (id, (engine, channels)) in engines.into_iter().zip(worker_channels).enumerate() {
            let worker = Worker::new(
                id,
                engine,
                channels,
                options.share,
                Arc::clone(&controller.statistics[id]),
            );
            let start = Arc::clone(&start);
            controller
                .handles
                .push(std::thread::spawn(move || worker.run(start)));
        }
        let _ = start.wait();
        info!("started {workers} workers");

        controller
    }

    /// Wait for the next accepted solution. Returns `None` once every worker is idle and no
    /// work is in transfer.
    fn next_solution(&mut self) -> Option<Space<M>> {
        loop {
            if self.is_finished() {
                return None;
            }

            let Ok(message) = self.channels.from_workers.recv() else {
                warn!("all workers hung up before the search finished");
                return None;
            };

            match message {
                WorkerMessage::Solution {
                    worker,
                    mut solution,
                } => {
                    if self.accept(worker, &mut solution) {
                        return Some(solution);
                    }
                }
                WorkerMessage::Shared {
                    worker,
                    thief,
                    work,
                } => {
                    match work {
                        Some(space) => {
                            debug!("worker {worker} shared a subtree with worker {thief}");
                            self.channels
                                .send(thief, ControllerMessage::Work(Work::Subtree(space)));
                            self.states[thief] = WorkerState::Busy;
                        }
                        None => {
                            trace!("worker {worker} had no work for worker {thief}");
                            self.states[thief] = WorkerState::Idle;
                        }
                    }
                    self.dispatch();
                }
                WorkerMessage::Idle {
                    worker,
                    exhausted_level,
                } => {
                    self.states[worker] = WorkerState::Idle;
                    if let Some(level) = exhausted_level {
                        self.lower_level_limit(level);
                    }
                    self.dispatch();
                }
            }
        }
    }

    /// The number of workers.
    pub fn workers(&self) -> usize {
        self.states.len()
    }

    /// The statistics of every worker, as last reported by it.
    ///
    /// Workers report whenever they find a solution or run out of work, so once the search has
    /// returned `None` the statistics are final.
    pub fn worker_statistics(&self) -> Vec<ParallelStatistics> {
        self.statistics
            .iter()
            .map(|statistics| match statistics.lock() {
                Ok(statistics) => *statistics,
                Err(poisoned) => *poisoned.into_inner(),
            })
            .collect()
    }

    /// The statistics of all workers combined.
    pub fn total(&self) -> ParallelStatistics {
        self.worker_statistics().into_iter().sum()
    }

    /// The model of the best solution accepted so far by branch-and-bound.
    pub fn best(&self) -> Option<&M> {
        self.optimisation
            .as_ref()
            .and_then(|optimisation| optimisation.incumbent.as_deref())
    }

    fn is_finished(&self) -> bool {
        self.states.iter().all(|&state| state == WorkerState::Idle)
    }

    /// Whether a solution reported by `worker` is returned; accepted incumbents are broadcast.
    fn accept(&mut self, worker: usize, solution: &mut Space<M>) -> bool {
        let Some(optimisation) = &mut self.optimisation else {
            return true;
        };

        if let Some(incumbent) = &optimisation.incumbent {
            (optimisation.constrain)(solution, incumbent);
            if solution.status(&mut Statistics::default()) == SpaceStatus::Failed {
                trace!("discarded a solution of worker {worker} which is not an improvement");
                return false;
            }
        }

        debug!("accepted an improving solution of worker {worker}");
        let incumbent = Arc::new(solution.model().clone());
        for other in (0..self.states.len()).filter(|&other| other != worker) {
            self.channels
                .send(other, ControllerMessage::Incumbent(Arc::clone(&incumbent)));
        }
        optimisation.incumbent = Some(incumbent);

        true
    }

    fn lower_level_limit(&mut self, level: u32) {
        if let Distribution::Levels { end, .. } = &mut self.distribution {
            if level + 1 < *end {
                debug!("no leaf needs more than {level} discrepancies");
                *end = level + 1;
            }
        }
    }

    /// Find work for every idle worker.
    fn dispatch(&mut self) {
        for thief in 0..self.states.len() {
            if self.states[thief] != WorkerState::Idle {
                continue;
            }

            match &mut self.distribution {
                Distribution::Subtrees => {
                    let Some(victim) = find_victim(&self.states, thief) else {
                        continue;
                    };
                    trace!("asking worker {victim} to share with worker {thief}");
                    self.channels
                        .send(victim, ControllerMessage::ShareRequest { thief });
                    self.states[thief] = WorkerState::Waiting;
                }
                Distribution::Levels {
                    next,
                    end,
                    increment,
                } => {
                    if *next >= *end {
                        continue;
                    }
                    let levels = *next..next.saturating_add(*increment).min(*end);
                    *next = levels.end;

                    trace!("worker {thief} probes discrepancy levels {levels:?}");
                    self.channels
                        .send(thief, ControllerMessage::Work(Work::Levels(levels)));
                    self.states[thief] = WorkerState::Busy;
                }
            }
        }
    }
}

impl<M: Constrain> Controller<M> {
    /// Find a best solution of `root` with branch-and-bound on `options.threads` workers.
    pub fn bab(root: Space<M>, options: &SearchOptions) -> Self {
        let mut root = Some(root);
        let engines = (0..options.threads.max(1))
            .map(|_| {
                BranchAndBound::new(
                    root.take(),
                    ReCoStack::new(options.commit_distance, options.adaptive_distance),
                )
            })
            .collect();
        let optimisation = Optimisation {
            constrain: Space::constrain,
            incumbent: None,
        };

        Controller::start(engines, options, Distribution::Subtrees, Some(optimisation))
    }
}

/// The first busy worker after `thief`, in round-robin order.
fn find_victim(states: &[WorkerState], thief: usize) -> Option<usize> {
    let workers = states.len();
    (1..workers)
        .map(|offset| (thief + offset) % workers)
        .find(|&worker| states[worker] == WorkerState::Busy)
}

impl<M: Model> SearchEngine<M> for Controller<M> {
    fn next(&mut self) -> Option<Space<M>> {
        self.next_solution()
    }

    fn statistics(&self) -> Statistics {
        self.total().search
    }
}

impl<M: Model> Drop for Controller<M> {
    fn drop(&mut self) {
        for worker in 0..self.states.len() {
            self.channels.send(worker, ControllerMessage::Terminate);
        }

        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("a worker panicked");
            }
        }
    }
}
