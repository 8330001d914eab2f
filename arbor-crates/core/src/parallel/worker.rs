use std::sync::Arc;
use std::sync::Barrier;
use std::sync::Mutex;

use crossbeam_channel::TryRecvError;
use log::debug;
use log::trace;

use super::channel::ControllerMessage;
use super::channel::WorkerChannels;
use super::channel::WorkerMessage;
use super::engine::ParallelEngine;
use super::ShareStrategy;
use crate::kernel::Model;
use crate::search::Explorer;
use crate::search::Step;
use crate::statistics::ParallelStatistics;

/// Whether a worker keeps running after handling a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Terminate,
}

/// A worker thread: runs its engine, serves share requests between steps and waits for work
/// when it has none.
#[derive(Debug)]
pub(crate) struct Worker<M: Model, E> {
    id: usize,
    engine: E,
    channels: WorkerChannels<M>,
    strategy: ShareStrategy,
    /// Workers waiting for this one to share.
    thieves: Vec<usize>,
    shares: u64,
    searches: u64,
    published: Arc<Mutex<ParallelStatistics>>,
}

impl<M: Model, E: ParallelEngine<M>> Worker<M, E> {
    pub(crate) fn new(
        id: usize,
        engine: E,
        channels: WorkerChannels<M>,
        strategy: ShareStrategy,
        published: Arc<Mutex<ParallelStatistics>>,
    ) -> Self {
        Worker {
            id,
            engine,
            channels,
            strategy,
            thieves: Vec::new(),
            shares: 0,
            searches: 0,
            published,
        }
    }

    pub(crate) fn run(mut self, start: Arc<Barrier>) {
        let _ = start.wait();
        debug!("worker {} started", self.id);

        // Workers without initial work are already known to the controller as idle.
        let mut busy = self.engine.has_work();
        if busy {
            self.searches += 1;
        }

        loop {
            if busy {
                if self.explore() == Flow::Terminate {
                    break;
                }
                self.report_idle();
            }

            if self.wait_for_work() == Flow::Terminate {
                break;
            }
            busy = true;
        }

        self.publish();
        debug!("worker {} terminated", self.id);
    }

    /// Run the engine until it runs out of work.
    fn explore(&mut self) -> Flow {
        while self.engine.has_work() {
            loop {
                match self.channels.from_controller.try_recv() {
                    Ok(message) => {
                        if self.handle_while_busy(message) == Flow::Terminate {
                            return Flow::Terminate;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return Flow::Terminate,
                }
            }
            self.serve_thieves();

            if let Step::Solved(solution) = self.engine.step() {
                self.publish();
                let _ = self.channels.to_controller.send(WorkerMessage::Solution {
                    worker: self.id,
                    solution,
                });
            }
        }

        Flow::Continue
    }

    fn handle_while_busy(&mut self, message: ControllerMessage<M>) -> Flow {
        match message {
            ControllerMessage::ShareRequest { thief } => self.thieves.push(thief),
            ControllerMessage::Incumbent(incumbent) => self.engine.adopt_incumbent(incumbent),
            ControllerMessage::Work(_) => unreachable!("work is only sent to idle workers"),
            ControllerMessage::Terminate => return Flow::Terminate,
        }

        Flow::Continue
    }

    fn serve_thieves(&mut self) {
        while let Some(&thief) = self.thieves.last() {
            let Some(space) = self.engine.share(&self.strategy) else {
                return;
            };

            let _ = self.thieves.pop();
            self.shares += 1;
            trace!("worker {} shares work with worker {thief}", self.id);
            let _ = self.channels.to_controller.send(WorkerMessage::Shared {
                worker: self.id,
                thief,
                work: Some(space),
            });
        }
    }

    fn decline(&self, thief: usize) {
        let _ = self.channels.to_controller.send(WorkerMessage::Shared {
            worker: self.id,
            thief,
            work: None,
        });
    }

    fn report_idle(&mut self) {
        for thief in std::mem::take(&mut self.thieves) {
            self.decline(thief);
        }

        self.publish();
        trace!("worker {} is idle", self.id);
        let _ = self.channels.to_controller.send(WorkerMessage::Idle {
            worker: self.id,
            exhausted_level: self.engine.take_exhausted_level(),
        });
    }

    /// Block until the controller hands out work.
    fn wait_for_work(&mut self) -> Flow {
        loop {
            let Ok(message) = self.channels.from_controller.recv() else {
                return Flow::Terminate;
            };

            match message {
                ControllerMessage::Work(work) => {
                    self.searches += 1;
                    self.engine.accept(work);
                    return Flow::Continue;
                }
                ControllerMessage::ShareRequest { thief } => self.decline(thief),
                ControllerMessage::Incumbent(incumbent) => self.engine.adopt_incumbent(incumbent),
                ControllerMessage::Terminate => return Flow::Terminate,
            }
        }
    }

    fn publish(&self) {
        let statistics = ParallelStatistics {
            search: self.engine.statistics(),
            shares: self.shares,
            searches: self.searches,
        };

        match self.published.lock() {
            Ok(mut published) => *published = statistics,
            Err(poisoned) => *poisoned.into_inner() = statistics,
        }
    }
}
