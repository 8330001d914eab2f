//! The messages exchanged between the controller and its workers.
use std::ops::Range;
use std::sync::Arc;

use crossbeam_channel::unbounded;
use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;

use crate::kernel::Model;
use crate::kernel::Space;

/// A piece of the search handed to a worker.
#[derive(Debug)]
pub(crate) enum Work<M: Model> {
    /// A subtree to explore, rooted at the given space.
    Subtree(Space<M>),
    /// Discrepancy levels to probe from the worker's own copy of the root.
    Levels(Range<u32>),
}

/// Sent by a worker to the controller.
#[derive(Debug)]
pub(crate) enum WorkerMessage<M: Model> {
    Solution { worker: usize, solution: Space<M> },
    /// The answer to a share request; `work` is `None` if the worker had nothing to give.
    Shared {
        worker: usize,
        thief: usize,
        work: Option<Space<M>>,
    },
    /// The worker ran out of work. `exhausted_level` is the discrepancy level at which a probe
    /// proved that no leaf needs more discrepancies, if any.
    Idle {
        worker: usize,
        exhausted_level: Option<u32>,
    },
}

/// Sent by the controller to a worker.
#[derive(Debug)]
pub(crate) enum ControllerMessage<M: Model> {
    Work(Work<M>),
    /// Give part of the current work to `thief`.
    ShareRequest { thief: usize },
    /// A better solution was accepted.
    Incumbent(Arc<M>),
    Terminate,
}

#[derive(Debug)]
pub(crate) struct WorkerChannels<M: Model> {
    pub(crate) to_controller: Sender<WorkerMessage<M>>,
    pub(crate) from_controller: Receiver<ControllerMessage<M>>,
}

#[derive(Debug)]
pub(crate) struct ControllerChannels<M: Model> {
    pub(crate) from_workers: Receiver<WorkerMessage<M>>,
    /// One sender per worker, indexed by worker.
    pub(crate) to_workers: Vec<Sender<ControllerMessage<M>>>,
}

impl<M: Model> ControllerChannels<M> {
    pub(crate) fn send(&self, worker: usize, message: ControllerMessage<M>) {
        // A worker only hangs up after it was told to terminate.
        let _ = self.to_workers[worker].send(message);
    }
}

/// Create the channels for a controller with `workers` workers.
///
/// All channels are unbounded: the controller and a worker may send to each other at the same
/// time, and neither may block while doing so.
pub(crate) fn create_channels<M: Model>(
    workers: usize,
) -> (ControllerChannels<M>, Vec<WorkerChannels<M>>) {
    let (to_controller, from_workers) = unbounded();

    let (to_workers, worker_channels) = (0..workers)
        .map(|_| {
            let (to_worker, from_controller) = unbounded();
            let channels = WorkerChannels {
                to_controller: to_controller.clone(),
                from_controller,
            };
            (to_worker, channels)
        })
        .unzip();

    let controller = ControllerChannels {
        from_workers,
        to_workers,
    };

    (controller, worker_channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scenario_tree;
    use crate::testing::space;
    use crate::testing::TreeModel;

    #[test]
    fn every_worker_reaches_the_controller() {
        let (controller, workers) = create_channels::<TreeModel>(3);

        for (worker, channels) in workers.iter().enumerate() {
            channels
                .to_controller
                .send(WorkerMessage::Idle {
                    worker,
                    exhausted_level: None,
                })
                .unwrap();
        }

        let idle = controller
            .from_workers
            .try_iter()
            .map(|message| match message {
                WorkerMessage::Idle { worker, .. } => worker,
                other => panic!("unexpected message {other:?}"),
            })
            .collect::<Vec<_>>();
        assert_eq!(idle, vec![0, 1, 2]);
    }

    #[test]
    fn messages_reach_only_their_worker() {
        let (controller, workers) = create_channels::<TreeModel>(2);

        let work = Work::Subtree(space(scenario_tree()));
        controller.send(1, ControllerMessage::Work(work));

        assert!(workers[0].from_controller.try_recv().is_err());
        assert!(matches!(
            workers[1].from_controller.try_recv(),
            Ok(ControllerMessage::Work(Work::Subtree(_)))
        ));
    }
}
