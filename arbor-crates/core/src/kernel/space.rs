use std::collections::VecDeque;
use std::sync::Arc;

use log::trace;

use super::propagator_queue::PropagatorQueue;
use super::Branching;
use super::BranchingDesc;
use super::BranchingId;
use super::CommitError;
use super::Constrain;
use super::ExecStatus;
use super::Model;
use super::PropagationContext;
use super::Propagator;
use super::PropagatorId;
use super::VariableId;
use crate::arbor_assert_moderate;
use crate::arbor_assert_simple;
use crate::containers::KeyedVec;
use crate::containers::SlotArena;
use crate::statistics::Statistics;

/// The result of [`Space::propagate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationOutcome {
    Stable,
    Failed,
}

/// The result of [`Space::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing was scheduled; the space is at a fixpoint.
    Stable,
    /// One propagator ran.
    Ran,
    Failed,
}

/// What a space looks like after propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceStatus {
    Failed,
    /// No branching has alternatives left: the model is a solution.
    Solved,
    /// The space is at a choice point; [`Space::description`] describes it.
    Branch { alternatives: u32 },
}

/// A model together with the propagators and branchings posted on it.
///
/// A space runs its propagators to a fixpoint ([`Space::propagate`]), reports whether it is
/// failed, solved or at a choice point ([`Space::status`]), commits to an alternative of a choice
/// ([`Space::commit`]) and produces independent copies of itself ([`Space::clone_space`]). Once a
/// space has failed it stays failed.
///
/// A space is deliberately not [`Clone`]: copies are a tracked cost of search.
#[derive(Debug)]
pub struct Space<M: Model> {
    model: M,
    propagators: SlotArena<PropagatorId, Box<dyn Propagator<M>>>,
    subscriptions: KeyedVec<VariableId, Vec<PropagatorId>>,
    queue: PropagatorQueue,
    branchings: VecDeque<(BranchingId, Box<dyn Branching<M>>)>,
    /// Index into `branchings` from which descriptions may still be committed.
    commit_cursor: usize,
    next_branching: u32,
    /// Variables modified by the running actor, waiting to wake up their subscribers.
    modified: Vec<VariableId>,
    failed: bool,
}

impl<M: Model> Space<M> {
    pub fn new(model: M) -> Self {
        Space {
            model,
            propagators: SlotArena::default(),
            subscriptions: KeyedVec::default(),
            queue: PropagatorQueue::default(),
            branchings: VecDeque::new(),
            commit_cursor: 0,
            next_branching: 0,
            modified: Vec::new(),
            failed: false,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Take the model out of the space.
    pub fn into_model(self) -> M {
        self.model
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Whether propagators are waiting to run.
    pub fn is_stable(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn num_propagators(&self) -> usize {
        self.propagators.len()
    }

    pub fn num_branchings(&self) -> usize {
        self.branchings.len()
    }

    /// Mark the space as failed. Nothing will run in it again.
    pub fn fail(&mut self) {
        self.failed = true;
        self.queue.clear();
        self.modified.clear();
    }

    /// Post a propagator, subscribe it to its variables and schedule it.
    pub fn post_propagator(&mut self, propagator: impl Propagator<M> + 'static) -> PropagatorId {
        let variables = propagator.variables();
        let priority = propagator.priority();
        let id = self.propagators.insert(Box::new(propagator));

        for variable in variables {
            self.subscriptions.accommodate(variable, Vec::new());
            self.subscriptions[variable].push(id);
        }

        if !self.failed {
            self.queue.enqueue_propagator(id, priority);
        }

        id
    }

    /// Post a branching after all branchings posted so far.
    pub fn post_branching(&mut self, branching: impl Branching<M> + 'static) -> BranchingId {
        let id = BranchingId(self.next_branching);
        self.next_branching += 1;
        self.branchings.push_back((id, Box::new(branching)));

        id
    }

    /// Restrict the space to solutions better than `incumbent`.
    pub fn constrain(&mut self, incumbent: &M)
    where
        M: Constrain,
    {
        M::constrain(self, incumbent);
    }

    /// Run a single scheduled propagator.
    pub fn step(&mut self, statistics: &mut Statistics) -> StepOutcome {
        if self.failed {
            return StepOutcome::Failed;
        }

        let Some(id) = self.queue.pop() else {
            return StepOutcome::Stable;
        };
        let Some(propagator) = self.propagators.get_mut(id) else {
            return StepOutcome::Ran;
        };

        statistics.propagate += 1;
        let priority = propagator.priority();
        let mut context = PropagationContext::new(&mut self.model, &mut self.modified);

        match propagator.propagate(&mut context) {
            Err(_) => {
                trace!("{} failed the space", propagator.name());
                self.fail();
                return StepOutcome::Failed;
            }
            Ok(ExecStatus::Fix) => self.schedule_subscribers(Some(id)),
            Ok(ExecStatus::NoFix) => {
                self.schedule_subscribers(Some(id));
                self.queue.enqueue_propagator(id, priority);
            }
            Ok(ExecStatus::Subsumed) => {
                self.schedule_subscribers(Some(id));
                self.dispose(id);
            }
        }

        StepOutcome::Ran
    }

    /// Run the scheduled propagators until the space is at a fixpoint or failed.
    pub fn propagate(&mut self, statistics: &mut Statistics) -> PropagationOutcome {
        loop {
            match self.step(statistics) {
                StepOutcome::Ran => {}
                StepOutcome::Stable => return PropagationOutcome::Stable,
                StepOutcome::Failed => return PropagationOutcome::Failed,
            }
        }
    }

    /// Propagate and report whether the space is failed, solved or at a choice point.
    ///
    /// Branchings without alternatives are discarded from the front of the branching list;
    /// afterwards any description of a remaining branching may be committed again.
    pub fn status(&mut self, statistics: &mut Statistics) -> SpaceStatus {
        if self.propagate(statistics) == PropagationOutcome::Failed {
            return SpaceStatus::Failed;
        }

        while let Some((_, branching)) = self.branchings.front() {
            if branching.status(&self.model) {
                break;
            }
            let _ = self.branchings.pop_front();
        }
        self.commit_cursor = 0;

        match self.branchings.front() {
            None => SpaceStatus::Solved,
            Some((id, branching)) => SpaceStatus::Branch {
                alternatives: branching.description(*id, &self.model).alternatives(),
            },
        }
    }

    /// Describe the current choice point.
    ///
    /// Only valid directly after [`Space::status`] reported [`SpaceStatus::Branch`].
    pub fn description(&self) -> Arc<BranchingDesc> {
        let (id, branching) = self
            .branchings
            .front()
            .expect("a description requires a space at a choice point");
        let desc = branching.description(*id, &self.model);
        arbor_assert_simple!(desc.branching() == *id);

        Arc::new(desc)
    }

    /// Commit the space to `alternative` of `desc`.
    ///
    /// Descriptions must be committed in the order in which they were created. Committing on a
    /// failed space does nothing.
    pub fn commit(
        &mut self,
        desc: &BranchingDesc,
        alternative: u32,
        statistics: &mut Statistics,
    ) -> Result<(), CommitError> {
        if alternative >= desc.alternatives() {
            return Err(CommitError::IllegalAlternative {
                alternative,
                alternatives: desc.alternatives(),
            });
        }

        let position = self
            .branchings
            .iter()
            .skip(self.commit_cursor)
            .position(|(id, _)| *id == desc.branching())
            .map(|offset| self.commit_cursor + offset)
            .ok_or(CommitError::NoBranching {
                branching: desc.branching(),
            })?;
        self.commit_cursor = position;

        statistics.commit += 1;
        if self.failed {
            return Ok(());
        }

        let branching = &self.branchings[position].1;
        let mut context = PropagationContext::new(&mut self.model, &mut self.modified);
        match branching.commit(&mut context, desc, alternative) {
            Ok(()) => self.schedule_subscribers(None),
            Err(_) => self.fail(),
        }

        Ok(())
    }

    /// Create an independent copy of a stable, non-failed space.
    ///
    /// Live propagators are copied into a compacted arena; a forwarding table from old to new
    /// handles is used to rebind the subscriptions and dropped afterwards.
    pub fn clone_space(&self, share: bool) -> Space<M> {
        arbor_assert_simple!(!self.failed, "a failed space cannot be cloned");
        arbor_assert_simple!(self.is_stable(), "only a stable space can be cloned");

        let mut forward: KeyedVec<PropagatorId, Option<PropagatorId>> = KeyedVec::default();
        forward.resize(self.propagators.capacity(), None);

        let mut propagators = SlotArena::default();
        for (id, propagator) in self.propagators.iter() {
            forward[id] = Some(propagators.insert(propagator.clone()));
        }

        let subscriptions = self
            .subscriptions
            .iter()
            .map(|subscribers| {
                subscribers
                    .iter()
                    .filter_map(|&subscriber| forward[subscriber])
                    .collect()
            })
            .collect();

        Space {
            model: self.model.copy(share),
            propagators,
            subscriptions,
            queue: PropagatorQueue::default(),
            branchings: self
                .branchings
                .iter()
                .map(|(id, branching)| (*id, branching.clone()))
                .collect(),
            commit_cursor: self.commit_cursor,
            next_branching: self.next_branching,
            modified: Vec::new(),
            failed: false,
        }
    }

    /// An estimate of the memory held by the space, in bytes.
    pub fn memory(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.model.memory()
            + self.propagators.capacity() * std::mem::size_of::<Option<Box<dyn Propagator<M>>>>()
            + self
                .subscriptions
                .iter()
                .map(|subscribers| subscribers.len() * std::mem::size_of::<PropagatorId>())
                .sum::<usize>()
            + self.branchings.len() * std::mem::size_of::<(BranchingId, Box<dyn Branching<M>>)>()
    }

    /// Schedule the subscribers of every modified variable, except the propagator that caused
    /// the modification.
    fn schedule_subscribers(&mut self, running: Option<PropagatorId>) {
        for variable in self.modified.drain(..) {
            let Some(subscribers) = self.subscriptions.get(variable) else {
                continue;
            };

            for &subscriber in subscribers {
                if Some(subscriber) == running {
                    continue;
                }
                if let Some(propagator) = self.propagators.get(subscriber) {
                    self.queue
                        .enqueue_propagator(subscriber, propagator.priority());
                }
            }
        }
    }

    fn dispose(&mut self, id: PropagatorId) {
        let Some(propagator) = self.propagators.remove(id) else {
            return;
        };

        for variable in propagator.variables() {
            if let Some(subscribers) = self.subscriptions.get_mut(variable) {
                subscribers.retain(|&subscriber| subscriber != id);
            }
        }
        arbor_assert_moderate!(!self.queue.is_propagator_enqueued(id));
    }
}
