use std::sync::Arc;

use log::trace;

use super::SearchStack;
use crate::kernel::BranchingDesc;
use crate::kernel::Constrain;
use crate::kernel::Model;
use crate::kernel::Space;
use crate::kernel::SpaceStatus;
use crate::parallel::SharePolicy;
use crate::parallel::ShareStrategy;
use crate::search::commit_alternative;
use crate::statistics::Statistics;

#[derive(Debug)]
struct ReCoNode<M: Model> {
    /// A copy of the space at this choice point, if one is stored.
    space: Option<Space<M>>,
    /// The alternative currently being explored.
    alternative: u32,
    /// The last alternative this node is responsible for; lowered when alternatives are shared.
    last: u32,
    desc: Arc<BranchingDesc>,
}

impl<M: Model> ReCoNode<M> {
    fn rightmost(&self) -> bool {
        self.alternative >= self.last
    }

    /// Give away the last alternative of this node.
    fn steal_last(&mut self) -> u32 {
        let stolen = self.last;
        self.last -= 1;
        stolen
    }
}

/// A stack which stores copies sparsely and recomputes the other spaces on demand.
///
/// A copy is stored at most every `commit_distance` choice points. To backtrack, the stack
/// copies the nearest stored ancestor and replays the decisions between it and the target.
/// Two refinements keep replaying cheap:
/// - When the top node holds a copy and only its last alternative is left, that copy is used
///   directly without copying it again.
/// - When the replay distance is at least `adaptive_distance`, an extra copy is stored halfway
///   along the replayed path, so that later backtracking into that region is shorter.
#[derive(Debug)]
pub struct ReCoStack<M: Model> {
    nodes: Vec<ReCoNode<M>>,
    commit_distance: u32,
    adaptive_distance: u32,
    /// The memory held by the stored copies.
    stored_memory: usize,
}

impl<M: Model> ReCoStack<M> {
    pub fn new(commit_distance: u32, adaptive_distance: u32) -> Self {
        ReCoStack {
            nodes: Vec::new(),
            commit_distance: commit_distance.max(1),
            adaptive_distance,
            stored_memory: 0,
        }
    }

    /// Remove the nodes from `depth` upwards.
    pub fn unwind(&mut self, depth: usize) {
        for node in self.nodes.drain(depth..) {
            if let Some(space) = node.space {
                self.stored_memory -= space.memory();
            }
        }
    }

    /// Give away an alternative of an open node as a standalone space.
    ///
    /// Nothing is shared while the stack holds `stack_size_threshold` nodes or fewer. The node is
    /// selected according to the policy; its last alternative is removed from this stack and
    /// the space for it is rebuilt from the nearest stored ancestor copy.
    pub(crate) fn share(
        &mut self,
        strategy: &ShareStrategy,
        statistics: &mut Statistics,
    ) -> Option<Space<M>> {
        if self.nodes.len() <= strategy.stack_size_threshold {
            return None;
        }

        let position = self.share_position(strategy.policy)?;
        let level = self.last_clone(position);

        let mut space = self.copy_at(level, statistics);
        for node in &self.nodes[level..position] {
            commit_alternative(&mut space, &node.desc, node.alternative, statistics);
        }

        let node = &mut self.nodes[position];
        let alternative = node.steal_last();
        commit_alternative(&mut space, &node.desc, alternative, statistics);
        trace!("shared alternative {alternative} of the node at depth {position}");

        Some(space)
    }

    fn share_position(&self, policy: SharePolicy) -> Option<usize> {
        let nodes = &self.nodes;
        let mut open = (0..nodes.len()).filter(|&index| !nodes[index].rightmost());

        match policy {
            SharePolicy::Bottom => open.next(),
            SharePolicy::Top => open.last(),
            SharePolicy::Recomputation => {
                open.min_by_key(|&index| index - self.last_clone(index))
            }
        }
    }

    /// The index of the highest node at or below `depth` that stores a copy.
    ///
    /// The lowest node always stores one: it is pushed with a commit distance of zero, and the
    /// node above a node whose copy was consumed is pushed with a distance of zero as well.
    fn last_clone(&self, depth: usize) -> usize {
        self.nodes[..=depth]
            .iter()
            .rposition(|node| node.space.is_some())
            .expect("the lowest node of a recomputation stack stores a copy")
    }

    fn copy_at(&self, depth: usize, statistics: &mut Statistics) -> Space<M> {
        statistics.clone += 1;
        self.nodes[depth]
            .space
            .as_ref()
            .expect("copies are only made of nodes that store one")
            .clone_space(true)
    }

    fn store(&mut self, depth: usize, space: Space<M>) {
        self.stored_memory += space.memory();
        self.nodes[depth].space = Some(space);
    }

    fn take(&mut self, depth: usize) -> Option<Space<M>> {
        let space = self.nodes[depth].space.take()?;
        self.stored_memory -= space.memory();
        Some(space)
    }

    /// If the top node stores a copy and is at its last alternative, commit that copy.
    fn take_last_alternative(&mut self, statistics: &mut Statistics) -> Option<Space<M>> {
        let top = self.nodes.len().checked_sub(1)?;
        if !self.nodes[top].rightmost() {
            return None;
        }

        let mut space = self.take(top)?;
        let node = &self.nodes[top];
        commit_alternative(&mut space, &node.desc, node.alternative, statistics);

        Some(space)
    }

    /// Replay the nodes from `level` to the top on `space`, a copy of the node at `level`.
    ///
    /// When `distance` reaches the adaptive distance, the space is propagated halfway (after
    /// skipping nodes that are at their last alternative) and a copy is stored there. Returns
    /// the depth of that node as an error if the space turns out to be failed.
    fn adaptive_replay(
        &mut self,
        mut space: Space<M>,
        level: usize,
        distance: &mut u32,
        statistics: &mut Statistics,
    ) -> Result<Space<M>, usize> {
        let top = self.nodes.len();

        let mut index = level;
        if *distance >= self.adaptive_distance {
            let middle = level + (*distance as usize >> 1);

            while index < middle {
                self.replay(&mut space, index, statistics);
                index += 1;
            }
            while index < top && self.nodes[index].rightmost() {
                self.replay(&mut space, index, statistics);
                index += 1;
            }

            if index + 1 < top {
                if space.status(statistics) == SpaceStatus::Failed {
                    statistics.fail += 1;
                    return Err(index);
                }

                statistics.clone += 1;
                self.store(index, space.clone_space(true));
                *distance = (top - index) as u32;
            }
        }

        while index < top {
            self.replay(&mut space, index, statistics);
            index += 1;
        }

        Ok(space)
    }

    fn replay(&self, space: &mut Space<M>, depth: usize, statistics: &mut Statistics) {
        let node = &self.nodes[depth];
        commit_alternative(space, &node.desc, node.alternative, statistics);
    }
}

impl<M: Constrain> ReCoStack<M> {
    /// Recompute the space for the current alternative, constrained by `best`.
    ///
    /// Nodes below `mark` were pushed before `best` was found, so their stored copies are not yet
    /// constrained by it. The copy used for recomputation is constrained whenever it lies below
    /// the mark, which then moves down to it. Returns `None` if constraining fails the space,
    /// after removing the nodes that lead to it.
    pub fn recompute_constrained(
        &mut self,
        distance: &mut u32,
        statistics: &mut Statistics,
        best: &M,
        mark: &mut usize,
    ) -> Option<Space<M>> {
        let top = self.nodes.len() - 1;

        if let Some(mut space) = self.take_last_alternative(statistics) {
            *distance = 0;
            if *mark > top {
                *mark = top;
                space.constrain(best);
            }
            return Some(space);
        }

        let level = self.last_clone(top);
        *distance = (self.nodes.len() - level) as u32;

        let space = if level < *mark {
            *mark = level;

            let mut stored = self
                .take(level)
                .expect("the nearest stored copy was just located");
            stored.constrain(best);
            if stored.status(statistics) == SpaceStatus::Failed {
                statistics.fail += 1;
                self.unwind(level);
                return None;
            }

            statistics.clone += 1;
            self.store(level, stored.clone_space(true));
            stored
        } else {
            self.copy_at(level, statistics)
        };

        match self.adaptive_replay(space, level, distance, statistics) {
            Ok(space) => Some(space),
            Err(depth) => {
                self.unwind(depth);
                None
            }
        }
    }
}

impl<M: Model> SearchStack<M> for ReCoStack<M> {
    fn push(
        &mut self,
        space: &Space<M>,
        desc: Arc<BranchingDesc>,
        distance: &mut u32,
        statistics: &mut Statistics,
    ) {
        let stored = if *distance == 0 || *distance >= self.commit_distance {
            *distance = 1;
            statistics.clone += 1;
            Some(space.clone_space(true))
        } else {
            *distance += 1;
            None
        };

        self.nodes.push(ReCoNode {
            space: None,
            alternative: 0,
            last: desc.alternatives() - 1,
            desc,
        });
        if let Some(stored) = stored {
            self.store(self.nodes.len() - 1, stored);
        }

        statistics.record_depth(self.nodes.len());
        statistics.record_memory(self.memory() + space.memory());
    }

    fn next(&mut self) -> bool {
        while let Some(node) = self.nodes.last_mut() {
            if !node.rightmost() {
                node.alternative += 1;
                return true;
            }
            self.unwind(self.nodes.len() - 1);
        }

        false
    }

    fn recompute(&mut self, distance: &mut u32, statistics: &mut Statistics) -> Space<M> {
        if let Some(space) = self.take_last_alternative(statistics) {
            *distance = 0;
            return space;
        }

        let top = self.nodes.len() - 1;
        let level = self.last_clone(top);
        *distance = (self.nodes.len() - level) as u32;

        let space = self.copy_at(level, statistics);
        match self.adaptive_replay(space, level, distance, statistics) {
            Ok(space) => space,
            Err(depth) => panic!(
                "recomputation diverged: the space at depth {depth} failed while replaying decisions that previously led past it"
            ),
        }
    }

    fn entries(&self) -> usize {
        self.nodes.len()
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.stored_memory = 0;
    }

    fn memory(&self) -> usize {
        self.stored_memory + self.nodes.len() * std::mem::size_of::<ReCoNode<M>>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::space;
    use crate::testing::FailOnRevisit;
    use crate::testing::Tree;
    use crate::testing::TreeModel;

    /// A tree whose first alternatives form a path of binary choice points.
    fn chain(depth: usize) -> Tree {
        if depth == 0 {
            Tree::Leaf(0)
        } else {
            Tree::node([chain(depth - 1), Tree::Leaf(depth as i64)])
        }
    }

    /// Push the first `depth` choice points of `chain(depth)` and return the space below them.
    fn descend(
        stack: &mut ReCoStack<TreeModel>,
        depth: usize,
        statistics: &mut Statistics,
    ) -> Space<TreeModel> {
        descend_from(stack, space(chain(depth)), depth, statistics)
    }

    fn descend_from(
        stack: &mut ReCoStack<TreeModel>,
        mut space: Space<TreeModel>,
        depth: usize,
        statistics: &mut Statistics,
    ) -> Space<TreeModel> {
        let mut distance = 0;

        for _ in 0..depth {
            assert!(matches!(
                space.status(statistics),
                SpaceStatus::Branch { alternatives: 2 }
            ));
            let desc = space.description();
            stack.push(&space, Arc::clone(&desc), &mut distance, statistics);
            commit_alternative(&mut space, &desc, 0, statistics);
        }

        space
    }

    fn strategy(policy: SharePolicy) -> ShareStrategy {
        ShareStrategy::default()
            .with_policy(policy)
            .with_stack_size_threshold(0)
    }

    #[test]
    fn copies_are_stored_every_commit_distance() {
        let mut statistics = Statistics::default();
        let mut stack = ReCoStack::new(3, 2);

        let _ = descend(&mut stack, 5, &mut statistics);

        assert_eq!(statistics.clone, 2);
        assert_eq!(stack.last_clone(2), 0);
        assert_eq!(stack.last_clone(4), 3);
    }

    #[test]
    fn the_last_alternative_takes_the_stored_copy() {
        let mut statistics = Statistics::default();
        let mut stack = ReCoStack::new(1, 2);
        let _ = descend(&mut stack, 2, &mut statistics);
        let clones = statistics.clone;

        let mut distance = 1;
        assert!(stack.next());
        let space = stack.recompute(&mut distance, &mut statistics);

        assert_eq!(space.model().path(), &[0, 1]);
        assert_eq!(statistics.clone, clones);
        assert_eq!(distance, 0);
    }

    #[test]
    fn long_recomputations_store_a_copy_halfway() {
        for (adaptive_distance, clones, anchor) in [(2, 3, 2), (100, 2, 0)] {
            let mut statistics = Statistics::default();
            let mut stack = ReCoStack::new(100, adaptive_distance);
            let _ = descend(&mut stack, 4, &mut statistics);

            let mut distance = 4;
            assert!(stack.next());
            let space = stack.recompute(&mut distance, &mut statistics);

            assert_eq!(space.model().path(), &[0, 0, 0, 1]);
            assert_eq!(statistics.clone, clones, "a_d {adaptive_distance}");
            assert_eq!(stack.last_clone(3), anchor, "a_d {adaptive_distance}");
        }
    }

    #[test]
    #[should_panic(expected = "recomputation diverged")]
    fn a_space_failing_only_on_replay_is_fatal() {
        let mut statistics = Statistics::default();
        let mut stack = ReCoStack::new(100, 2);
        let mut root = space(chain(4));
        let _ = root.post_propagator(FailOnRevisit::new([0, 0]));
        let _ = descend_from(&mut stack, root, 4, &mut statistics);

        let mut distance = 4;
        assert!(stack.next());
        let _ = stack.recompute(&mut distance, &mut statistics);
    }

    #[test]
    fn each_policy_shares_its_own_node() {
        let mut statistics = Statistics::default();
        let mut stack = ReCoStack::new(3, 2);
        let _ = descend(&mut stack, 5, &mut statistics);

        let mut share = |policy| {
            stack
                .share(&strategy(policy), &mut statistics)
                .map(|space| space.model().path().to_vec())
        };

        assert_eq!(share(SharePolicy::Bottom), Some(vec![1]));
        assert_eq!(share(SharePolicy::Recomputation), Some(vec![0, 0, 0, 1]));
        assert_eq!(share(SharePolicy::Top), Some(vec![0, 0, 0, 0, 1]));
        assert_eq!(share(SharePolicy::Bottom), Some(vec![0, 1]));
        assert_eq!(share(SharePolicy::Top), Some(vec![0, 0, 1]));
        assert_eq!(share(SharePolicy::Top), None);
    }

    #[test]
    fn shared_alternatives_are_not_explored_by_the_donor() {
        let mut statistics = Statistics::default();
        let mut stack = ReCoStack::new(2, 2);
        let _ = descend(&mut stack, 3, &mut statistics);

        let shared = stack
            .share(&strategy(SharePolicy::Top), &mut statistics)
            .expect("the stack has open nodes");
        assert_eq!(shared.model().path(), &[0, 0, 1]);

        let mut distance = 0;
        let mut explored = Vec::new();
        while stack.next() {
            let space = stack.recompute(&mut distance, &mut statistics);
            explored.push(space.model().path().to_vec());
        }

        assert_eq!(explored, vec![vec![0, 1], vec![1]]);
    }

    #[test]
    fn small_stacks_are_not_shared() {
        let mut statistics = Statistics::default();
        let mut stack = ReCoStack::new(8, 2);
        let _ = descend(&mut stack, 3, &mut statistics);

        let threshold = ShareStrategy::default();
        assert_eq!(threshold.stack_size_threshold, 3);
        assert!(stack.share(&threshold, &mut statistics).is_none());
    }
}
