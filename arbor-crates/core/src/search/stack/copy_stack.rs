use std::sync::Arc;

use super::SearchStack;
use crate::kernel::BranchingDesc;
use crate::kernel::Model;
use crate::kernel::Space;
use crate::search::commit_alternative;
use crate::statistics::Statistics;

#[derive(Debug)]
struct CopyNode<M: Model> {
    /// A copy of the space at the choice point, before any alternative was committed. Taken by
    /// the last alternative.
    space: Option<Space<M>>,
    alternative: u32,
    last: u32,
    desc: Arc<BranchingDesc>,
}

/// A stack which stores a copy of the space at every choice point.
///
/// Backtracking never replays: the next alternative is committed on a copy of the stored space,
/// and the last alternative takes the stored space itself.
#[derive(Debug)]
pub struct CopyStack<M: Model> {
    nodes: Vec<CopyNode<M>>,
}

impl<M: Model> Default for CopyStack<M> {
    fn default() -> Self {
        CopyStack { nodes: Vec::new() }
    }
}

impl<M: Model> SearchStack<M> for CopyStack<M> {
    fn push(
        &mut self,
        space: &Space<M>,
        desc: Arc<BranchingDesc>,
        distance: &mut u32,
        statistics: &mut Statistics,
    ) {
        statistics.clone += 1;
        *distance = 0;

        self.nodes.push(CopyNode {
            space: Some(space.clone_space(true)),
            alternative: 0,
            last: desc.alternatives() - 1,
            desc,
        });
        statistics.record_depth(self.nodes.len());
        statistics.record_memory(self.memory() + space.memory());
    }

    fn next(&mut self) -> bool {
        while let Some(node) = self.nodes.last_mut() {
            if node.alternative < node.last {
                node.alternative += 1;
                return true;
            }
            let _ = self.nodes.pop();
        }

        false
    }

    fn recompute(&mut self, distance: &mut u32, statistics: &mut Statistics) -> Space<M> {
        let node = self
            .nodes
            .last_mut()
            .expect("recomputation requires a node to backtrack to");

        let stored = if node.alternative == node.last {
            node.space.take()
        } else {
            statistics.clone += 1;
            node.space.as_ref().map(|space| space.clone_space(true))
        };
        let mut space =
            stored.expect("every node of a copying stack holds a copy until its last alternative");

        commit_alternative(&mut space, &node.desc, node.alternative, statistics);
        *distance = 0;

        space
    }

    fn entries(&self) -> usize {
        self.nodes.len()
    }

    fn reset(&mut self) {
        self.nodes.clear();
    }

    fn memory(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| {
                std::mem::size_of::<CopyNode<M>>()
                    + node.space.as_ref().map_or(0, |space| space.memory())
            })
            .sum()
    }
}
