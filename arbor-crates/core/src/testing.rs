//! A model whose search tree is given explicitly, for testing the engines.
//!
//! The model is a path into a [`Tree`]. Committing alternative `i` descends into child `i`;
//! a propagator fails every space whose path ends in [`Tree::Fail`], and a space is solved when
//! its path ends in a [`Tree::Leaf`]. Leaves carry a cost which branch-and-bound minimises.
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::kernel::Branching;
use crate::kernel::BranchingDesc;
use crate::kernel::BranchingId;
use crate::kernel::Constrain;
use crate::kernel::ExecStatus;
use crate::kernel::Inconsistency;
use crate::kernel::Model;
use crate::kernel::PropagationContext;
use crate::kernel::PropagationStatus;
use crate::kernel::Propagator;
use crate::kernel::Space;
use crate::kernel::VariableId;

const PATH: VariableId = VariableId(0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Tree {
    Leaf(i64),
    Fail,
    Node(Vec<Tree>),
}

impl Tree {
    pub(crate) fn node(children: impl IntoIterator<Item = Tree>) -> Tree {
        Tree::Node(children.into_iter().collect())
    }

    /// The paths to all leaves, in depth-first order.
    pub(crate) fn solutions(&self) -> Vec<Vec<u32>> {
        let mut paths = Vec::new();
        self.collect_solutions(&mut Vec::new(), &mut paths);
        paths
    }

    fn collect_solutions(&self, path: &mut Vec<u32>, paths: &mut Vec<Vec<u32>>) {
        match self {
            Tree::Leaf(_) => paths.push(path.clone()),
            Tree::Fail => {}
            Tree::Node(children) => {
                for (alternative, child) in children.iter().enumerate() {
                    path.push(alternative as u32);
                    child.collect_solutions(path, paths);
                    let _ = path.pop();
                }
            }
        }
    }

    pub(crate) fn internal_nodes(&self) -> usize {
        match self {
            Tree::Node(children) => 1 + children.iter().map(Tree::internal_nodes).sum::<usize>(),
            _ => 0,
        }
    }

    /// The cheapest leaf below this tree.
    pub(crate) fn min_cost(&self) -> Option<i64> {
        match self {
            Tree::Leaf(cost) => Some(*cost),
            Tree::Fail => None,
            Tree::Node(children) => children.iter().filter_map(Tree::min_cost).min(),
        }
    }

    pub(crate) fn cost_of(&self, path: &[u32]) -> Option<i64> {
        match self.subtree(path) {
            Tree::Leaf(cost) => Some(*cost),
            _ => None,
        }
    }

    fn subtree(&self, path: &[u32]) -> &Tree {
        path.iter().fold(self, |tree, &alternative| match tree {
            Tree::Node(children) => &children[alternative as usize],
            _ => panic!("the path descends below a leaf"),
        })
    }
}

/// The number of alternatives other than the first along `path`.
pub(crate) fn discrepancies(path: &[u32]) -> u32 {
    path.iter().filter(|&&alternative| alternative != 0).count() as u32
}

/// The tree used by most scenarios: five leaves at depth two and three, one unary choice point.
///
/// ```text
///            root
///          /      \
///        x          y
///        |        /   \
///        w      (7)    n
///       / \           / \
///     (9) (4)       (2) (8)
/// ```
pub(crate) fn scenario_tree() -> Tree {
    Tree::node([
        Tree::node([Tree::node([Tree::Leaf(9), Tree::Leaf(4)])]),
        Tree::node([Tree::Leaf(7), Tree::node([Tree::Leaf(2), Tree::Leaf(8)])]),
    ])
}

/// A pseudo-random tree with mixed arity, failures and costs.
pub(crate) fn generated_tree(seed: u64, depth: u32) -> Tree {
    let mut state = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    generate(&mut state, depth)
}

fn generate(state: &mut u64, depth: u32) -> Tree {
    *state ^= *state << 13;
    *state ^= *state >> 7;
    *state ^= *state << 17;
    let roll = *state % 10;

    if depth == 0 || roll == 0 {
        if roll % 4 == 1 {
            Tree::Fail
        } else {
            Tree::Leaf((*state % 97) as i64)
        }
    } else {
        let arity = 1 + (*state / 10 % 3) as usize;
        Tree::Node((0..arity).map(|_| generate(state, depth - 1)).collect())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TreeModel {
    tree: Arc<Tree>,
    path: Vec<u32>,
}

impl TreeModel {
    pub(crate) fn path(&self) -> &[u32] {
        &self.path
    }

    pub(crate) fn cost(&self) -> Option<i64> {
        self.tree.cost_of(&self.path)
    }

    fn subtree(&self) -> &Tree {
        self.tree.subtree(&self.path)
    }
}

impl Model for TreeModel {
    fn copy(&self, share: bool) -> Self {
        let tree = if share {
            Arc::clone(&self.tree)
        } else {
            Arc::new(self.tree.as_ref().clone())
        };

        TreeModel {
            tree,
            path: self.path.clone(),
        }
    }
}

impl Constrain for TreeModel {
    fn constrain(home: &mut Space<Self>, incumbent: &Self) {
        if let Some(bound) = incumbent.cost() {
            let _ = home.post_propagator(CostBelow { bound });
        }
    }
}

/// Fails spaces whose path ends in a failure.
#[derive(Debug, Clone, Copy)]
struct FailOnFailure;

impl Propagator<TreeModel> for FailOnFailure {
    fn name(&self) -> &str {
        "FailOnFailure"
    }

    fn variables(&self) -> Vec<VariableId> {
        vec![PATH]
    }

    fn propagate(&mut self, context: &mut PropagationContext<'_, TreeModel>) -> PropagationStatus {
        match context.model().subtree() {
            Tree::Fail => Err(Inconsistency),
            _ => Ok(ExecStatus::Fix),
        }
    }
}

/// Fails spaces which cannot reach a leaf cheaper than `bound`.
#[derive(Debug, Clone, Copy)]
struct CostBelow {
    bound: i64,
}

impl Propagator<TreeModel> for CostBelow {
    fn name(&self) -> &str {
        "CostBelow"
    }

    fn variables(&self) -> Vec<VariableId> {
        vec![PATH]
    }

    fn propagate(&mut self, context: &mut PropagationContext<'_, TreeModel>) -> PropagationStatus {
        match context.model().subtree().min_cost() {
            Some(cost) if cost < self.bound => Ok(ExecStatus::Fix),
            _ => Err(Inconsistency),
        }
    }
}

/// Fails the space at `path` from its second propagation on, in any copy of the space.
///
/// The visit counter is shared between copies, which makes the propagator non-deterministic:
/// a path that was passed on the way down fails when it is reached again by recomputation.
#[derive(Debug, Clone)]
pub(crate) struct FailOnRevisit {
    path: Vec<u32>,
    visits: Arc<AtomicU32>,
}

impl FailOnRevisit {
    pub(crate) fn new(path: impl Into<Vec<u32>>) -> Self {
        FailOnRevisit {
            path: path.into(),
            visits: Arc::default(),
        }
    }
}

impl Propagator<TreeModel> for FailOnRevisit {
    fn name(&self) -> &str {
        "FailOnRevisit"
    }

    fn variables(&self) -> Vec<VariableId> {
        vec![PATH]
    }

    fn propagate(&mut self, context: &mut PropagationContext<'_, TreeModel>) -> PropagationStatus {
        if context.model().path != self.path {
            return Ok(ExecStatus::Fix);
        }

        if self.visits.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(ExecStatus::Fix)
        } else {
            Err(Inconsistency)
        }
    }
}

/// Descends into the children of the current node.
#[derive(Debug, Clone, Copy)]
struct Descend;

impl Branching<TreeModel> for Descend {
    fn name(&self) -> &str {
        "Descend"
    }

    fn status(&self, model: &TreeModel) -> bool {
        matches!(model.subtree(), Tree::Node(_))
    }

    fn description(&self, id: BranchingId, model: &TreeModel) -> BranchingDesc {
        let Tree::Node(children) = model.subtree() else {
            panic!("only nodes are described");
        };
        BranchingDesc::new(id, children.len() as u32, [model.path.len() as i64])
    }

    fn commit(
        &self,
        context: &mut PropagationContext<'_, TreeModel>,
        desc: &BranchingDesc,
        alternative: u32,
    ) -> Result<(), Inconsistency> {
        assert_eq!(
            desc.value(0),
            context.model().path.len() as i64,
            "decisions are committed in the order they were made"
        );
        let _ = context.modify(PATH, |model| {
            model.path.push(alternative);
            Ok(true)
        })?;
        Ok(())
    }
}

pub(crate) fn space(tree: Tree) -> Space<TreeModel> {
    let mut space = Space::new(TreeModel {
        tree: Arc::new(tree),
        path: Vec::new(),
    });
    let _ = space.post_propagator(FailOnFailure);
    let _ = space.post_branching(Descend);
    space
}

/// The paths of the given solutions.
pub(crate) fn paths(solutions: impl IntoIterator<Item = Space<TreeModel>>) -> Vec<Vec<u32>> {
    solutions
        .into_iter()
        .map(|solution| solution.model().path().to_vec())
        .collect()
}
