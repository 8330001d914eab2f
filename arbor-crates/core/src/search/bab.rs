use std::sync::Arc;

use log::debug;
use log::trace;

use super::commit_alternative;
use super::stack::ReCoStack;
use super::stack::SearchStack;
use super::Explorer;
use super::SearchEngine;
use super::SearchOptions;
use super::Step;
use crate::kernel::Constrain;
use crate::kernel::Space;
use crate::kernel::SpaceStatus;
use crate::parallel::ShareStrategy;
use crate::statistics::Statistics;

/// The branch-and-bound exploration loop shared by [`Bab`] and the parallel workers.
///
/// Explores depth-first like [`super::DepthFirst`], but every space taken from the stack is
/// constrained to be better than the best solution found so far. Nodes below `mark` were
/// pushed before the current best solution was known, so their stored copies are not yet
/// constrained by it; the stack constrains them lazily when it recomputes from them.
#[derive(Debug)]
pub(crate) struct BranchAndBound<M: Constrain> {
    current: Option<Space<M>>,
    stack: ReCoStack<M>,
    distance: u32,
    best: Option<Arc<M>>,
    /// A copy of the best solution while it is one this explorer found itself.
    own_best: Option<Space<M>>,
    mark: usize,
    statistics: Statistics,
}

impl<M: Constrain> BranchAndBound<M> {
    pub(crate) fn new(root: Option<Space<M>>, stack: ReCoStack<M>) -> Self {
        BranchAndBound {
            current: root,
            stack,
            distance: 0,
            best: None,
            own_best: None,
            mark: 0,
            statistics: Statistics::default(),
        }
    }

    /// Start exploring the subtree rooted at `root`, constrained by the best solution so far.
    pub(crate) fn reset(&mut self, mut root: Space<M>) {
        if let Some(best) = &self.best {
            root.constrain(best);
        }

        self.stack.reset();
        self.current = Some(root);
        self.distance = 0;
        self.mark = 0;
    }

    /// Adopt a solution found elsewhere, unless the best solution found by this explorer is
    /// strictly better.
    pub(crate) fn improve(&mut self, incumbent: Arc<M>) {
        if let Some(own_best) = &self.own_best {
            let mut check = own_best.clone_space(true);
            check.constrain(&incumbent);
            if check.status(&mut self.statistics) != SpaceStatus::Failed {
                trace!("kept the own best solution over a worse incumbent");
                return;
            }
        }

        self.own_best = None;
        self.mark = self.stack.entries();
        if let Some(current) = &mut self.current {
            current.constrain(&incumbent);
        }
        self.best = Some(incumbent);
    }

    pub(crate) fn best(&self) -> Option<&Arc<M>> {
        self.best.as_ref()
    }

    /// Give away an open alternative of the stack as a standalone space.
    pub(crate) fn share_subtree(&mut self, strategy: &ShareStrategy) -> Option<Space<M>> {
        self.stack.share(strategy, &mut self.statistics)
    }
}

impl<M: Constrain> Explorer<M> for BranchAndBound<M> {
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

            self.current = match &self.best {
                None => Some(
                    self.stack
                        .recompute(&mut self.distance, &mut self.statistics),
                ),
                Some(best) => self.stack.recompute_constrained(
                    &mut self.distance,
                    &mut self.statistics,
                    best,
                    &mut self.mark,
                ),
            };

            return if self.current.is_some() {
                Step::Propagating
            } else {
                Step::Failed
            };
        };

        match space.status(&mut self.statistics) {
            SpaceStatus::Failed => {
                self.statistics.fail += 1;
                Step::Failed
            }
            SpaceStatus::Solved => {
                self.best = Some(Arc::new(space.model().clone()));
                self.own_best = Some(space.clone_space(true));
                self.mark = self.stack.entries();
                Step::Solved(space)
            }
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

/// Branch-and-bound search.
///
/// Every solution returned is strictly better than the previous one, as decided by
/// [`Constrain::constrain`]; the last solution returned is a best solution.
#[derive(Debug)]
pub struct Bab<M: Constrain> {
    explorer: BranchAndBound<M>,
}

impl<M: Constrain> Bab<M> {
    pub fn new(root: Space<M>, options: &SearchOptions) -> Self {
        Bab {
            explorer: BranchAndBound::new(
                Some(root),
                ReCoStack::new(options.commit_distance, options.adaptive_distance),
            ),
        }
    }

    /// The model of the best solution found so far.
    pub fn best(&self) -> Option<&M> {
        self.explorer.best().map(Arc::as_ref)
    }
}

impl<M: Constrain> SearchEngine<M> for Bab<M> {
    fn next(&mut self) -> Option<Space<M>> {
        loop {
            match self.explorer.step() {
                Step::Solved(solution) => {
                    debug!("bab found an improving solution");
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Dfs;
    use crate::testing::generated_tree;
    use crate::testing::scenario_tree;
    use crate::testing::space;
    use crate::testing::Tree;
    use crate::testing::TreeModel;

    fn costs(engine: &mut Bab<TreeModel>) -> Vec<i64> {
        std::iter::from_fn(|| engine.next())
            .map(|solution| solution.model().cost().expect("solutions are leaves"))
            .collect()
    }

    #[test]
    fn solutions_improve_strictly() {
        let mut bab = Bab::new(space(scenario_tree()), &SearchOptions::default());

        assert_eq!(costs(&mut bab), vec![9, 4, 2]);
        assert_eq!(bab.best().and_then(TreeModel::cost), Some(2));
    }

    #[test]
    fn the_last_solution_is_optimal_for_any_recomputation_setting() {
        for seed in 0..20 {
            let tree = generated_tree(seed, 6);
            let optimum = tree.min_cost();

            for (commit_distance, adaptive_distance) in [(1, 1), (2, 1), (8, 2), (100, 3)] {
                let options = SearchOptions::default()
                    .with_commit_distance(commit_distance)
                    .with_adaptive_distance(adaptive_distance);
                let mut bab = Bab::new(space(tree.clone()), &options);

                let found = costs(&mut bab);

                assert!(
                    found.windows(2).all(|pair| pair[1] < pair[0]),
                    "seed {seed}: {found:?} does not improve strictly"
                );
                assert_eq!(found.last().copied(), optimum, "seed {seed}");
            }
        }
    }

    #[test]
    fn an_adopted_incumbent_prunes_the_search() {
        let mut explorer =
            BranchAndBound::new(Some(space(scenario_tree())), ReCoStack::new(8, 2));
        explorer.improve(Arc::new(leaf_model(4)));

        let mut found = Vec::new();
        loop {
            match explorer.step() {
                Step::Solved(solution) => found.push(solution.model().cost()),
                Step::Exhausted => break,
                _ => {}
            }
        }

        assert_eq!(found, vec![Some(2)]);
        assert_eq!(explorer.statistics().fail, 3);
    }

    fn explore_adopting(
        explorer: &mut BranchAndBound<TreeModel>,
        after_cost: i64,
        incumbent: TreeModel,
    ) -> Vec<i64> {
        let mut incumbent = Some(Arc::new(incumbent));
        let mut found = Vec::new();
        loop {
            match explorer.step() {
                Step::Solved(solution) => {
                    let cost = solution.model().cost().expect("solutions are leaves");
                    found.push(cost);
                    if cost == after_cost {
                        if let Some(incumbent) = incumbent.take() {
                            explorer.improve(incumbent);
                        }
                    }
                }
                Step::Exhausted => break,
                _ => {}
            }
        }
        found
    }

    fn leaf_model(cost: i64) -> TreeModel {
        let mut dfs = Dfs::new(space(scenario_tree()), &SearchOptions::default());
        std::iter::from_fn(|| dfs.next())
            .map(Space::into_model)
            .find(|model| model.cost() == Some(cost))
            .expect("the scenario tree has a leaf of this cost")
    }

    #[test]
    fn a_worse_incumbent_does_not_replace_the_own_best() {
        let mut explorer =
            BranchAndBound::new(Some(space(scenario_tree())), ReCoStack::new(8, 2));

        let found = explore_adopting(&mut explorer, 4, leaf_model(9));

        assert_eq!(found, vec![9, 4, 2]);
        assert_eq!(explorer.best().and_then(|best| best.cost()), Some(2));
    }

    #[test]
    fn a_better_incumbent_replaces_the_own_best() {
        let mut explorer =
            BranchAndBound::new(Some(space(scenario_tree())), ReCoStack::new(8, 2));

        let found = explore_adopting(&mut explorer, 9, leaf_model(4));

        assert_eq!(found, vec![9, 2]);
    }

    #[test]
    fn a_tree_without_leaves_has_no_best_solution() {
        let tree = Tree::node([Tree::Fail, Tree::node([Tree::Fail, Tree::Fail])]);

        assert!(crate::search::bab(space(tree), &SearchOptions::default()).is_none());
    }
}
