use std::sync::Arc;

use log::debug;

use super::commit_alternative;
use super::Explorer;
use super::SearchEngine;
use super::SearchOptions;
use super::Step;
use crate::kernel::BranchingDesc;
use crate::kernel::Model;
use crate::kernel::Space;
use crate::kernel::SpaceStatus;
use crate::statistics::Statistics;

#[derive(Debug)]
struct ProbeNode<M: Model> {
    space: Space<M>,
    desc: Arc<BranchingDesc>,
    /// The alternatives still to be explored; the next one is at the end.
    remaining: Vec<u32>,
    /// The discrepancies left when this node was reached.
    discrepancy: u32,
}

/// Explores the leaves reachable with exactly a given number of discrepancies.
///
/// Committing to any alternative other than the first costs one discrepancy. Open nodes keep a
/// full copy of their space, so a probe never recomputes.
#[derive(Debug)]
pub(crate) struct Probe<M: Model> {
    stack: Vec<ProbeNode<M>>,
    current: Option<Space<M>>,
    discrepancy: u32,
    /// Whether the probe has not yet cut off an alternative for lack of discrepancies.
    exhausted: bool,
    statistics: Statistics,
}

impl<M: Model> Default for Probe<M> {
    fn default() -> Self {
        Probe {
            stack: Vec::new(),
            current: None,
            discrepancy: 0,
            exhausted: true,
            statistics: Statistics::default(),
        }
    }
}

impl<M: Model> Probe<M> {
    /// Start a probe of `root` with `discrepancy` discrepancies.
    pub(crate) fn reset(&mut self, root: Space<M>, discrepancy: u32) {
        self.stack.clear();
        self.current = Some(root);
        self.discrepancy = discrepancy;
        self.exhausted = true;
    }

    /// Whether the finished probe saw every leaf of the tree, in which case probes with more
    /// discrepancies find nothing new.
    pub(crate) fn exhausted(&self) -> bool {
        self.exhausted
    }

    pub(crate) fn statistics_mut(&mut self) -> &mut Statistics {
        &mut self.statistics
    }

    /// An estimate of the memory held by the open nodes, in bytes.
    fn memory(&self) -> usize {
        self.stack
            .iter()
            .map(|node| std::mem::size_of::<ProbeNode<M>>() + node.space.memory())
            .sum()
    }

    fn backtrack(&mut self) -> Step<M> {
        let Some(node) = self.stack.last_mut() else {
            return Step::Exhausted;
        };

        let alternative = node
            .remaining
            .pop()
            .expect("nodes without remaining alternatives are removed");
        let discrepancy = if alternative == 0 {
            node.discrepancy
        } else {
            node.discrepancy - 1
        };
        let desc = Arc::clone(&node.desc);

        let mut space = if node.remaining.is_empty() {
            self.stack
                .pop()
                .expect("the top node was just inspected")
                .space
        } else {
            self.statistics.clone += 1;
            node.space.clone_space(true)
        };

        commit_alternative(&mut space, &desc, alternative, &mut self.statistics);
        self.discrepancy = discrepancy;
        self.current = Some(space);

        Step::Propagating
    }
}

impl<M: Model> Explorer<M> for Probe<M> {
    fn has_work(&self) -> bool {
        self.current.is_some() || !self.stack.is_empty()
    }

    fn statistics(&self) -> Statistics {
        self.statistics
    }

    fn step(&mut self) -> Step<M> {
        let Some(mut space) = self.current.take() else {
            return self.backtrack();
        };

        match space.status(&mut self.statistics) {
            SpaceStatus::Failed => {
                self.statistics.fail += 1;
                Step::Failed
            }
            SpaceStatus::Solved if self.discrepancy == 0 => Step::Solved(space),
            SpaceStatus::Solved => Step::Skipped,
            SpaceStatus::Branch { alternatives } => {
                let desc = space.description();

                if alternatives > 1 && self.discrepancy > 0 {
                    let mut remaining = vec![0];
                    remaining.extend((2..alternatives).rev());

                    self.statistics.clone += 1;
                    self.stack.push(ProbeNode {
                        space: space.clone_space(true),
                        desc: Arc::clone(&desc),
                        remaining,
                        discrepancy: self.discrepancy,
                    });
                    let memory = self.memory() + space.memory();
                    self.statistics.record_depth(self.stack.len());
                    self.statistics.record_memory(memory);

                    self.discrepancy -= 1;
                    commit_alternative(&mut space, &desc, 1, &mut self.statistics);
                } else {
                    if alternatives > 1 {
                        self.exhausted = false;
                    }
                    commit_alternative(&mut space, &desc, 0, &mut self.statistics);
                }

                self.current = Some(space);
                Step::Branching
            }
        }
    }
}

/// Limited discrepancy search.
///
/// Probes the tree with 0, 1, 2, … discrepancies up to the discrepancy limit of the
/// [`SearchOptions`], each probe starting from a fresh copy of the root. Every leaf with at most
/// that many discrepancies is returned exactly once, grouped by increasing discrepancy. The
/// search ends early once a probe proves that no leaf needs more discrepancies.
#[derive(Debug)]
pub struct Lds<M: Model> {
    root: Option<Space<M>>,
    probe: Probe<M>,
    level: u32,
    limit: u32,
}

impl<M: Model> Lds<M> {
    pub fn new(mut root: Space<M>, options: &SearchOptions) -> Self {
        let mut probe = Probe::default();

        let root = if root.status(probe.statistics_mut()) == SpaceStatus::Failed {
            probe.statistics_mut().fail += 1;
            None
        } else {
            probe.statistics_mut().clone += 1;
            probe.reset(root.clone_space(true), 0);
            Some(root)
        };

        Lds {
            root,
            probe,
            level: 0,
            limit: options.discrepancy_limit,
        }
    }

    /// The number of discrepancies of the current probe.
    pub fn discrepancy(&self) -> u32 {
        self.level
    }
}

impl<M: Model> SearchEngine<M> for Lds<M> {
    fn next(&mut self) -> Option<Space<M>> {
        loop {
            match self.probe.step() {
                Step::Solved(solution) => {
                    debug!("lds found a solution with {} discrepancies", self.level);
                    return Some(solution);
                }
                Step::Exhausted => {}
                Step::Propagating | Step::Branching | Step::Failed | Step::Skipped => continue,
            }

            let root = self.root.as_ref()?;
            if self.probe.exhausted() || self.level >= self.limit {
                self.root = None;
                return None;
            }

            self.level += 1;
            self.probe.statistics_mut().clone += 1;
            let copy = root.clone_space(true);
            self.probe.reset(copy, self.level);
        }
    }

    fn statistics(&self) -> Statistics {
        self.probe.statistics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::discrepancies;
    use crate::testing::generated_tree;
    use crate::testing::paths;
    use crate::testing::scenario_tree;
    use crate::testing::space;
    use crate::testing::Tree;

    fn lds_solutions(tree: &Tree, limit: u32) -> Vec<Vec<u32>> {
        let options = SearchOptions::default().with_discrepancy_limit(limit);
        let mut lds = Lds::new(space(tree.clone()), &options);
        paths(std::iter::from_fn(|| lds.next()))
    }

    fn sorted(mut paths: Vec<Vec<u32>>) -> Vec<Vec<u32>> {
        paths.sort();
        paths
    }

    #[test]
    fn no_discrepancies_follows_the_first_alternatives() {
        assert_eq!(lds_solutions(&scenario_tree(), 0), vec![vec![0, 0, 0]]);
    }

    #[test]
    fn leaves_are_grouped_by_increasing_discrepancy() {
        let found = lds_solutions(&scenario_tree(), 3);

        let counts = found
            .iter()
            .map(|path| discrepancies(path))
            .collect::<Vec<_>>();
        assert!(counts.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(sorted(found), sorted(scenario_tree().solutions()));
    }

    #[test]
    fn raising_the_limit_only_adds_solutions() {
        for seed in 0..20 {
            let tree = generated_tree(seed, 5);

            for limit in 0..4 {
                let expected = tree
                    .solutions()
                    .into_iter()
                    .filter(|path| discrepancies(path) <= limit)
                    .collect::<Vec<_>>();
                let found = lds_solutions(&tree, limit);
                let relaxed = lds_solutions(&tree, limit + 1);

                assert_eq!(sorted(found.clone()), sorted(expected), "seed {seed}");
                assert!(
                    found.iter().all(|path| relaxed.contains(path)),
                    "seed {seed}"
                );
            }
        }
    }

    #[test]
    fn an_exhausted_probe_ends_the_search() {
        let options = SearchOptions::default().with_discrepancy_limit(u32::MAX);
        let mut lds = Lds::new(space(scenario_tree()), &options);

        let found = paths(std::iter::from_fn(|| lds.next()));

        assert_eq!(found.len(), 5);
        assert_eq!(lds.discrepancy(), 3);
        assert!(lds.statistics().memory > 0);
    }

    #[test]
    fn a_failed_root_is_counted_once() {
        let mut lds = Lds::new(space(Tree::Fail), &SearchOptions::default());

        assert!(lds.next().is_none());
        assert_eq!(lds.statistics().fail, 1);
        assert_eq!(lds.statistics().clone, 0);
    }
}
