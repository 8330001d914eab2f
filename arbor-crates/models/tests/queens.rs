use std::collections::BTreeSet;

use arbor_core::parallel::SharePolicy;
use arbor_core::parallel::ShareStrategy;
use arbor_core::search::Dfs;
use arbor_core::search::Lds;
use arbor_core::Controller;
use arbor_core::SearchEngine;
use arbor_core::SearchOptions;
use arbor_core::Space;
use arbor_models::branching::BranchingOptions;
use arbor_models::branching::ValueOrder;
use arbor_models::branching::VariableOrder;
use arbor_models::problems::Queens;
use arbor_models::problems::QueensPropagation;

const EIGHT_QUEENS_SOLUTIONS: usize = 92;

fn placements(engine: &mut impl SearchEngine<Queens>) -> Vec<Vec<i32>> {
    let mut placements = Vec::new();
    while let Some(solution) = engine.next() {
        let placement = solution
            .model()
            .placement()
            .expect("a solution places every queen");
        assert!(Queens::is_valid_placement(&placement));
        placements.push(placement);
    }
    placements
}

fn root(propagation: QueensPropagation) -> Space<Queens> {
    Queens::space(8, propagation, &BranchingOptions::default())
}

#[test]
fn eight_queens_has_92_solutions() {
    for propagation in [QueensPropagation::Binary, QueensPropagation::AllDifferent] {
        let mut engine = Dfs::new(root(propagation), &SearchOptions::default());
        let found = placements(&mut engine);

        assert_eq!(found.len(), EIGHT_QUEENS_SOLUTIONS);
        assert_eq!(
            found.iter().collect::<BTreeSet<_>>().len(),
            EIGHT_QUEENS_SOLUTIONS
        );
    }
}

#[test]
fn recomputation_and_copying_find_the_same_sequence() {
    let copying = placements(&mut Dfs::with_copying(root(QueensPropagation::AllDifferent)));

    for commit_distance in [1, 2, 5, 100] {
        let options = SearchOptions::default()
            .with_commit_distance(commit_distance)
            .with_adaptive_distance(3);
        let mut engine = Dfs::new(root(QueensPropagation::AllDifferent), &options);

        assert_eq!(placements(&mut engine), copying);
    }
}

#[test]
fn recomputation_trades_clones_for_commits() {
    let mut copying = Dfs::with_copying(root(QueensPropagation::Binary));
    let _ = placements(&mut copying);

    let options = SearchOptions::default()
        .with_commit_distance(8)
        .with_adaptive_distance(u32::MAX);
    let mut recomputing = Dfs::new(root(QueensPropagation::Binary), &options);
    let _ = placements(&mut recomputing);

    assert!(recomputing.statistics().clone < copying.statistics().clone);
    let commits = copying.statistics().commit;
    assert!(recomputing.statistics().commit > commits);
}

#[test]
fn every_branching_finds_every_solution() {
    for variable_order in [VariableOrder::InputOrder, VariableOrder::FirstFail] {
        for value_order in [
            ValueOrder::Min,
            ValueOrder::Max,
            ValueOrder::Middle,
            ValueOrder::Random,
        ] {
            let branching = BranchingOptions::default()
                .with_variable_order(variable_order)
                .with_value_order(value_order)
                .with_seed(11);
            let root = Queens::space(6, QueensPropagation::Binary, &branching);

            let found = placements(&mut Dfs::new(root, &SearchOptions::default()));
            assert_eq!(found.len(), 4, "{variable_order:?} {value_order:?}");
        }
    }
}

#[test]
fn parallel_search_finds_every_solution() {
    let mut expected = placements(&mut Dfs::new(
        root(QueensPropagation::AllDifferent),
        &SearchOptions::default(),
    ));
    expected.sort();

    for policy in [SharePolicy::Bottom, SharePolicy::Top, SharePolicy::Recomputation] {
        let options = SearchOptions::default()
            .with_threads(4)
            .with_share_strategy(ShareStrategy::default().with_policy(policy));
        let mut controller = Controller::dfs(root(QueensPropagation::AllDifferent), &options);

        let mut found = placements(&mut controller);
        found.sort();
        assert_eq!(found, expected, "{policy:?}");
    }
}

#[test]
fn limited_discrepancy_search_finds_a_subset() {
    let all = placements(&mut Dfs::new(
        root(QueensPropagation::Binary),
        &SearchOptions::default(),
    ))
    .into_iter()
    .collect::<BTreeSet<_>>();

    let options = SearchOptions::default().with_discrepancy_limit(3);
    let limited = placements(&mut Lds::new(root(QueensPropagation::Binary), &options));

    assert!(limited.len() < EIGHT_QUEENS_SOLUTIONS);
    assert!(limited.iter().all(|placement| all.contains(placement)));
}

#[test]
fn an_unlimited_discrepancy_search_finds_every_solution_once() {
    let options = SearchOptions::default().with_discrepancy_limit(u32::MAX);

    let found = placements(&mut Lds::new(root(QueensPropagation::Binary), &options));
    assert_eq!(found.len(), EIGHT_QUEENS_SOLUTIONS);
    assert_eq!(
        found.iter().collect::<BTreeSet<_>>().len(),
        EIGHT_QUEENS_SOLUTIONS
    );

    let mut parallel = Controller::lds(
        root(QueensPropagation::Binary),
        &options.with_threads(3),
    );
    assert_eq!(placements(&mut parallel).len(), EIGHT_QUEENS_SOLUTIONS);
}
