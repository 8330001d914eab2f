use arbor_core::search::bab;
use arbor_core::search::Bab;
use arbor_core::Controller;
use arbor_core::SearchEngine;
use arbor_core::SearchOptions;
use arbor_models::branching::BranchingOptions;
use arbor_models::branching::ValueOrder;
use arbor_models::problems::Assignment;
use arbor_models::problems::CostMatrix;
use arbor_models::ModelError;
use itertools::Itertools;

fn brute_force_optimum(matrix: &CostMatrix) -> i64 {
    (0..matrix.size())
        .permutations(matrix.size())
        .map(|agents| {
            agents
                .iter()
                .enumerate()
                .map(|(task, &agent)| i64::from(matrix.cost(task, agent)))
                .sum::<i64>()
        })
        .min()
        .expect("there is at least one permutation")
}

fn costs(engine: &mut impl SearchEngine<Assignment>) -> Vec<i64> {
    let mut costs = Vec::new();
    while let Some(solution) = engine.next() {
        costs.push(
            solution
                .model()
                .total_cost()
                .expect("a solution assigns every task"),
        );
    }
    costs
}

#[test]
fn branch_and_bound_finds_the_optimum() {
    for seed in 0..5 {
        let matrix = CostMatrix::random(6, seed);
        let optimum = brute_force_optimum(&matrix);

        let root = Assignment::space(matrix, &BranchingOptions::default());
        let mut engine = Bab::new(root, &SearchOptions::default());
        let found = costs(&mut engine);

        assert!(found.windows(2).all(|pair| pair[1] < pair[0]));
        assert_eq!(found.last(), Some(&optimum), "seed {seed}");
        assert_eq!(
            engine.best().and_then(Assignment::total_cost),
            Some(optimum)
        );
    }
}

#[test]
fn the_best_solution_is_a_valid_assignment() {
    let matrix = CostMatrix::random(7, 21);
    let optimum = brute_force_optimum(&matrix);
    let root = Assignment::space(
        matrix.clone(),
        &BranchingOptions::default().with_value_order(ValueOrder::Random),
    );

    let best = bab(root, &SearchOptions::default().with_commit_distance(2))
        .expect("every square matrix has an assignment");
    let agents = best
        .model()
        .agents()
        .expect("the best solution assigns every task");

    assert_eq!(agents.iter().unique().count(), 7);
    assert_eq!(
        agents
            .iter()
            .enumerate()
            .map(|(task, &agent)| i64::from(matrix.cost(task, agent)))
            .sum::<i64>(),
        optimum
    );
}

#[test]
fn parallel_branch_and_bound_finds_the_optimum() {
    for threads in [1, 2, 4] {
        let matrix = CostMatrix::random(7, 5);
        let optimum = brute_force_optimum(&matrix);

        let root = Assignment::space(matrix, &BranchingOptions::default());
        let mut controller = Controller::bab(root, &SearchOptions::default().with_threads(threads));
        let found = costs(&mut controller);

        assert!(found.windows(2).all(|pair| pair[1] < pair[0]));
        assert_eq!(found.last(), Some(&optimum), "{threads} threads");
        assert_eq!(
            controller.best().and_then(Assignment::total_cost),
            Some(optimum)
        );
    }
}

#[test]
fn a_ragged_matrix_is_not_a_problem() {
    let error = CostMatrix::new(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap_err();

    assert_eq!(
        error,
        ModelError::NotSquare {
            rows: 2,
            row: 0,
            length: 3,
        }
    );
    assert_eq!(
        error.to_string(),
        "the cost matrix has 2 rows, but row 0 has 3 entries"
    );
}
