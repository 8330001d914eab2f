mod result;
mod search;

use std::fs::read_to_string;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use arbor_core::asserts::ARBOR_ASSERT_LEVEL_DEFINITION;
use arbor_core::asserts::ARBOR_ASSERT_MODERATE;
use arbor_core::convert_case::Case;
use arbor_core::parallel::SharePolicy;
use arbor_core::parallel::ShareStrategy;
use arbor_core::search::DEFAULT_ADAPTIVE_DISTANCE;
use arbor_core::search::DEFAULT_COMMIT_DISTANCE;
use arbor_core::search::DEFAULT_DISCREPANCY_LIMIT;
use arbor_core::statistics::configure_statistic_logging;
use arbor_core::SearchOptions;
use arbor_models::branching::BranchingOptions;
use arbor_models::branching::ValueOrder;
use arbor_models::branching::VariableOrder;
use arbor_models::problems::Assignment;
use arbor_models::problems::CostMatrix;
use arbor_models::problems::Queens;
use arbor_models::problems::QueensPropagation;
use clap::Parser;
use clap::ValueEnum;
use log::error;
use log::info;
use log::warn;
use log::LevelFilter;
use result::ArborError;
use result::ArborResult;
use search::Driver;
use search::EngineType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Problem {
    /// Place `size` queens on a `size` x `size` board without attacks.
    Queens,
    /// Assign `size` tasks to different agents at minimum total cost.
    Assignment,
}

#[derive(Debug, Parser)]
#[command(
    help_template = "\
{before-help}{name} {version}
About: {about}

{usage-heading}\n{tab}{usage}

{all-args}{after-help}
",
    version,
    about,
    arg_required_else_help = true
)]
struct Args {
    /// The problem to solve.
    #[arg(value_enum)]
    problem: Problem,

    /// The size of the problem: the number of queens, or the number of tasks of a random
    /// assignment problem.
    #[arg(short = 'n', long, default_value_t = 8)]
    size: usize,

    /// A file with the cost matrix of an assignment problem, one row of whitespace-separated
    /// costs per line. Overrides `--size`.
    #[arg(long, verbatim_doc_comment)]
    costs: Option<PathBuf>,

    /// The search engine.
    #[arg(short = 'e', long, value_enum, default_value_t)]
    engine: EngineType,

    /// The number of worker threads. More than one runs the search on a parallel controller.
    #[arg(short = 'j', long, default_value_t = 1)]
    threads: usize,

    /// A copy of the space is stored at most every `commit-distance` choice points; 1 stores a
    /// copy at every choice point.
    #[arg(long, default_value_t = DEFAULT_COMMIT_DISTANCE)]
    commit_distance: u32,

    /// Recomputing over at least this many commits stores an extra copy halfway.
    #[arg(long, default_value_t = DEFAULT_ADAPTIVE_DISTANCE)]
    adaptive_distance: u32,

    /// The largest number of discrepancies explored by limited discrepancy search.
    #[arg(long, default_value_t = DEFAULT_DISCREPANCY_LIMIT)]
    discrepancy_limit: u32,

    /// Which open node a busy worker gives away to an idle one.
    #[arg(long, value_enum, default_value_t)]
    share_policy: SharePolicy,

    /// A worker only shares once its stack holds more than this many nodes.
    #[arg(long, default_value_t = 3)]
    stack_size_threshold: usize,

    /// The number of discrepancy levels handed to an idle worker at once.
    #[arg(long, default_value_t = 1)]
    lds_increment: u32,

    /// How the queens constraints are posted.
    #[arg(long, value_enum, default_value_t)]
    queens_propagation: QueensPropagation,

    /// Which variable is branched on next.
    #[arg(long, value_enum, default_value_t)]
    variable_order: VariableOrder,

    /// Which value is tried first.
    #[arg(long, value_enum, default_value_t)]
    value_order: ValueOrder,

    /// The seed of random value selection and of random assignment problems.
    #[arg(long = "random-seed", default_value_t = 42)]
    random_seed: u64,

    /// Print all solutions of a satisfaction problem, or every improving solution of an
    /// optimisation problem, instead of only the first or the best one.
    ///
    /// Possible values: bool
    #[arg(short = 'a', long = "all-solutions", verbatim_doc_comment)]
    all_solutions: bool,

    /// Enables log message output from the engines.
    ///
    /// Possible values: bool
    #[arg(short = 'v', long = "verbose", verbatim_doc_comment)]
    verbose: bool,

    /// Enables logging of search statistics.
    ///
    /// Possible values: bool
    #[arg(short = 's', long = "log-statistics", verbatim_doc_comment)]
    log_statistics: bool,
}

fn configure_logging(verbose: bool, log_statistics: bool) -> std::io::Result<()> {
    if log_statistics {
        configure_statistic_logging(
            "%%%mzn-stat:",
            Some("%%%mzn-stat-end"),
            Some(Case::Camel),
            None,
        );
    }
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .format(move |buf, record| {
            write!(buf, "% ")?;

            writeln!(buf, "{}", record.args())
        })
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .init();
    info!("Logging successfully configured");
    Ok(())
}

fn read_cost_matrix(path: &Path) -> ArborResult<CostMatrix> {
    let contents = read_to_string(path)?;

    let rows = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            line.split_whitespace()
                .map(|token| {
                    token.parse::<i32>().map_err(|_| ArborError::InvalidCost {
                        line: index + 1,
                        token: token.to_owned(),
                    })
                })
                .collect::<ArborResult<Vec<_>>>()
        })
        .collect::<ArborResult<Vec<_>>>()?;

    Ok(CostMatrix::new(rows)?)
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(e) => {
            error!("Execution failed, error: {e}");
            std::process::exit(1);
        }
    }
}

fn run() -> ArborResult<()> {
    let args = Args::parse();

    configure_logging(args.verbose, args.log_statistics)?;

    if ARBOR_ASSERT_LEVEL_DEFINITION >= ARBOR_ASSERT_MODERATE {
        warn!(
            "Potential performance degradation: the Arbor assert level is set to {}, meaning many debug asserts are active which may result in performance degradation.",
            ARBOR_ASSERT_LEVEL_DEFINITION
        );
    }

    let share = ShareStrategy::default()
        .with_policy(args.share_policy)
        .with_stack_size_threshold(args.stack_size_threshold)
        .with_lds_increment(args.lds_increment);
    let options = SearchOptions::default()
        .with_commit_distance(args.commit_distance)
        .with_adaptive_distance(args.adaptive_distance)
        .with_discrepancy_limit(args.discrepancy_limit)
        .with_threads(args.threads)
        .with_share_strategy(share);
    let branching = BranchingOptions::default()
        .with_variable_order(args.variable_order)
        .with_value_order(args.value_order)
        .with_seed(args.random_seed);
    info!("{options:?}");

    let driver = Driver {
        all_solutions: args.all_solutions,
    };

    match args.problem {
        Problem::Queens => {
            let root = Queens::space(args.size, args.queens_propagation, &branching);
            driver.satisfy(root, args.engine, &options, "queens")
        }
        Problem::Assignment => {
            let matrix = match &args.costs {
                Some(path) => read_cost_matrix(path)?,
                None => CostMatrix::random(args.size, args.random_seed),
            };
            let root = Assignment::space(matrix, &branching);
            driver.optimise(root, args.engine, &options, "assignment")
        }
    }
}
