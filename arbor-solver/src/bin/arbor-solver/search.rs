use std::fmt::Display;

use arbor_core::search::Bab;
use arbor_core::search::Dfs;
use arbor_core::search::Lds;
use arbor_core::search::Restart;
use arbor_core::statistics::log_statistic;
use arbor_core::statistics::log_statistic_postfix;
use arbor_core::statistics::should_log_statistics;
use arbor_core::statistics::StatisticLogger;
use arbor_core::Constrain;
use arbor_core::Controller;
use arbor_core::Model;
use arbor_core::SearchEngine;
use arbor_core::SearchOptions;
use arbor_core::Space;
use clap::ValueEnum;
use log::debug;
use log::info;
use log::warn;

use crate::result::ArborError;
use crate::result::ArborResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum EngineType {
    /// Depth-first search over all solutions.
    #[default]
    Dfs,
    /// Limited discrepancy search, up to the discrepancy limit.
    Lds,
    /// Branch-and-bound, for optimisation problems.
    Bab,
    /// Branch-and-bound restarting from the root after every solution, for optimisation
    /// problems.
    Restart,
}

/// A sequential engine, or a controller when more than one thread is requested.
enum Search<M: Model> {
    Sequential(Box<dyn SearchEngine<M>>),
    Parallel(Controller<M>),
}

impl<M: Model> Search<M> {
    fn satisfaction(
        root: Space<M>,
        engine: EngineType,
        options: &SearchOptions,
        problem: &str,
    ) -> ArborResult<Self> {
        let parallel = options.threads > 1;

        let search = match engine {
            EngineType::Dfs if parallel => Search::Parallel(Controller::dfs(root, options)),
            EngineType::Dfs => Search::Sequential(Box::new(Dfs::new(root, options))),
            EngineType::Lds if parallel => Search::Parallel(Controller::lds(root, options)),
            EngineType::Lds => Search::Sequential(Box::new(Lds::new(root, options))),
            EngineType::Bab | EngineType::Restart => {
                return Err(ArborError::not_an_optimisation_problem(problem));
            }
        };

        Ok(search)
    }

    fn next(&mut self) -> Option<Space<M>> {
        match self {
            Search::Sequential(engine) => engine.next(),
            Search::Parallel(controller) => controller.next(),
        }
    }

    fn log_statistics(&self) {
        match self {
            Search::Sequential(engine) => engine.statistics().log(&StatisticLogger::default()),
            Search::Parallel(controller) => {
                controller.total().log(&StatisticLogger::default());
                for (worker, statistics) in controller.worker_statistics().iter().enumerate() {
                    let logger = StatisticLogger::new(["worker".to_owned(), worker.to_string()]);
                    statistics.log(&logger);
                }
            }
        }
    }
}

impl<M: Constrain> Search<M> {
    fn optimisation(
        root: Space<M>,
        engine: EngineType,
        options: &SearchOptions,
        problem: &str,
    ) -> ArborResult<Self> {
        match engine {
            EngineType::Bab if options.threads > 1 => {
                Ok(Search::Parallel(Controller::bab(root, options)))
            }
            EngineType::Bab => Ok(Search::Sequential(Box::new(Bab::new(root, options)))),
            EngineType::Restart => {
                if options.threads > 1 {
                    warn!("the restart engine is sequential, ignoring the requested threads");
                }
                Ok(Search::Sequential(Box::new(Restart::new(root, options))))
            }
            _ => Search::satisfaction(root, engine, options, problem),
        }
    }
}

/// Prints solutions and statistics.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Driver {
    /// Print every solution (or every improving solution) instead of only the first (or best).
    pub(crate) all_solutions: bool,
}

impl Driver {
    pub(crate) fn satisfy<M: Model + Display>(
        &self,
        root: Space<M>,
        engine: EngineType,
        options: &SearchOptions,
        problem: &str,
    ) -> ArborResult<()> {
        let search = Search::satisfaction(root, engine, options, problem)?;
        self.run(search, engine, false);
        Ok(())
    }

    pub(crate) fn optimise<M: Constrain + Display>(
        &self,
        root: Space<M>,
        engine: EngineType,
        options: &SearchOptions,
        problem: &str,
    ) -> ArborResult<()> {
        let search = Search::optimisation(root, engine, options, problem)?;
        let optimising = matches!(engine, EngineType::Bab | EngineType::Restart);
        self.run(search, engine, optimising);
        Ok(())
    }

    /// Print solutions in the MiniZinc output format: every solution is followed by
    /// `----------`, and `==========` marks a search which explored the whole tree.
    fn run<M: Model + Display>(&self, mut search: Search<M>, engine: EngineType, optimising: bool) {
        info!("Search started with {engine:?}");

        let mut solutions = 0_u64;
        let mut best = None;
        // Limited discrepancy search may cut off parts of the tree.
        let mut complete = engine != EngineType::Lds;

        while let Some(solution) = search.next() {
            solutions += 1;
            debug!("solution {solutions}: {}", solution.model());

            if optimising && !self.all_solutions {
                best = Some(solution);
                continue;
            }

            print_solution(solution.model());
            if !optimising && !self.all_solutions {
                complete = false;
                break;
            }
        }

        if let Some(best) = best {
            print_solution(best.model());
        }
        match (solutions, complete) {
            (0, true) => println!("=====UNSATISFIABLE====="),
            (0, false) => println!("=====UNKNOWN====="),
            (_, true) => println!("=========="),
            (_, false) => {}
        }

        if should_log_statistics() {
            log_statistic("solutions", solutions);
            search.log_statistics();
            log_statistic_postfix();
        }
    }
}

fn print_solution(model: &impl Display) {
    println!("{model}");
    println!("----------");
}
