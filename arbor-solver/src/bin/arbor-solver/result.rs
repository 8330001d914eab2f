use std::fmt::Display;

use arbor_models::ModelError;
use thiserror::Error;

pub(crate) type ArborResult<T> = Result<T, ArborError>;

#[derive(Error, Debug)]
pub(crate) enum ArborError {
    #[error("IO error, more details: {0}")]
    IOError(#[from] std::io::Error),
    #[error("The problem could not be built, more details: {0}")]
    Model(#[from] ModelError),
    #[error("Line {line} of the cost file contains '{token}', which is not a cost.")]
    InvalidCost { line: usize, token: String },
    #[error("Branch-and-bound requires an optimisation problem, but {0} has no objective.")]
    NotAnOptimisationProblem(String),
}

impl ArborError {
    pub(crate) fn not_an_optimisation_problem(problem: impl Display) -> Self {
        Self::NotAnOptimisationProblem(format!("{problem}"))
    }
}
