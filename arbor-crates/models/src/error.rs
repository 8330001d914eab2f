use thiserror::Error;

/// Errors raised while building a problem.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("the cost matrix has {rows} rows, but row {row} has {length} entries")]
    NotSquare {
        rows: usize,
        row: usize,
        length: usize,
    },
    #[error("cost {cost} at row {row} is negative")]
    NegativeCost { row: usize, cost: i32 },
}
